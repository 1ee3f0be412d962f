use lol_html::html_content::{ContentType, EndTag};
use lol_html::{element, rewrite_str, RewriteStrSettings};
use std::cell::Cell;
use std::rc::Rc;

use crate::css_map::CssMap;
use crate::errors::Result;
use crate::registry::ALL_BUCKET;

/// Render the bucketed rules into stylesheet text.
///
/// Buckets are emitted in the reverse of their first-insertion order. Rules
/// inside a bucket keep discovery order. Every bucket other than `all` is
/// wrapped in `@media(<condition>){...}`.
pub fn generate_css(map: &CssMap) -> String {
    let mut output = String::new();

    for (key, rules) in map.iter().rev() {
        let mut block = String::new();
        for rule in rules {
            block.push('.');
            block.push_str(&rule.selector);
            block.push_str(&rule.declaration_body);
            block.push(' ');
        }

        if key == ALL_BUCKET {
            output.push_str(&block);
        } else if let Some(info) = rules.first().and_then(|rule| rule.breakpoint) {
            output.push_str("@media(");
            output.push_str(info.condition);
            output.push_str("){");
            output.push_str(&block);
            output.push_str("} ");
        }
    }

    output.trim().to_string()
}

/// Start tags the tree builder keeps inside `head`; any other element starts the body
const HEAD_CONTENT_TAGS: [&str; 10] = [
    "html", "head", "title", "base", "link", "meta", "style", "script", "noscript", "template",
];

/// Wrap stylesheet text in a `<style>` element.
///
/// `</` never appears inside the element: it is written as `<\/`, which CSS
/// reads back as `</`.
pub fn style_element(css: &str) -> String {
    format!("<style>{}</style>", css.replace("</", "<\\/"))
}

/// Append a `<style>` element holding `css` as the last child of the document head.
///
/// The document is streamed through a tokenizer, so markup inside comments,
/// scripts and other raw-text elements is never mistaken for a tag. Everything
/// outside the inserted element is left byte-for-byte intact. Placement, in
/// order of preference: before `</head>`, before the first element that belongs
/// in the body, at the end of the document. In every case an HTML parser
/// attaches the element to `head`.
pub fn install_style(html: &str, css: &str) -> Result<String> {
    let element = style_element(css);
    let installed = Rc::new(Cell::new(false));
    let template_depth = Rc::new(Cell::new(0usize));

    let head_installed = Rc::clone(&installed);
    let head_element = element.clone();
    let body_installed = Rc::clone(&installed);
    let body_element = element.clone();
    let body_template_depth = Rc::clone(&template_depth);

    let mut output = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                // Template contents are inert, their elements do not start the body
                element!("template", move |el| {
                    template_depth.set(template_depth.get() + 1);
                    if let Some(handlers) = el.end_tag_handlers() {
                        let depth = Rc::clone(&template_depth);
                        handlers.push(Box::new(move |_end: &mut EndTag<'_>| {
                            depth.set(depth.get().saturating_sub(1));
                            Ok(())
                        }) as _);
                    }
                    Ok(())
                }),
                element!("head", move |el| {
                    if let Some(handlers) = el.end_tag_handlers() {
                        let installed = Rc::clone(&head_installed);
                        let element = head_element.clone();
                        handlers.push(Box::new(move |end: &mut EndTag<'_>| {
                            if !installed.get() {
                                end.before(&element, ContentType::Html);
                                installed.set(true);
                            }
                            Ok(())
                        }) as _);
                    }
                    Ok(())
                }),
                element!("*", move |el| {
                    if body_installed.get() || body_template_depth.get() > 0 {
                        return Ok(());
                    }
                    let tag = el.tag_name();
                    if !HEAD_CONTENT_TAGS.contains(&tag.as_str()) {
                        el.before(&body_element, ContentType::Html);
                        body_installed.set(true);
                    }
                    Ok(())
                }),
            ],
            strict: false,
            ..RewriteStrSettings::new()
        },
    )?;

    if !installed.get() {
        output.push_str(&element);
    }

    Ok(output)
}
