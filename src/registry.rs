use indexmap::IndexMap;
use serde::Serialize;

use crate::breakpoint::{self, BreakpointInfo};
use crate::extractor::ClassToken;
use crate::lookup_key::normalize_key;

/// Bucket key for rules without a breakpoint
pub const ALL_BUCKET: &str = "all";

/// Characters that must be backslash-escaped in a generated class selector
const SELECTOR_SPECIAL_CHARS: [char; 5] = ['[', ']', '#', '@', '%'];

/// Maps a raw arbitrary value to a CSS declaration body such as `{width: 10px}`
pub type UtilityFn = fn(&str) -> String;

/// A single generated rule: escaped selector plus declaration body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyleRule {
    /// Resolved breakpoint, `None` for unconditional rules
    pub breakpoint: Option<BreakpointInfo>,

    /// Escaped class selector, without the leading dot
    pub selector: String,

    /// Declaration body including braces
    pub declaration_body: String,
}

impl StyleRule {
    /// Key of the bucket this rule belongs to
    pub fn bucket_key(&self) -> String {
        match &self.breakpoint {
            Some(info) => info.bucket_key(),
            None => ALL_BUCKET.to_string(),
        }
    }
}

/// A registered utility: the lookup key and the template that renders its body
#[derive(Debug, Clone, Copy)]
pub struct Utility {
    key: &'static str,
    template: UtilityFn,
}

impl Utility {
    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Turn a parsed class token into a style rule.
    ///
    /// The selector is rebuilt from the token so that it matches the class
    /// attribute value exactly once escaped.
    pub fn apply(&self, token: &ClassToken) -> StyleRule {
        let declaration_body = (self.template)(&token.raw_value);
        let breakpoint = breakpoint::resolve(token.breakpoint.as_deref().unwrap_or(""));

        StyleRule {
            breakpoint,
            selector: escape_selector(&token.class_name()),
            declaration_body,
        }
    }
}

/// Immutable table of utilities keyed by normalized prefix
#[derive(Debug, Clone)]
pub struct UtilityRegistry {
    utilities: IndexMap<&'static str, Utility>,
}

impl UtilityRegistry {
    /// Wrap a table of templates into matchers
    pub fn from_templates<I>(templates: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, UtilityFn)>,
    {
        let utilities = templates
            .into_iter()
            .map(|(key, template)| (key, Utility { key, template }))
            .collect();

        Self { utilities }
    }

    /// The compiled-in utility table
    pub fn standard() -> Self {
        Self::from_templates(standard_templates())
    }

    /// Look up a utility by its registry key (`maxW`, not `max-w`)
    pub fn get(&self, key: &str) -> Option<&Utility> {
        self.utilities.get(key)
    }

    /// Look up a utility by the prefix as written in a class name
    pub fn lookup(&self, prefix: &str) -> Option<&Utility> {
        self.get(&normalize_key(prefix))
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.utilities.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.utilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utilities.is_empty()
    }
}

impl Default for UtilityRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

/// Backslash-escape `[`, `]`, `#`, `@` and `%` in a class name
pub fn escape_selector(class_name: &str) -> String {
    let mut escaped = String::with_capacity(class_name.len() + 8);
    for ch in class_name.chars() {
        if SELECTOR_SPECIAL_CHARS.contains(&ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn standard_templates() -> [(&'static str, UtilityFn); 30] {
    [
        // Sizing
        ("w", |v| format!("{{width: {v}}}")),
        ("minW", |v| format!("{{min-width: {v}}}")),
        ("maxW", |v| format!("{{max-width: {v}}}")),
        ("h", |v| format!("{{height: {v}}}")),
        ("minH", |v| format!("{{min-height: {v}}}")),
        ("maxH", |v| format!("{{max-height: {v}}}")),
        // Spacing
        ("mx", |v| format!("{{margin-inline: {v}}}")),
        ("mt", |v| format!("{{margin-top: {v}}}")),
        ("mb", |v| format!("{{margin-bottom: {v}}}")),
        ("ml", |v| format!("{{margin-left: {v}}}")),
        ("mr", |v| format!("{{margin-right: {v}}}")),
        ("py", |v| format!("{{padding-block: {v}}}")),
        ("px", |v| format!("{{padding-inline: {v}}}")),
        ("pt", |v| format!("{{padding-top: {v}}}")),
        ("pb", |v| format!("{{padding-bottom: {v}}}")),
        ("pl", |v| format!("{{padding-left: {v}}}")),
        ("pr", |v| format!("{{padding-right: {v}}}")),
        // Gap
        ("g", |v| format!("{{--column-gap: {v}; gap: {v};}}")),
        ("cg", |v| format!("{{--column-gap: {v}; -moz-column-gap: {v}; column-gap: {v}}}")),
        ("rg", |v| format!("{{row-gap: {v}}}")),
        // Positioning
        ("z", |v| format!("{{z-index: {v}}}")),
        ("top", |v| format!("{{top: {v}}}")),
        ("bottom", |v| format!("{{bottom: {v}}}")),
        ("left", |v| format!("{{left: {v}}}")),
        ("right", |v| format!("{{right: {v}}}")),
        // Typography: underscores in font shorthand stand in for spaces
        ("font", |v| format!("{{font: {}}}", v.replace('_', " "))),
        ("text", |v| format!("{{font-size: {v}}}")),
        ("color", |v| format!("{{color: {v}}}")),
        // Appearance
        ("bg", |v| format!("{{background-color: {v}}}")),
        ("br", |v| format!("{{border-radius: {v}}}")),
    ]
}
