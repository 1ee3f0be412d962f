use arbitrary_css::{inject, stylesheet_for_html, InjectArgs};
use scraper::{Html, Selector};
use std::fs;
use tempfile::tempdir;

fn head_styles(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("head > style").unwrap();
    document
        .select(&selector)
        .map(|el| el.text().collect::<String>())
        .collect()
}

fn page(body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n  <title>page</title>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        body
    )
}

#[test]
fn test_unconditional_width() {
    let css = stylesheet_for_html(&page(r#"<div class="w-[320px]"></div>"#)).unwrap();

    assert!(css.contains(r".w-\[320px\]{width: 320px}"));
    assert!(!css.contains("@media"));
}

#[test]
fn test_breakpoint_media_block() {
    let css = stylesheet_for_html(&page(r#"<div class="mt-[10px]@md"></div>"#)).unwrap();
    assert!(css.contains(r"@media(max-width: 991px){.mt-\[10px\]\@md{margin-top: 10px} }"));
}

#[test]
fn test_font_shorthand_underscores() {
    let css = stylesheet_for_html(&page(r#"<p class="font-[16px_bold]">x</p>"#)).unwrap();
    assert!(css.ends_with("{font: 16px bold}"), "got {}", css);
}

#[test]
fn test_no_matching_classes() {
    assert_eq!(stylesheet_for_html(&page(r#"<div class="flex p-4"></div>"#)), None);
    assert_eq!(stylesheet_for_html(&page(r#"<div class="foo-[1px]"></div>"#)), None);
    assert_eq!(stylesheet_for_html(&page("<div></div>")), None);
}

#[test]
fn test_duplicates_across_elements_yield_one_rule() {
    let css = stylesheet_for_html(&page(
        r#"<div class="w-[10px]"></div><span class="card w-[10px]"></span>"#,
    ))
    .unwrap();
    assert_eq!(css, r".w-\[10px\]{width: 10px}");
}

#[test]
fn test_generation_is_byte_identical_across_runs() {
    let html = page(
        r#"<div class="w-[10px]@lg h-[5rem] bg-[#123]@xs z-[10]"><i class="color-[red]@xl mx-[auto]"></i></div>"#,
    );
    let first = stylesheet_for_html(&html).unwrap();
    let second = stylesheet_for_html(&html).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_mixed_page_ordering() {
    let html = page(
        r#"<header class="h-[64px] px-[24px]@md">
             <nav class="max-w-[1200px] mx-[auto] g-[12px]@sm"></nav>
           </header>
           <main class="pt-[64px]@md text-[18px]@xl text-[14px]@sm"></main>"#,
    );
    let css = stylesheet_for_html(&html).unwrap();

    // Buckets created in order all, 991, 767, 1400 are emitted reversed
    insta::assert_snapshot!(css, @r"@media(min-width: 1400px){.text-\[18px\]\@xl{font-size: 18px} } @media(max-width: 767px){.g-\[12px\]\@sm{--column-gap: 12px; gap: 12px;} .text-\[14px\]\@sm{font-size: 14px} } @media(max-width: 991px){.px-\[24px\]\@md{padding-inline: 24px} .pt-\[64px\]\@md{padding-top: 64px} } .h-\[64px\]{height: 64px} .max-w-\[1200px\]{max-width: 1200px} .mx-\[auto\]{margin-inline: auto}");
}

#[tokio::test]
async fn test_inject_in_place() {
    let temp_dir = tempdir().unwrap();

    let styled = temp_dir.path().join("styled.html");
    fs::write(&styled, page(r#"<div class="w-[320px] mt-[10px]@md"></div>"#)).unwrap();

    let plain_content = page(r#"<div class="flex"></div>"#);
    let plain = temp_dir.path().join("plain.html");
    fs::write(&plain, &plain_content).unwrap();

    let manifest_path = temp_dir.path().join("report").join("manifest.json");

    let args = InjectArgs {
        input: vec![format!("{}/*.html", temp_dir.path().display())],
        manifest: Some(manifest_path.clone()),
        ..InjectArgs::default()
    };

    let result = inject(args).await.unwrap();
    assert_eq!(result.total_files_processed, 2);
    assert_eq!(result.documents_styled, 1);
    assert_eq!(result.total_rules, 2);

    let styled_html = fs::read_to_string(&styled).unwrap();
    assert_eq!(
        head_styles(&styled_html),
        vec![r"@media(max-width: 991px){.mt-\[10px\]\@md{margin-top: 10px} } .w-\[320px\]{width: 320px}"]
    );

    // Documents without matches are not rewritten
    assert_eq!(fs::read_to_string(&plain).unwrap(), plain_content);

    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&manifest_path).unwrap()).unwrap();
    assert_eq!(manifest["metadata"]["files_processed"], 2);
    assert_eq!(manifest["metadata"]["documents_styled"], 1);
    assert_eq!(manifest["totals"]["rules_emitted"], 2);
    let report = &manifest["documents"][styled.display().to_string()];
    assert_eq!(report["bucket_keys"], serde_json::json!(["991", "all"]));
}

#[tokio::test]
async fn test_inject_into_out_dir() {
    let temp_dir = tempdir().unwrap();
    let site = temp_dir.path().join("site");
    fs::create_dir_all(site.join("blog")).unwrap();

    let index_content = page(r#"<div class="bg-[#fafafa]"></div>"#);
    fs::write(site.join("index.html"), &index_content).unwrap();
    let post_content = page(r#"<article class="flex"></article>"#);
    fs::write(site.join("blog").join("post.html"), &post_content).unwrap();

    let out_dir = temp_dir.path().join("out");
    let args = InjectArgs {
        input: vec![format!("{}/**/*.html", site.display())],
        out_dir: Some(out_dir.clone()),
        ..InjectArgs::default()
    };

    let result = inject(args).await.unwrap();
    assert_eq!(result.total_files_processed, 2);
    assert!(result.documents.iter().all(|d| d.output_path.is_some()));

    // Sources stay untouched
    assert_eq!(fs::read_to_string(site.join("index.html")).unwrap(), index_content);

    // Every output lands under out_dir; the unstyled one is copied as is
    let outputs: Vec<_> = result
        .documents
        .iter()
        .filter_map(|d| d.output_path.clone())
        .collect();
    for output in &outputs {
        assert!(output.starts_with(&out_dir), "{} outside out dir", output.display());
        assert!(output.exists());
    }

    let styled = result
        .documents
        .iter()
        .find(|d| d.generation.is_some())
        .and_then(|d| d.output_path.clone())
        .unwrap();
    assert_eq!(
        head_styles(&fs::read_to_string(styled).unwrap()),
        vec![r".bg-\[\#fafafa\]{background-color: #fafafa}"]
    );

    let copied = result
        .documents
        .iter()
        .find(|d| d.generation.is_none())
        .and_then(|d| d.output_path.clone())
        .unwrap();
    assert_eq!(fs::read_to_string(copied).unwrap(), post_content);
}

#[tokio::test]
async fn test_dry_run_writes_nothing() {
    let temp_dir = tempdir().unwrap();
    let content = page(r#"<div class="w-[1px]"></div>"#);
    let file = temp_dir.path().join("a.html");
    fs::write(&file, &content).unwrap();

    let manifest_path = temp_dir.path().join("manifest.json");
    let args = InjectArgs {
        input: vec![file.display().to_string()],
        manifest: Some(manifest_path.clone()),
        dry_run: true,
        ..InjectArgs::default()
    };

    let result = inject(args).await.unwrap();
    assert_eq!(result.documents_styled, 1);
    assert_eq!(result.documents[0].output_path.as_deref(), Some(file.as_path()));
    assert_eq!(fs::read_to_string(&file).unwrap(), content);
    assert!(!manifest_path.exists());
}

#[tokio::test]
async fn test_second_run_appends_second_style() {
    let temp_dir = tempdir().unwrap();
    let file = temp_dir.path().join("a.html");
    fs::write(&file, page(r#"<div class="w-[1px]"></div>"#)).unwrap();

    for _ in 0..2 {
        let args = InjectArgs {
            input: vec![file.display().to_string()],
            jobs: Some(1),
            ..InjectArgs::default()
        };
        inject(args).await.unwrap();
    }

    let styles = head_styles(&fs::read_to_string(&file).unwrap());
    assert_eq!(styles.len(), 2);
    assert_eq!(styles[0], styles[1]);
}

#[test]
fn test_template_contents_produce_no_rules() {
    let html = page(r#"<template><div class="w-[1px]"></div></template>"#);
    assert_eq!(stylesheet_for_html(&html), None);
}

#[tokio::test]
async fn test_inject_with_head_close_inside_script() {
    let temp_dir = tempdir().unwrap();
    let file = temp_dir.path().join("a.html");
    fs::write(
        &file,
        concat!(
            "<html><head><!-- </head> --><script>var s = \"</head>\";</script></head>",
            "<body><div class=\"w-[1px]\"></div></body></html>"
        ),
    )
    .unwrap();

    let args = InjectArgs {
        input: vec![file.display().to_string()],
        ..InjectArgs::default()
    };
    inject(args).await.unwrap();

    let html = fs::read_to_string(&file).unwrap();
    assert!(html.contains("<!-- </head> --><script>var s = \"</head>\";</script><style>"));
    assert_eq!(head_styles(&html), vec![r".w-\[1px\]{width: 1px}"]);
}
