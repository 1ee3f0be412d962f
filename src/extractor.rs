use indexmap::IndexMap;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

/// One parsed arbitrary-value class such as `mt-[10px]@md`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassToken {
    /// Utility prefix as written in the class name (`max-w`)
    pub prefix: String,

    /// Bracketed value, verbatim
    pub raw_value: String,

    /// Breakpoint token after `@`, if any
    pub breakpoint: Option<String>,
}

impl ClassToken {
    /// Rebuild the class name this token was parsed from
    pub fn class_name(&self) -> String {
        match &self.breakpoint {
            Some(bp) => format!("{}-[{}]@{}", self.prefix, self.raw_value, bp),
            None => format!("{}-[{}]", self.prefix, self.raw_value),
        }
    }

    /// Identity used to drop repeated occurrences
    pub fn dedup_key(&self) -> String {
        format!(
            "{}-{}-{}",
            self.prefix,
            self.raw_value,
            self.breakpoint.as_deref().unwrap_or("")
        )
    }
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn is_prefix_byte(b: u8) -> bool {
    is_word_byte(b) || b == b'-'
}

fn contains_line_terminator(s: &str) -> bool {
    s.contains(['\n', '\r', '\u{2028}', '\u{2029}'])
}

/// Parse a single class name against the arbitrary-value grammar.
///
/// The match is unanchored and leftmost: text before the first run of word
/// characters that is followed by `-[` is skipped, and anything after the
/// closing bracket (or the `@breakpoint` suffix) is ignored. Returns `None`
/// when the class does not match.
pub fn parse_class_name(class: &str) -> Option<ClassToken> {
    let bytes = class.as_bytes();
    let mut start = 0;

    while start < bytes.len() {
        if !is_prefix_byte(bytes[start]) {
            start += 1;
            continue;
        }

        // A prefix run can only end in `-` right before `[`, so only the
        // start of each maximal run needs to be tried.
        let mut end = start;
        while end < bytes.len() && is_prefix_byte(bytes[end]) {
            end += 1;
        }

        if let Some(token) = match_at(class, start, end) {
            return Some(token);
        }
        start = end;
    }

    None
}

fn match_at(class: &str, start: usize, run_end: usize) -> Option<ClassToken> {
    let bytes = class.as_bytes();

    // run_end points at the first byte after the prefix run, which must be `[`
    // preceded by the separating `-`, with at least one prefix byte before it.
    if bytes.get(run_end) != Some(&b'[') || run_end < start + 2 || bytes[run_end - 1] != b'-' {
        return None;
    }

    let value_start = run_end + 1;
    // The value is at least one character, so the closing bracket search
    // starts one byte past the opening one.
    let close = value_start
        + 1
        + bytes.get(value_start + 1..)?.iter().position(|&b| b == b']')?;
    let raw_value = &class[value_start..close];
    if contains_line_terminator(raw_value) {
        return None;
    }

    let mut breakpoint = None;
    if bytes.get(close + 1) == Some(&b'@') {
        let bp_start = close + 2;
        let mut bp_end = bp_start;
        while bp_end < bytes.len() && is_word_byte(bytes[bp_end]) {
            bp_end += 1;
        }
        if bp_end > bp_start {
            breakpoint = Some(class[bp_start..bp_end].to_string());
        }
    }

    Some(ClassToken {
        prefix: class[start..run_end - 1].to_string(),
        raw_value: raw_value.to_string(),
        breakpoint,
    })
}

/// Collects distinct class tokens in discovery order
#[derive(Debug, Default)]
pub struct ClassExtractor {
    tokens: IndexMap<String, ClassToken>,
    classes_seen: usize,
}

impl ClassExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one class name; repeated tokens are dropped, the first one wins
    pub fn add_class(&mut self, class: &str) {
        self.classes_seen += 1;
        if let Some(token) = parse_class_name(class) {
            self.tokens.entry(token.dedup_key()).or_insert(token);
        }
    }

    /// Split a `class` attribute value on ASCII whitespace and add each class
    pub fn add_class_attribute(&mut self, value: &str) {
        for class in value.split_ascii_whitespace() {
            self.add_class(class);
        }
    }

    /// Number of class names looked at, matching or not
    pub fn classes_seen(&self) -> usize {
        self.classes_seen
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn into_tokens(self) -> Vec<ClassToken> {
        self.tokens.into_values().collect()
    }
}

/// Template contents are inert and never part of the rendered document
fn inside_template(element: &ElementRef<'_>) -> bool {
    element
        .ancestors()
        .any(|node| node.value().as_element().is_some_and(|el| el.name() == "template"))
}

/// Extract every distinct arbitrary-value class from a parsed document.
///
/// Elements are visited in document order; elements inside `<template>`
/// contents are skipped.
pub fn extract_arbitrary_classes(document: &Html) -> Vec<ClassToken> {
    let mut extractor = ClassExtractor::new();

    // `[class]` is a valid selector, parsing it cannot fail
    if let Ok(selector) = Selector::parse("[class]") {
        for element in document.select(&selector) {
            if inside_template(&element) {
                continue;
            }
            if let Some(value) = element.value().attr("class") {
                extractor.add_class_attribute(value);
            }
        }
    }

    extractor.into_tokens()
}
