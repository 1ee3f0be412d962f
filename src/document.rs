use scraper::Html;

use crate::emitter::install_style;
use crate::errors::Result;
use crate::extractor::{extract_arbitrary_classes, ClassToken};
use crate::processor::StyleHost;

/// An HTML document held as source text
///
/// Class names are read through a parsed tree; installing a stylesheet splices
/// a `<style>` element into the source, leaving every other byte untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlDocument {
    source: String,
}

impl HtmlDocument {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn into_string(self) -> String {
        self.source
    }

    /// Parse the current source into a document tree
    pub fn parse(&self) -> Html {
        Html::parse_document(&self.source)
    }
}

impl StyleHost for HtmlDocument {
    fn extract_tokens(&self) -> Vec<ClassToken> {
        extract_arbitrary_classes(&self.parse())
    }

    fn install_stylesheet(&mut self, css: &str) -> Result<()> {
        self.source = install_style(&self.source, css)?;
        Ok(())
    }
}
