//! Arbitrary-value utility classes for rendered HTML.
//!
//! Class names such as `w-[320px]` or `mt-[10px]@md` are scanned out of a
//! document, matched against a fixed utility table, grouped by breakpoint and
//! turned into a single stylesheet that is installed into the document head.
//!
//! ```
//! use arbitrary_css::{apply_arbitrary_styles, HtmlDocument, UtilityRegistry};
//!
//! let html = r#"<html><head></head><body class="w-[320px]"></body></html>"#;
//! let mut document = HtmlDocument::new(html);
//! let generation = apply_arbitrary_styles(&mut document, &UtilityRegistry::standard())?;
//!
//! assert_eq!(generation.unwrap().css, r".w-\[320px\]{width: 320px}");
//! assert!(document.as_str().contains("<style>"));
//! # Ok::<(), arbitrary_css::ArbitraryCssError>(())
//! ```

pub mod args;
pub mod breakpoint;
pub mod config;
pub mod css_map;
pub mod document;
pub mod emitter;
pub mod errors;
pub mod extractor;
pub mod logging;
pub mod lookup_key;
pub mod manifest;
pub mod processor;
pub mod registry;
#[cfg(feature = "cli")]
pub mod runner;

pub use args::{Cli, Commands, InjectArgs, PipeArgs};
pub use breakpoint::BreakpointInfo;
pub use config::{RunConfig, SecurityConfig};
pub use css_map::{build_css_map, CssMap};
pub use document::HtmlDocument;
pub use emitter::{generate_css, install_style};
pub use errors::{ArbitraryCssError, Result};
pub use extractor::{extract_arbitrary_classes, parse_class_name, ClassExtractor, ClassToken};
pub use lookup_key::normalize_key;
pub use manifest::{Manifest, ManifestBuilder};
pub use processor::{apply_arbitrary_styles, generate, Generation, StyleHost};
pub use registry::{escape_selector, StyleRule, Utility, UtilityFn, UtilityRegistry, ALL_BUCKET};
#[cfg(feature = "cli")]
pub use runner::{
    handle_pipe_command, inject, pipe_document, DocumentOutcome, InjectionResult, PerformanceStats,
};

/// Generate the stylesheet for an HTML document without modifying it.
///
/// Returns `None` when no class in the document produced a rule.
pub fn stylesheet_for_html(html: &str) -> Option<String> {
    let document = HtmlDocument::new(html);
    generate(&document.extract_tokens(), &UtilityRegistry::standard()).map(|g| g.css)
}
