use serde::Serialize;
use tracing::debug;

use crate::css_map::build_css_map;
use crate::emitter::generate_css;
use crate::errors::Result;
use crate::extractor::ClassToken;
use crate::registry::UtilityRegistry;

/// A document the pipeline can read class names from and install a stylesheet into.
///
/// Reading happens once, before generation; installing happens at most once,
/// after it. Nothing is installed when no class produced a rule.
pub trait StyleHost {
    /// Distinct arbitrary-value tokens, in discovery order
    fn extract_tokens(&self) -> Vec<ClassToken>;

    /// Append a stylesheet holding `css` as the last child of the head
    fn install_stylesheet(&mut self, css: &str) -> Result<()>;
}

/// Outcome of one generation pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Generation {
    /// Distinct tokens the extractor produced
    pub tokens_extracted: usize,

    /// Rules that made it into the stylesheet
    pub rules_emitted: usize,

    /// Bucket keys in emission order
    pub bucket_keys: Vec<String>,

    /// Final stylesheet text
    pub css: String,
}

/// Turn extracted tokens into stylesheet text.
///
/// Returns `None` when there are no tokens or none of them matched a utility.
pub fn generate(tokens: &[ClassToken], registry: &UtilityRegistry) -> Option<Generation> {
    if tokens.is_empty() {
        return None;
    }

    let map = build_css_map(tokens, registry);
    if map.is_empty() {
        return None;
    }

    Some(Generation {
        tokens_extracted: tokens.len(),
        rules_emitted: map.rule_count(),
        bucket_keys: map.keys().rev().map(str::to_string).collect(),
        css: generate_css(&map),
    })
}

/// Run the whole pipeline against a host: extract, generate, install.
pub fn apply_arbitrary_styles<H>(
    host: &mut H,
    registry: &UtilityRegistry,
) -> Result<Option<Generation>>
where
    H: StyleHost + ?Sized,
{
    let tokens = host.extract_tokens();
    let generation = generate(&tokens, registry);

    match &generation {
        Some(generation) => {
            debug!(
                tokens = generation.tokens_extracted,
                rules = generation.rules_emitted,
                buckets = generation.bucket_keys.len(),
                "installing generated stylesheet"
            );
            host.install_stylesheet(&generation.css)?;
        }
        None => debug!(tokens = tokens.len(), "no arbitrary-value rules, nothing installed"),
    }

    Ok(generation)
}
