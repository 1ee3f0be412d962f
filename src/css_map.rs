use indexmap::IndexMap;
use tracing::trace;

use crate::extractor::ClassToken;
use crate::registry::{StyleRule, UtilityRegistry};

/// Rules grouped by bucket key, in the order buckets were first created
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CssMap {
    buckets: IndexMap<String, Vec<StyleRule>>,
}

impl CssMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule to its bucket, creating the bucket on first use
    pub fn push(&mut self, rule: StyleRule) {
        self.buckets.entry(rule.bucket_key()).or_default().push(rule);
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Number of buckets
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn rule_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn get(&self, key: &str) -> Option<&[StyleRule]> {
        self.buckets.get(key).map(Vec::as_slice)
    }

    /// Bucket keys in first-insertion order
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &str> + '_ {
        self.buckets.keys().map(String::as_str)
    }

    /// Buckets in first-insertion order
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&str, &[StyleRule])> + '_ {
        self.buckets
            .iter()
            .map(|(key, rules)| (key.as_str(), rules.as_slice()))
    }
}

/// Match tokens against the registry and bucket the resulting rules.
///
/// Tokens with an unregistered prefix or an empty value produce nothing.
pub fn build_css_map(tokens: &[ClassToken], registry: &UtilityRegistry) -> CssMap {
    let mut map = CssMap::new();

    for token in tokens {
        if token.raw_value.is_empty() {
            continue;
        }
        match registry.lookup(&token.prefix) {
            Some(utility) => map.push(utility.apply(token)),
            None => trace!(prefix = %token.prefix, "no utility registered for prefix"),
        }
    }

    map
}
