use serde::Serialize;

/// A named responsive threshold and the media condition it maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct BreakpointInfo {
    /// Numeric key the rule bucket is filed under
    pub sort_key: u32,

    /// Media query condition, without the surrounding parentheses
    pub condition: &'static str,
}

impl BreakpointInfo {
    /// Bucket key as it appears in the rule map
    pub fn bucket_key(&self) -> String {
        self.sort_key.to_string()
    }
}

/// Resolve a breakpoint token such as `md` to its sort key and condition.
///
/// Unknown tokens (including the empty string) are not an error: they resolve
/// to `None`, which files the rule under the unconditional bucket.
pub fn resolve(token: &str) -> Option<BreakpointInfo> {
    let (sort_key, condition) = match token {
        "xl" => (1400, "min-width: 1400px"),
        "lg" => (1199, "max-width: 1199px"),
        "md" => (991, "max-width: 991px"),
        "sm" => (767, "max-width: 767px"),
        "xs" => (575, "max-width: 575px"),
        _ => return None,
    };

    Some(BreakpointInfo { sort_key, condition })
}
