/// Convert a hyphenated utility prefix into its registry key.
///
/// `max-w` becomes `maxW`: the first segment is kept, every following segment
/// gets its first character uppercased. Empty segments (`w--`, `w-`) add nothing.
pub fn normalize_key(prefix: &str) -> String {
    let mut segments = prefix.split('-');
    let mut key = String::with_capacity(prefix.len());

    if let Some(first) = segments.next() {
        key.push_str(first);
    }

    for segment in segments {
        let mut chars = segment.chars();
        if let Some(head) = chars.next() {
            key.extend(head.to_uppercase());
            key.push_str(chars.as_str());
        }
    }

    key
}
