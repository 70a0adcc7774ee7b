/// Canonical dedup/merge key for a title: lower-cased, whitespace runs
/// collapsed to one space, trimmed. Never shown to users.
pub fn normalize_title(title: &str) -> String {
    title
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
