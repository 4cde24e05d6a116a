//! Autocomplete helpers shared by the store backends and the HTTP layer.

use std::collections::BTreeSet;

/// Queries shorter than this (in characters, after trimming) are rejected.
pub const MIN_QUERY_CHARS: usize = 2;

/// Maximum number of suggestions returned.
pub const SUGGESTION_LIMIT: usize = 10;

/// Trim a suggestion query and check its length.
pub fn normalize_query(q: &str) -> Option<&str> {
    let q = q.trim();
    (q.chars().count() >= MIN_QUERY_CHARS).then_some(q)
}

/// Distinct values starting with `prefix` (case-insensitive), sorted
/// ascending by byte order and capped at `limit`.
pub fn prefix_matches<'a, I>(values: I, prefix: &str, limit: usize) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let prefix = prefix.to_lowercase();
    values
        .into_iter()
        .filter(|v| v.to_lowercase().starts_with(&prefix))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .take(limit)
        .map(str::to_string)
        .collect()
}
