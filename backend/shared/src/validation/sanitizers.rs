//! Input sanitization functions

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Anything that is not a word character, whitespace, hyphen or period
    static ref SEARCH_DISALLOWED: Regex = Regex::new(r"[^\w\s\-\.]").unwrap();
}

/// Maximum length of a sanitized search query, in characters
pub const MAX_SEARCH_QUERY_LENGTH: usize = 100;

/// Strip a free-text search query down to words, whitespace, `-` and `.`
///
/// The result is trimmed and truncated to [`MAX_SEARCH_QUERY_LENGTH`]
/// characters. Never fails.
pub fn sanitize_search_query(query: &str) -> String {
    if query.is_empty() {
        return String::new();
    }

    let stripped = SEARCH_DISALLOWED.replace_all(query, "");
    stripped.trim().chars().take(MAX_SEARCH_QUERY_LENGTH).collect()
}
