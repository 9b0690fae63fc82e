//! Usage: Lenient query-string access for handlers that must never reject a request.
//!
//! Handlers extract `Option<Query<QueryPairs>>`: every well-formed or repeated key decodes into
//! the pair list, and the first non-blank value for a key wins.

use axum::extract::Query;

pub(crate) type QueryPairs = Vec<(String, String)>;

/// An unparsable query string reads as empty rather than rejecting the request.
pub(crate) fn pairs_or_empty(query: Option<Query<QueryPairs>>) -> QueryPairs {
    query.map(|Query(pairs)| pairs).unwrap_or_default()
}

pub(crate) fn first_value<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .filter(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
        .find(|v| !v.trim().is_empty())
}
