//! Token-overlap relevance filter.
//!
//! A recall-biased heuristic, not a ranking: survivors keep their input order.

use super::normalize::{normalize_title, query_tokens};
use super::UnifiedResult;

/// Shortest query word that counts as a token.
pub const MIN_TOKEN_LEN: usize = 2;

/// Number of query tokens a title must contain.
///
/// One for short queries (two tokens or fewer), otherwise a third of the
/// tokens rounded down, never below one.
pub fn required_matches(token_count: usize) -> usize {
    if token_count <= 2 {
        1
    } else {
        (token_count / 3).max(1)
    }
}

/// Query tokens prepared for matching against many titles.
#[derive(Debug, Clone)]
pub struct RelevanceFilter {
    tokens: Vec<String>,
    required: usize,
}

impl RelevanceFilter {
    /// Build a filter from an already-normalized query.
    pub fn new(normalized_query: &str) -> Self {
        let tokens = query_tokens(normalized_query, MIN_TOKEN_LEN);
        let required = required_matches(tokens.len());
        Self { tokens, required }
    }

    /// An empty token set never excludes anything.
    pub fn is_noop(&self) -> bool {
        self.tokens.is_empty()
    }

    /// How many query tokens appear in `title`.
    pub fn match_count(&self, title: &str) -> usize {
        let title = normalize_title(title);
        self.tokens
            .iter()
            .filter(|token| title.contains(token.as_str()))
            .count()
    }

    pub fn is_relevant(&self, title: &str) -> bool {
        self.is_noop() || self.match_count(title) >= self.required
    }

    /// Drop results whose titles fall below the match threshold.
    pub fn apply(&self, results: Vec<UnifiedResult>) -> Vec<UnifiedResult> {
        if self.is_noop() {
            return results;
        }
        results
            .into_iter()
            .filter(|r| self.is_relevant(&r.title))
            .collect()
    }
}
