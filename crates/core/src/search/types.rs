//! Types for the aggregated torrent search system.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::time::Duration;
use thiserror::Error;

/// A validated, normalized search request.
///
/// Two queries with identical `text` and `category` are the same query for
/// caching purposes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Normalized free-text query (never empty).
    pub text: String,
    /// Optional canonical category ID to filter by.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<u32>,
}

impl SearchQuery {
    /// Build a query from raw user input, normalizing the text.
    ///
    /// Returns `SearchError::EmptyQuery` if nothing survives normalization.
    pub fn parse(raw_text: &str, category: Option<u32>) -> Result<Self, SearchError> {
        let text = super::normalize::normalize_query(raw_text);
        if text.is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        Ok(Self { text, category })
    }
}

/// One torrent candidate, normalized across sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedResult {
    /// Unique within one response; not stable across requests.
    pub id: String,
    pub title: String,
    /// Size in bytes, 0 if unknown.
    pub size_bytes: u64,
    pub seeders: u32,
    pub leechers: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    /// Absent when no reliable retrieval link could be built.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magnet_uri: Option<String>,
    /// Lowercase hex info hash, empty if unknown.
    pub info_hash: String,
    pub indexer_name: String,
    pub category_ids: BTreeSet<u32>,
    pub category_label: String,
}

/// Category as reported by a backend, before mapping to the canonical taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RawCategory {
    /// Numeric (Newznab-style) category IDs.
    Numeric(Vec<u32>),
    /// Closed content-type enum value (e.g. `"movie"`, `"tv_show"`).
    ContentType(String),
    #[default]
    Unknown,
}

/// Result from a single adapter, before normalization.
#[derive(Debug, Clone, Default)]
pub struct RawResult {
    /// Stable ID supplied by the backend, if any.
    pub id: Option<String>,
    pub title: String,
    /// Explicit indexer/tracker name.
    pub indexer: Option<String>,
    /// Alternate indexer identifier, used when `indexer` is missing.
    pub indexer_alt: Option<String>,
    pub magnet_uri: Option<String>,
    /// Generic download link (may itself be a magnet URI).
    pub link: Option<String>,
    pub info_hash: Option<String>,
    pub size_bytes: u64,
    pub seeders: u32,
    pub leechers: u32,
    pub published_at: Option<DateTime<Utc>>,
    pub category: RawCategory,
    /// Human category description supplied by the backend.
    pub category_desc: Option<String>,
}

/// Outcome of a single aggregation across all adapters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Aggregation {
    /// Surviving results, in dedup priority order.
    pub results: Vec<UnifiedResult>,
    /// Adapters that failed (name -> error message).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub adapter_errors: HashMap<String, String>,
    /// How long the aggregation took in milliseconds.
    pub duration_ms: u64,
}

/// Errors that can occur during search operations.
#[derive(Debug, Clone, Error)]
pub enum SearchError {
    #[error("Query is empty after normalization")]
    EmptyQuery,

    #[error("Invalid category: {0}")]
    InvalidCategory(String),

    #[error("No indexing backend configured")]
    NoBackends,

    #[error("{source_name} unavailable: {message}")]
    UpstreamUnavailable {
        source_name: String,
        message: String,
    },

    #[error("{source_name} returned a malformed response: {message}")]
    UpstreamMalformed {
        source_name: String,
        message: String,
    },

    #[error("Rate limited for {source_name}, retry in {retry_after_ms}ms")]
    RateLimited {
        source_name: String,
        retry_after_ms: u64,
    },

    #[error("{source_name} timed out")]
    Timeout { source_name: String },

    #[error("All indexers failed: {last_error}")]
    AggregationExhausted {
        last_error: String,
        errors: HashMap<String, String>,
    },
}

impl SearchError {
    /// Whether this error was caused by bad client input.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::EmptyQuery | Self::InvalidCategory(_))
    }

    pub(crate) fn unavailable(source: &str, message: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            source_name: source.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn malformed(source: &str, message: impl Into<String>) -> Self {
        Self::UpstreamMalformed {
            source_name: source.to_string(),
            message: message.into(),
        }
    }

    /// Map a reqwest failure to the matching upstream error.
    pub(crate) fn from_reqwest(source: &str, e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout {
                source_name: source.to_string(),
            }
        } else if e.is_decode() {
            Self::malformed(source, e.to_string())
        } else {
            Self::unavailable(source, e.to_string())
        }
    }
}

/// A searchable indexing backend.
///
/// Implementations own their raw output only; they must not retain the
/// unified results. Failures stay local to the adapter.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Adapter name for logging, metrics and error reports.
    fn name(&self) -> &str;

    /// Dedup priority; lower values win when two sources share an info hash.
    fn priority(&self) -> u32;

    /// Per-call timeout enforced by the aggregator.
    fn timeout(&self) -> Duration;

    /// Run the query against the backend.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<RawResult>, SearchError>;
}
