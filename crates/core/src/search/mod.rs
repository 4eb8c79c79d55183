//! Aggregated torrent search.
//!
//! A query is normalized, looked up in the response cache and, on a miss,
//! fanned out to every configured [`SourceAdapter`]. Raw results are mapped
//! onto [`UnifiedResult`], deduplicated by info hash in adapter priority
//! order, filtered by category and relevance, then cached.

mod aggregator;
mod bitmagnet;
mod cache;
pub mod category;
mod dedup;
mod jackett;
pub mod magnet;
pub mod normalize;
mod normalizer;
mod rate_limiter;
mod relevance;
mod service;
#[cfg(test)]
mod test_server;
mod types;

pub use aggregator::Aggregator;
pub use bitmagnet::BitmagnetAdapter;
pub use cache::{CacheKey, ResponseCache};
pub use dedup::{deduplicate_results, ensure_unique_ids};
pub use jackett::{JackettAdapter, JACKETT};
pub use normalizer::{ResultNormalizer, UNKNOWN_INDEXER};
pub use rate_limiter::{AdapterRateLimiter, TokenBucket};
pub use relevance::RelevanceFilter;
pub use service::{build_adapters, parse_category, SearchOutcome, SearchService};
pub use types::*;
