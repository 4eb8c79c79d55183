//! Testing utilities and mock implementations.
//!
//! Provides a mock [`SourceAdapter`](crate::search::SourceAdapter) and raw
//! result fixtures so aggregation can be exercised without real backends.
//!
//! # Example
//!
//! ```rust,ignore
//! use magnetcloud_core::testing::{MockAdapter, fixtures};
//!
//! let jackett = MockAdapter::new("jackett").with_priority(10);
//! jackett.set_results(vec![fixtures::raw_result("Foo", Some("abc"))]).await;
//! ```

mod mock_adapter;

pub use mock_adapter::{MockAdapter, RecordedSearch};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::search::{RawCategory, RawResult};

    /// Create a raw result with reasonable defaults.
    pub fn raw_result(title: &str, info_hash: Option<&str>) -> RawResult {
        RawResult {
            id: None,
            title: title.to_string(),
            indexer: Some("mock-indexer".to_string()),
            indexer_alt: None,
            magnet_uri: None,
            link: None,
            info_hash: info_hash.map(str::to_string),
            size_bytes: 1024 * 1024 * 700, // 700 MB
            seeders: 25,
            leechers: 5,
            published_at: None,
            category: RawCategory::Numeric(vec![2000]),
            category_desc: None,
        }
    }

    /// Create a raw movie result as a numeric-category indexer reports it.
    pub fn movie_result(title: &str, year: u32, info_hash: &str) -> RawResult {
        let mut raw = raw_result(&format!("{}.{}.1080p.BluRay", title, year), Some(info_hash));
        raw.category = RawCategory::Numeric(vec![2000, 2040]);
        raw.category_desc = Some("Movies/HD".to_string());
        raw.size_bytes = 1024 * 1024 * 1024 * 4; // 4 GB
        raw
    }

    /// Create a raw result as a content-type backend reports it.
    pub fn content_result(title: &str, content_type: &str, info_hash: &str) -> RawResult {
        let mut raw = raw_result(title, Some(info_hash));
        raw.indexer = None;
        raw.indexer_alt = Some("bitmagnet".to_string());
        raw.category = RawCategory::ContentType(content_type.to_string());
        raw
    }
}
