//! Mock source adapter for testing.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::search::{RawResult, SearchError, SearchQuery, SourceAdapter};

/// A recorded search for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedSearch {
    /// The query that was searched.
    pub query: SearchQuery,
    /// When the search was made.
    pub timestamp: Instant,
}

/// Mock implementation of the SourceAdapter trait.
///
/// Provides controllable behavior for testing:
/// - Return configurable raw results
/// - Track search queries for assertions
/// - Simulate failures and slow backends
///
/// # Example
///
/// ```rust,ignore
/// use magnetcloud_core::testing::{MockAdapter, fixtures};
///
/// let adapter = MockAdapter::new("jackett").with_priority(10);
/// adapter.set_results(vec![
///     fixtures::raw_result("Inception.2010.1080p", Some("abc123")),
/// ]).await;
///
/// let raw = adapter.search(&query).await?;
/// assert_eq!(adapter.search_count().await, 1);
/// ```
#[derive(Debug)]
pub struct MockAdapter {
    name: String,
    priority: u32,
    timeout: Duration,
    delay: Option<Duration>,
    /// Configured results to return.
    results: Arc<RwLock<Vec<RawResult>>>,
    /// Recorded search queries.
    searches: Arc<RwLock<Vec<RecordedSearch>>>,
    /// If set, the next search will fail with this error.
    next_error: Arc<RwLock<Option<SearchError>>>,
    /// If set, every search fails with this error.
    persistent_error: Arc<RwLock<Option<SearchError>>>,
}

impl MockAdapter {
    /// Create a new mock adapter with empty results.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            priority: 100,
            timeout: Duration::from_secs(10),
            delay: None,
            results: Arc::new(RwLock::new(Vec::new())),
            searches: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            persistent_error: Arc::new(RwLock::new(None)),
        }
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sleep this long before answering each search.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Set the results to return for subsequent searches.
    pub async fn set_results(&self, results: Vec<RawResult>) {
        *self.results.write().await = results;
    }

    /// Add a single result.
    pub async fn add_result(&self, result: RawResult) {
        self.results.write().await.push(result);
    }

    /// Get recorded search queries.
    pub async fn recorded_searches(&self) -> Vec<RecordedSearch> {
        self.searches.read().await.clone()
    }

    /// Get the number of searches performed.
    pub async fn search_count(&self) -> usize {
        self.searches.read().await.len()
    }

    /// Configure the next search to fail with the given error.
    pub async fn set_next_error(&self, error: SearchError) {
        *self.next_error.write().await = Some(error);
    }

    /// Make every search fail until cleared with `None`.
    pub async fn set_persistent_error(&self, error: Option<SearchError>) {
        *self.persistent_error.write().await = error;
    }
}

#[async_trait]
impl SourceAdapter for MockAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> u32 {
        self.priority
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<RawResult>, SearchError> {
        self.searches.write().await.push(RecordedSearch {
            query: query.clone(),
            timestamp: Instant::now(),
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }
        if let Some(error) = self.persistent_error.read().await.clone() {
            return Err(error);
        }

        Ok(self.results.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    fn query(text: &str) -> SearchQuery {
        SearchQuery {
            text: text.to_string(),
            category: None,
        }
    }

    #[tokio::test]
    async fn test_returns_configured_results() {
        let adapter = MockAdapter::new("mock");
        adapter
            .set_results(vec![fixtures::raw_result("Foo", Some("abc"))])
            .await;

        let results = adapter.search(&query("foo")).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Foo");
    }

    #[tokio::test]
    async fn test_records_searches() {
        let adapter = MockAdapter::new("mock");
        adapter.search(&query("one")).await.unwrap();
        adapter.search(&query("two")).await.unwrap();

        let searches = adapter.recorded_searches().await;
        assert_eq!(searches.len(), 2);
        assert_eq!(searches[1].query.text, "two");
    }

    #[tokio::test]
    async fn test_next_error_is_one_shot() {
        let adapter = MockAdapter::new("mock");
        adapter.set_next_error(SearchError::NoBackends).await;

        assert!(adapter.search(&query("x")).await.is_err());
        assert!(adapter.search(&query("x")).await.is_ok());
    }

    #[tokio::test]
    async fn test_persistent_error() {
        let adapter = MockAdapter::new("mock");
        adapter
            .set_persistent_error(Some(SearchError::NoBackends))
            .await;
        assert!(adapter.search(&query("x")).await.is_err());
        assert!(adapter.search(&query("x")).await.is_err());

        adapter.set_persistent_error(None).await;
        assert!(adapter.search(&query("x")).await.is_ok());
    }
}
