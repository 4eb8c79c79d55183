//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with mock search adapters injected, enabling E2E testing of the HTTP
//! surface without real indexers.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use magnetcloud_core::{
    testing::MockAdapter, Aggregator, Config, ResponseCache, SearchService, SourceAdapter,
};
use magnetcloud_server::state::AppState;

/// Re-export fixtures for test convenience
pub use magnetcloud_core::testing::fixtures;

/// Test fixture for E2E testing with mock dependencies.
///
/// Two mock adapters are registered: `primary` (priority 10) and
/// `secondary` (priority 20), so `primary` wins duplicate info hashes.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_search() {
///     let fixture = TestFixture::new().await;
///     fixture.primary.set_results(vec![fixtures::raw_result("Dune", Some("aa"))]).await;
///
///     let response = fixture.get("/api/search?q=dune").await;
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Higher-priority mock adapter
    pub primary: Arc<MockAdapter>,
    /// Lower-priority mock adapter
    pub secondary: Arc<MockAdapter>,
    /// Search service behind the router (for cache assertions)
    pub search: Arc<SearchService>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
}

impl TestFixture {
    /// Create a new test fixture with default mocks.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with custom configuration.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let primary = Arc::new(MockAdapter::new("primary").with_priority(10));
        let secondary = Arc::new(MockAdapter::new("secondary").with_priority(20));

        let adapters: Vec<Arc<dyn SourceAdapter>> = if test_config.no_backends {
            Vec::new()
        } else {
            vec![
                Arc::clone(&primary) as Arc<dyn SourceAdapter>,
                Arc::clone(&secondary) as Arc<dyn SourceAdapter>,
            ]
        };

        let mut config = Config::default();
        config.server.host = std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST);
        config.server.static_dir = test_config.static_dir;

        let search = Arc::new(SearchService::new(
            Aggregator::new(adapters, config.search.trackers.clone()),
            ResponseCache::new(
                config.search.cache_capacity,
                Duration::from_secs(config.search.cache_ttl_secs),
            ),
        ));

        let state = Arc::new(AppState::new(config, Arc::clone(&search)));
        let router = magnetcloud_server::api::create_router(state);

        Self {
            router,
            primary,
            secondary,
            search,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).into_owned();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body, text }
    }
}

/// Configuration for test fixture.
#[derive(Debug, Clone, Default)]
pub struct TestConfig {
    /// Register no adapters at all
    pub no_backends: bool,
    /// Serve static files from this directory
    pub static_dir: Option<PathBuf>,
}

impl TestConfig {
    /// Create config with no indexing backends.
    pub fn without_backends() -> Self {
        Self {
            no_backends: true,
            ..Default::default()
        }
    }

    /// Create config serving a web UI from `dir`.
    pub fn with_static_dir(dir: PathBuf) -> Self {
        Self {
            static_dir: Some(dir),
            ..Default::default()
        }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            $response.text
        );
    };
}
