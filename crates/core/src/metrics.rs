//! Prometheus metrics for the search core.
//!
//! This module provides metrics for:
//! - Search requests and cache effectiveness
//! - Per-adapter outbound calls (count, status, latency)

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, HistogramVec, IntCounterVec, Opts};

// =============================================================================
// Search Metrics
// =============================================================================

/// Search requests by outcome.
pub static SEARCH_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("magnetcloud_search_requests_total", "Total search requests"),
        &["outcome"], // "ok", "degraded", "invalid", "exhausted", "no_backends"
    )
    .unwrap()
});

/// Response cache lookups by result.
pub static CACHE_LOOKUPS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "magnetcloud_cache_lookups_total",
            "Response cache lookups",
        ),
        &["result"], // "hit", "miss"
    )
    .unwrap()
});

/// Results returned per aggregation (after dedup and filtering).
pub static SEARCH_RESULTS: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "magnetcloud_search_results",
            "Number of results returned per aggregation",
        )
        .buckets(vec![0.0, 1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0]),
    )
    .unwrap()
});

// =============================================================================
// Adapter Metrics
// =============================================================================

/// Adapter requests by adapter and status.
pub static ADAPTER_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "magnetcloud_adapter_requests_total",
            "Total adapter search requests",
        ),
        &["adapter", "status"], // status: "success", "error", "timeout"
    )
    .unwrap()
});

/// Adapter request duration.
pub static ADAPTER_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "magnetcloud_adapter_duration_seconds",
            "Duration of adapter search calls",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 20.0]),
        &["adapter"],
    )
    .unwrap()
});

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(SEARCH_REQUESTS.clone()),
        Box::new(CACHE_LOOKUPS.clone()),
        Box::new(SEARCH_RESULTS.clone()),
        Box::new(ADAPTER_REQUESTS.clone()),
        Box::new(ADAPTER_DURATION.clone()),
    ]
}
