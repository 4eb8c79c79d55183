//! Concurrent fan-out across all registered source adapters.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::metrics::{ADAPTER_DURATION, ADAPTER_REQUESTS, SEARCH_RESULTS};

use super::category;
use super::dedup::{deduplicate_results, ensure_unique_ids};
use super::normalizer::ResultNormalizer;
use super::relevance::RelevanceFilter;
use super::{Aggregation, RawResult, SearchError, SearchQuery, SourceAdapter};

type AdapterOutcome = Result<Vec<RawResult>, SearchError>;

/// Runs every adapter concurrently and merges their output.
///
/// Adapters are kept sorted by `(priority, name)`; that order decides which
/// copy survives deduplication, regardless of which adapter answers first.
pub struct Aggregator {
    adapters: Vec<Arc<dyn SourceAdapter>>,
    trackers: Vec<String>,
    overall_timeout: Option<Duration>,
}

impl Aggregator {
    pub fn new(mut adapters: Vec<Arc<dyn SourceAdapter>>, trackers: Vec<String>) -> Self {
        adapters.sort_by(|a, b| {
            a.priority()
                .cmp(&b.priority())
                .then_with(|| a.name().cmp(b.name()))
        });
        Self {
            adapters,
            trackers,
            overall_timeout: None,
        }
    }

    /// Stop waiting after `timeout` and return whatever adapters have finished.
    pub fn with_overall_timeout(mut self, timeout: Duration) -> Self {
        self.overall_timeout = Some(timeout);
        self
    }

    /// Adapter names in dedup priority order.
    pub fn adapter_names(&self) -> Vec<&str> {
        self.adapters.iter().map(|a| a.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Query all adapters and return the merged, deduplicated, filtered set.
    ///
    /// Individual adapter failures are recorded in `adapter_errors`; only
    /// the failure of every adapter is an error.
    pub async fn aggregate(&self, query: &SearchQuery) -> Result<Aggregation, SearchError> {
        if self.adapters.is_empty() {
            return Err(SearchError::NoBackends);
        }

        let start = Instant::now();
        debug!(
            adapters = ?self.adapter_names(),
            query = %query.text,
            category = ?query.category,
            "Starting parallel search"
        );

        let mut slots: Vec<Option<AdapterOutcome>> = self.adapters.iter().map(|_| None).collect();
        let mut last_error: Option<String> = None;

        // Dropping the set aborts any adapter still in flight.
        let mut tasks = JoinSet::new();
        for (index, adapter) in self.adapters.iter().enumerate() {
            let adapter = Arc::clone(adapter);
            let query = query.clone();
            tasks.spawn(async move { (index, run_adapter(adapter.as_ref(), &query).await) });
        }

        let deadline = self.overall_timeout.map(|t| start + t);
        let mut deadline_hit = false;
        loop {
            let next = match deadline {
                Some(deadline) => match tokio::time::timeout_at(deadline, tasks.join_next()).await {
                    Ok(next) => next,
                    Err(_) => {
                        warn!(
                            pending = tasks.len(),
                            "Overall search deadline reached, returning partial results"
                        );
                        deadline_hit = true;
                        break;
                    }
                },
                None => tasks.join_next().await,
            };

            match next {
                None => break,
                Some(Ok((index, outcome))) => {
                    if let Err(e) = &outcome {
                        warn!(adapter = %self.adapters[index].name(), error = %e, "Adapter search failed");
                        last_error = Some(e.to_string());
                    }
                    slots[index] = Some(outcome);
                }
                Some(Err(e)) => {
                    warn!(error = %e, "Adapter task failed");
                }
            }
        }
        tasks.abort_all();

        let mut normalizer = ResultNormalizer::new(&self.trackers);
        let mut batches = Vec::with_capacity(self.adapters.len());
        let mut adapter_errors: HashMap<String, String> = HashMap::new();
        let mut failed = 0;

        for (adapter, slot) in self.adapters.iter().zip(slots) {
            let name = adapter.name();
            let outcome = slot.unwrap_or_else(|| {
                let e = if deadline_hit {
                    SearchError::Timeout {
                        source_name: name.to_string(),
                    }
                } else {
                    SearchError::unavailable(name, "adapter task failed")
                };
                last_error = Some(e.to_string());
                Err(e)
            });

            match outcome {
                Ok(raw) => batches.push(normalizer.normalize_batch(raw, name)),
                Err(e) => {
                    failed += 1;
                    adapter_errors.insert(name.to_string(), e.to_string());
                }
            }
        }

        if failed == self.adapters.len() {
            return Err(SearchError::AggregationExhausted {
                last_error: last_error.unwrap_or_else(|| "unknown error".to_string()),
                errors: adapter_errors,
            });
        }

        let mut results = deduplicate_results(batches);

        if let Some(requested) = query.category {
            results.retain(|r| category::matches(&r.category_ids, requested));
        }

        let mut results = RelevanceFilter::new(&query.text).apply(results);
        ensure_unique_ids(&mut results);

        let duration_ms = start.elapsed().as_millis() as u64;
        SEARCH_RESULTS.observe(results.len() as f64);

        debug!(
            results = results.len(),
            failed_adapters = adapter_errors.len(),
            duration_ms = duration_ms,
            "Search complete"
        );

        Ok(Aggregation {
            results,
            adapter_errors,
            duration_ms,
        })
    }
}

/// Run one adapter under its own timeout.
async fn run_adapter(adapter: &dyn SourceAdapter, query: &SearchQuery) -> AdapterOutcome {
    let started = Instant::now();
    let name = adapter.name();

    let outcome = match tokio::time::timeout(adapter.timeout(), adapter.search(query)).await {
        Ok(outcome) => outcome,
        Err(_) => Err(SearchError::Timeout {
            source_name: name.to_string(),
        }),
    };

    let status = match &outcome {
        Ok(_) => "success",
        Err(SearchError::Timeout { .. }) => "timeout",
        Err(_) => "error",
    };
    ADAPTER_REQUESTS.with_label_values(&[name, status]).inc();
    ADAPTER_DURATION
        .with_label_values(&[name])
        .observe(started.elapsed().as_secs_f64());

    if let Ok(raw) = &outcome {
        debug!(adapter = name, results = raw.len(), "Adapter search complete");
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::RawCategory;
    use crate::testing::{fixtures, MockAdapter};

    fn query(text: &str, category: Option<u32>) -> SearchQuery {
        SearchQuery::parse(text, category).unwrap()
    }

    fn aggregator(adapters: Vec<Arc<MockAdapter>>) -> Aggregator {
        Aggregator::new(
            adapters
                .into_iter()
                .map(|a| a as Arc<dyn SourceAdapter>)
                .collect(),
            vec![],
        )
    }

    #[tokio::test]
    async fn test_no_adapters_is_an_error() {
        let aggregator = Aggregator::new(vec![], vec![]);
        let err = aggregator.aggregate(&query("test", None)).await.unwrap_err();
        assert!(matches!(err, SearchError::NoBackends));
    }

    #[tokio::test]
    async fn test_adapters_sorted_by_priority() {
        let low = Arc::new(MockAdapter::new("zeta").with_priority(1));
        let high = Arc::new(MockAdapter::new("alpha").with_priority(5));
        let agg = aggregator(vec![high, low]);
        assert_eq!(agg.adapter_names(), vec!["zeta", "alpha"]);
    }

    #[tokio::test]
    async fn test_priority_source_wins_dedup() {
        // The priority source answers last; it must still win.
        let priority = Arc::new(
            MockAdapter::new("jackett")
                .with_priority(10)
                .with_delay(Duration::from_millis(50)),
        );
        let secondary = Arc::new(MockAdapter::new("bitmagnet").with_priority(20));

        let mut rich = fixtures::raw_result("Inception.2010.1080p.BluRay", Some("ABCDEF"));
        rich.seeders = 120;
        priority.set_results(vec![rich]).await;

        let mut poor = fixtures::raw_result("Inception 2010 1080p", Some("abcdef"));
        poor.seeders = 2;
        secondary.set_results(vec![poor]).await;

        let agg = aggregator(vec![secondary, priority]);
        let result = agg.aggregate(&query("Inception 2010", None)).await.unwrap();

        assert_eq!(result.results.len(), 1);
        assert_eq!(result.results[0].seeders, 120);
        assert!(result.results[0].magnet_uri.is_some());
    }

    #[tokio::test]
    async fn test_one_failure_does_not_fail_search() {
        let ok = Arc::new(MockAdapter::new("ok"));
        ok.set_results(vec![fixtures::raw_result("Ubuntu 24.04", Some("h1"))])
            .await;
        let broken = Arc::new(MockAdapter::new("broken"));
        broken
            .set_next_error(SearchError::unavailable("broken", "connection refused"))
            .await;

        let result = aggregator(vec![ok, broken])
            .aggregate(&query("ubuntu", None))
            .await
            .unwrap();

        assert_eq!(result.results.len(), 1);
        assert!(result.adapter_errors.contains_key("broken"));
    }

    #[tokio::test]
    async fn test_all_failures_exhaust() {
        let a = Arc::new(MockAdapter::new("a"));
        a.set_next_error(SearchError::unavailable("a", "down")).await;
        let b = Arc::new(MockAdapter::new("b"));
        b.set_next_error(SearchError::malformed("b", "not json")).await;

        let err = aggregator(vec![a, b])
            .aggregate(&query("ubuntu", None))
            .await
            .unwrap_err();

        match err {
            SearchError::AggregationExhausted { errors, last_error } => {
                assert_eq!(errors.len(), 2);
                assert!(!last_error.is_empty());
            }
            other => panic!("expected exhaustion, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_all_failures_exhaust_with_shared_names() {
        let a = Arc::new(MockAdapter::new("jackett").with_priority(1));
        a.set_persistent_error(Some(SearchError::unavailable("jackett", "down")))
            .await;
        let b = Arc::new(MockAdapter::new("jackett").with_priority(2));
        b.set_persistent_error(Some(SearchError::unavailable("jackett", "down")))
            .await;

        let err = aggregator(vec![a, b])
            .aggregate(&query("ubuntu", None))
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::AggregationExhausted { .. }));
    }

    #[tokio::test]
    async fn test_zero_results_is_not_an_error() {
        let agg = aggregator(vec![Arc::new(MockAdapter::new("empty"))]);
        let result = agg.aggregate(&query("nothing", None)).await.unwrap();
        assert!(result.results.is_empty());
        assert!(result.adapter_errors.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_adapter_times_out_individually() {
        let fast = Arc::new(MockAdapter::new("fast"));
        fast.set_results(vec![fixtures::raw_result("Debian 12", Some("h1"))])
            .await;
        let slow = Arc::new(
            MockAdapter::new("slow")
                .with_timeout(Duration::from_secs(5))
                .with_delay(Duration::from_secs(60)),
        );
        slow.set_results(vec![fixtures::raw_result("Debian 12 slow", Some("h2"))])
            .await;

        let result = aggregator(vec![fast, slow])
            .aggregate(&query("debian", None))
            .await
            .unwrap();

        assert_eq!(result.results.len(), 1);
        assert!(result.adapter_errors["slow"].contains("timed out"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_overall_deadline_returns_partial_results() {
        let fast = Arc::new(MockAdapter::new("fast"));
        fast.set_results(vec![fixtures::raw_result("Arch Linux", Some("h1"))])
            .await;
        let slow = Arc::new(
            MockAdapter::new("slow")
                .with_timeout(Duration::from_secs(60))
                .with_delay(Duration::from_secs(30)),
        );

        let agg = aggregator(vec![fast, slow]).with_overall_timeout(Duration::from_secs(2));
        let result = agg.aggregate(&query("arch", None)).await.unwrap();

        assert_eq!(result.results.len(), 1);
        assert!(result.adapter_errors.contains_key("slow"));
    }

    #[tokio::test]
    async fn test_category_filter_applied() {
        let adapter = Arc::new(MockAdapter::new("a"));
        let mut uhd = fixtures::raw_result("Dune 2021 2160p", Some("h1"));
        uhd.category = RawCategory::Numeric(vec![2045]);
        let mut hd = fixtures::raw_result("Dune 2021 1080p", Some("h2"));
        hd.category = RawCategory::Numeric(vec![2040]);
        let mut tv = fixtures::raw_result("Dune Prophecy S01", Some("h3"));
        tv.category = RawCategory::Numeric(vec![5040]);
        adapter.set_results(vec![uhd, hd, tv]).await;

        let agg = aggregator(vec![adapter]);

        let movies = agg.aggregate(&query("dune", Some(2000))).await.unwrap();
        assert_eq!(movies.results.len(), 2);

        let uhd_only = agg.aggregate(&query("dune", Some(2045))).await.unwrap();
        assert_eq!(uhd_only.results.len(), 1);
        assert_eq!(uhd_only.results[0].title, "Dune 2021 2160p");
    }

    #[tokio::test]
    async fn test_relevance_filter_applied() {
        let adapter = Arc::new(MockAdapter::new("a"));
        adapter
            .set_results(vec![
                fixtures::raw_result("The.Matrix.1999.1080p", Some("h1")),
                fixtures::raw_result("Totally Unrelated Thing", Some("h2")),
            ])
            .await;

        let result = aggregator(vec![adapter])
            .aggregate(&query("The Matrix 1999", None))
            .await
            .unwrap();

        assert_eq!(result.results.len(), 1);
        assert_eq!(result.results[0].title, "The.Matrix.1999.1080p");
    }

    #[tokio::test]
    async fn test_ids_unique_across_sources() {
        let a = Arc::new(MockAdapter::new("a").with_priority(1));
        let b = Arc::new(MockAdapter::new("b").with_priority(2));
        let mut ra = fixtures::raw_result("Linux Mint", Some("h1"));
        ra.id = Some("42".to_string());
        let mut rb = fixtures::raw_result("Linux Mint XFCE", Some("h2"));
        rb.id = Some("42".to_string());
        a.set_results(vec![ra]).await;
        b.set_results(vec![rb]).await;

        let result = aggregator(vec![a, b])
            .aggregate(&query("linux mint", None))
            .await
            .unwrap();
        assert_eq!(result.results.len(), 2);
        assert_ne!(result.results[0].id, result.results[1].id);
    }
}
