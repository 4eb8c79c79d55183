//! Query normalizer, response cache and aggregator wired into one pipeline.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::metrics::{CACHE_LOOKUPS, SEARCH_REQUESTS};

use super::aggregator::Aggregator;
use super::bitmagnet::BitmagnetAdapter;
use super::cache::{CacheKey, ResponseCache};
use super::jackett::JackettAdapter;
use super::{SearchError, SearchQuery, SourceAdapter, UnifiedResult};

/// What a search returns to the HTTP layer.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub results: Arc<Vec<UnifiedResult>>,
    /// Adapters that failed on this request (empty on cache hits).
    pub adapter_errors: HashMap<String, String>,
    pub from_cache: bool,
}

/// Parse the raw `category` query parameter.
///
/// Empty or `all` means no filter. Anything else must be an integer ID.
pub fn parse_category(raw: &str) -> Result<Option<u32>, SearchError> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("all") {
        return Ok(None);
    }
    raw.parse::<u32>()
        .map(Some)
        .map_err(|_| SearchError::InvalidCategory(raw.to_string()))
}

/// Construct one adapter per configured backend.
pub fn build_adapters(config: &Config) -> Result<Vec<Arc<dyn SourceAdapter>>, SearchError> {
    let mut adapters: Vec<Arc<dyn SourceAdapter>> = Vec::new();

    if let Some(jackett) = &config.jackett {
        info!(url = %jackett.url, indexer = %jackett.indexer, "Jackett backend enabled");
        adapters.push(Arc::new(JackettAdapter::new(jackett.clone())?));
    }

    if let Some(bitmagnet) = &config.bitmagnet {
        info!(url = %bitmagnet.url, name = %bitmagnet.name, "bitmagnet backend enabled");
        adapters.push(Arc::new(BitmagnetAdapter::new(bitmagnet.clone())?));
    }

    Ok(adapters)
}

/// Cached, aggregated search.
pub struct SearchService {
    aggregator: Aggregator,
    cache: ResponseCache,
}

impl SearchService {
    pub fn new(aggregator: Aggregator, cache: ResponseCache) -> Self {
        Self { aggregator, cache }
    }

    /// Build the adapters, aggregator and cache described by `config`.
    pub fn from_config(config: &Config) -> Result<Self, SearchError> {
        let adapters = build_adapters(config)?;
        let aggregator = Aggregator::new(adapters, config.search.trackers.clone())
            .with_overall_timeout(Duration::from_secs(config.search.overall_timeout_secs));

        Ok(Self::new(
            aggregator,
            ResponseCache::new(
                config.search.cache_capacity,
                Duration::from_secs(config.search.cache_ttl_secs),
            ),
        ))
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Normalize the query, answer from cache when possible, else aggregate.
    ///
    /// Only complete aggregations are cached; a response with any failed
    /// adapter is served but not stored.
    pub async fn search(
        &self,
        raw_text: &str,
        category: Option<u32>,
    ) -> Result<SearchOutcome, SearchError> {
        let query = match SearchQuery::parse(raw_text, category) {
            Ok(query) => query,
            Err(e) => {
                SEARCH_REQUESTS.with_label_values(&["invalid"]).inc();
                return Err(e);
            }
        };

        if self.aggregator.is_empty() {
            SEARCH_REQUESTS.with_label_values(&["no_backends"]).inc();
            return Err(SearchError::NoBackends);
        }

        let key = CacheKey::from(&query);
        if let Some(results) = self.cache.get(&key) {
            CACHE_LOOKUPS.with_label_values(&["hit"]).inc();
            SEARCH_REQUESTS.with_label_values(&["ok"]).inc();
            debug!(key = %key, results = results.len(), "Cache hit");
            return Ok(SearchOutcome {
                results,
                adapter_errors: HashMap::new(),
                from_cache: true,
            });
        }
        CACHE_LOOKUPS.with_label_values(&["miss"]).inc();

        let aggregation = match self.aggregator.aggregate(&query).await {
            Ok(aggregation) => aggregation,
            Err(e) => {
                let outcome = match e {
                    SearchError::NoBackends => "no_backends",
                    _ => "exhausted",
                };
                SEARCH_REQUESTS.with_label_values(&[outcome]).inc();
                warn!(query = %query.text, error = %e, "Search failed");
                return Err(e);
            }
        };

        let results = Arc::new(aggregation.results);
        if aggregation.adapter_errors.is_empty() {
            self.cache.put(key, Vec::clone(&results));
            SEARCH_REQUESTS.with_label_values(&["ok"]).inc();
        } else {
            SEARCH_REQUESTS.with_label_values(&["degraded"]).inc();
        }

        info!(
            query = %query.text,
            category = ?query.category,
            results = results.len(),
            failed_adapters = aggregation.adapter_errors.len(),
            duration_ms = aggregation.duration_ms,
            "Search served"
        );

        Ok(SearchOutcome {
            results,
            adapter_errors: aggregation.adapter_errors,
            from_cache: false,
        })
    }
}
