//! Jackett search backend (numeric-indexer protocol).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::JackettConfig;

use super::rate_limiter::AdapterRateLimiter;
use super::{RawCategory, RawResult, SearchError, SearchQuery, SourceAdapter};

/// Adapter name used in logs, metrics and error reports.
pub const JACKETT: &str = "jackett";

/// Jackett search backend implementation.
pub struct JackettAdapter {
    client: Client,
    config: JackettConfig,
    rate_limiter: Option<AdapterRateLimiter>,
}

impl JackettAdapter {
    /// Create a new adapter with the given configuration.
    pub fn new(config: JackettConfig) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| SearchError::unavailable(JACKETT, e.to_string()))?;

        let rate_limiter = config
            .rate_limit_rpm
            .map(|rpm| AdapterRateLimiter::new(JACKETT, rpm));

        Ok(Self {
            client,
            config,
            rate_limiter,
        })
    }

    /// Build the Jackett API URL for a search.
    fn build_search_url(&self, query: &SearchQuery) -> String {
        let mut url = format!(
            "{}/api/v2.0/indexers/{}/results?apikey={}&Query={}",
            self.config.url.trim_end_matches('/'),
            urlencoding::encode(&self.config.indexer),
            urlencoding::encode(&self.config.api_key),
            urlencoding::encode(&query.text)
        );

        // Narrowing hint only; results are category-filtered again downstream.
        if let Some(category) = query.category {
            url.push_str(&format!("&Category[]={}", category));
        }

        url
    }
}

#[async_trait]
impl SourceAdapter for JackettAdapter {
    fn name(&self) -> &str {
        JACKETT
    }

    fn priority(&self) -> u32 {
        self.config.priority
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.timeout_secs as u64)
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<RawResult>, SearchError> {
        if let Some(limiter) = &self.rate_limiter {
            limiter.try_acquire().await?;
        }

        let url = self.build_search_url(query);
        debug!(indexer = %self.config.indexer, query = %query.text, "Searching Jackett");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SearchError::from_reqwest(JACKETT, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::unavailable(
                JACKETT,
                format!(
                    "HTTP {}: {}",
                    status,
                    body.chars().take(200).collect::<String>()
                ),
            ));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| SearchError::malformed(JACKETT, format!("Failed to parse response: {}", e)))?;

        let items = body
            .get("Results")
            .and_then(|r| r.as_array())
            .ok_or_else(|| SearchError::malformed(JACKETT, "missing Results array"))?;

        let results = parse_items(items);
        debug!(results = results.len(), "Jackett search complete");
        Ok(results)
    }
}

/// Convert each item on its own; a malformed item is skipped, not fatal.
fn parse_items(items: &[serde_json::Value]) -> Vec<RawResult> {
    items
        .iter()
        .filter_map(|item| match JackettResult::deserialize(item) {
            Ok(r) => Some(r.into_raw()),
            Err(e) => {
                warn!(error = %e, "Skipping malformed Jackett result");
                None
            }
        })
        .collect()
}

/// Parse Jackett's date format.
fn parse_jackett_date(date_str: &str) -> Option<DateTime<Utc>> {
    // Jackett returns dates in ISO 8601 format
    DateTime::parse_from_rfc3339(date_str)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|| {
            // Try parsing without timezone
            chrono::NaiveDateTime::parse_from_str(date_str, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|ndt| ndt.and_utc())
        })
}

// Jackett API response types
#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct JackettResult {
    Title: String,
    Guid: Option<String>,
    MagnetUri: Option<String>,
    Link: Option<String>,
    InfoHash: Option<String>,
    #[serde(default)]
    Category: Vec<i64>,
    CategoryDesc: Option<String>,
    Size: Option<i64>,
    Seeders: Option<i64>,
    Peers: Option<i64>,
    PublishDate: Option<String>,
    Tracker: Option<String>,
    TrackerId: Option<String>,
}

impl JackettResult {
    fn into_raw(self) -> RawResult {
        let seeders = self.Seeders.unwrap_or(0).max(0);
        let leechers = self.Peers.unwrap_or(0).saturating_sub(seeders).max(0);

        RawResult {
            id: self.Guid,
            title: self.Title,
            indexer: self.Tracker,
            indexer_alt: self.TrackerId,
            magnet_uri: self.MagnetUri,
            link: self.Link,
            info_hash: self.InfoHash,
            size_bytes: self.Size.unwrap_or(0).max(0) as u64,
            seeders: u32::try_from(seeders).unwrap_or(u32::MAX),
            leechers: u32::try_from(leechers).unwrap_or(u32::MAX),
            published_at: self.PublishDate.as_deref().and_then(parse_jackett_date),
            category: RawCategory::Numeric(
                self.Category
                    .into_iter()
                    .filter_map(|c| u32::try_from(c).ok())
                    .collect(),
            ),
            category_desc: self.CategoryDesc,
        }
    }
}
