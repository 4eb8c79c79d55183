//! bitmagnet GraphQL content-database backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::BitmagnetConfig;

use super::rate_limiter::AdapterRateLimiter;
use super::{RawCategory, RawResult, SearchError, SearchQuery, SourceAdapter};

const SEARCH_QUERY: &str = r#"query TorrentContentSearch($input: TorrentContentSearchQueryInput!) {
  torrentContent {
    search(input: $input) {
      items {
        infoHash
        title
        contentType
        seeders
        leechers
        publishedAt
        torrent {
          name
          size
          magnetUri
        }
      }
    }
  }
}"#;

pub struct BitmagnetAdapter {
    client: Client,
    config: BitmagnetConfig,
    rate_limiter: Option<AdapterRateLimiter>,
}

impl BitmagnetAdapter {
    pub fn new(config: BitmagnetConfig) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| SearchError::unavailable(&config.name, e.to_string()))?;

        let rate_limiter = config
            .rate_limit_rpm
            .map(|rpm| AdapterRateLimiter::new(&config.name, rpm));

        Ok(Self {
            client,
            config,
            rate_limiter,
        })
    }

    fn request_body(&self, query: &SearchQuery) -> serde_json::Value {
        serde_json::json!({
            "query": SEARCH_QUERY,
            "variables": {
                "input": {
                    "queryString": wildcard_query(&query.text),
                    "limit": self.config.limit,
                }
            }
        })
    }
}

/// Suffix every token with `*` so the full-text index matches prefixes.
fn wildcard_query(text: &str) -> String {
    text.split_whitespace()
        .map(|token| format!("{}*", token))
        .collect::<Vec<_>>()
        .join(" ")
}

#[async_trait]
impl SourceAdapter for BitmagnetAdapter {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn priority(&self) -> u32 {
        self.config.priority
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.timeout_secs as u64)
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<RawResult>, SearchError> {
        let name = self.name();
        if let Some(limiter) = &self.rate_limiter {
            limiter.try_acquire().await?;
        }

        debug!(query = %query.text, "Searching bitmagnet");

        let response = self
            .client
            .post(&self.config.url)
            .json(&self.request_body(query))
            .send()
            .await
            .map_err(|e| SearchError::from_reqwest(name, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::unavailable(
                name,
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
            .map_err(|e| SearchError::malformed(name, format!("Failed to parse response: {}", e)))?;

        if let Some(errors) = body.get("errors").and_then(|e| e.as_array()) {
            if !errors.is_empty() {
                let message = errors
                    .iter()
                    .filter_map(|e| e.get("message").and_then(|m| m.as_str()))
                    .collect::<Vec<_>>()
                    .join("; ");
                return Err(SearchError::malformed(
                    name,
                    format!("GraphQL errors: {}", message),
                ));
            }
        }

        let items = body
            .pointer("/data/torrentContent/search/items")
            .and_then(|i| i.as_array())
            .ok_or_else(|| SearchError::malformed(name, "missing search items"))?;

        let results: Vec<RawResult> = items
            .iter()
            .filter_map(|item| match BitmagnetItem::deserialize(item) {
                Ok(item) => Some(item.into_raw(name)),
                Err(e) => {
                    warn!(error = %e, "Skipping malformed bitmagnet item");
                    None
                }
            })
            .collect();

        debug!(results = results.len(), "bitmagnet search complete");
        Ok(results)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BitmagnetItem {
    info_hash: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    content_type: Option<String>,
    #[serde(default)]
    seeders: Option<i64>,
    #[serde(default)]
    leechers: Option<i64>,
    #[serde(default)]
    published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    torrent: Option<BitmagnetTorrent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BitmagnetTorrent {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    size: Option<i64>,
    #[serde(default)]
    magnet_uri: Option<String>,
}

impl BitmagnetItem {
    fn into_raw(self, indexer: &str) -> RawResult {
        let (torrent_name, size, magnet_uri) = match self.torrent {
            Some(t) => (t.name, t.size, t.magnet_uri),
            None => (None, None, None),
        };
        let title = self
            .title
            .filter(|t| !t.trim().is_empty())
            .or(torrent_name)
            .unwrap_or_default();

        RawResult {
            id: None,
            title,
            indexer: None,
            indexer_alt: Some(indexer.to_string()),
            magnet_uri,
            link: None,
            info_hash: Some(self.info_hash),
            size_bytes: size.unwrap_or(0).max(0) as u64,
            seeders: clamp_count(self.seeders),
            leechers: clamp_count(self.leechers),
            published_at: self.published_at,
            category: self
                .content_type
                .map(RawCategory::ContentType)
                .unwrap_or_default(),
            category_desc: None,
        }
    }
}

fn clamp_count(value: Option<i64>) -> u32 {
    u32::try_from(value.unwrap_or(0).max(0)).unwrap_or(u32::MAX)
}
