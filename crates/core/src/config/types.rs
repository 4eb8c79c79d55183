use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::search::magnet::default_trackers;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub search: SearchConfig,
    /// Numeric-indexer backend (required for search unless bitmagnet is set)
    #[serde(default)]
    pub jackett: Option<JackettConfig>,
    /// GraphQL content-database backend
    #[serde(default)]
    pub bitmagnet: Option<BitmagnetConfig>,
}

impl Config {
    /// Whether at least one indexing backend is configured.
    pub fn has_backends(&self) -> bool {
        self.jackett.is_some() || self.bitmagnet.is_some()
    }
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory with the web UI build, served with SPA fallback
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: None,
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    5000
}

/// Aggregated search configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Response cache TTL in seconds (default: 120)
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
    /// Maximum cached queries (default: 256)
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: u64,
    /// Upper bound on a whole aggregation; partial results are returned after it (default: 25)
    #[serde(default = "default_overall_timeout")]
    pub overall_timeout_secs: u64,
    /// Announce trackers appended to magnets that carry none
    #[serde(default = "default_trackers")]
    pub trackers: Vec<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl(),
            cache_capacity: default_cache_capacity(),
            overall_timeout_secs: default_overall_timeout(),
            trackers: default_trackers(),
        }
    }
}

fn default_cache_ttl() -> u64 {
    120
}

fn default_cache_capacity() -> u64 {
    256
}

fn default_overall_timeout() -> u64 {
    25
}

/// Jackett search backend configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JackettConfig {
    /// Jackett server URL (e.g., "http://localhost:9117")
    pub url: String,
    /// Jackett API key
    pub api_key: String,
    /// Indexer to query (default: "all")
    #[serde(default = "default_jackett_indexer")]
    pub indexer: String,
    /// Request timeout in seconds (default: 10)
    #[serde(default = "default_jackett_timeout")]
    pub timeout_secs: u32,
    /// Dedup priority, lower wins (default: 10)
    #[serde(default = "default_jackett_priority")]
    pub priority: u32,
    /// Optional outbound limit in requests per minute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limit_rpm: Option<u32>,
}

fn default_jackett_indexer() -> String {
    "all".to_string()
}

fn default_jackett_timeout() -> u32 {
    10
}

fn default_jackett_priority() -> u32 {
    10
}

/// bitmagnet GraphQL backend configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BitmagnetConfig {
    /// GraphQL endpoint (e.g., "http://localhost:3333/graphql")
    pub url: String,
    /// Name reported as the indexer for its results (default: "bitmagnet")
    #[serde(default = "default_bitmagnet_name")]
    pub name: String,
    /// Maximum items per query (default: 100)
    #[serde(default = "default_bitmagnet_limit")]
    pub limit: u32,
    /// Request timeout in seconds (default: 5)
    #[serde(default = "default_bitmagnet_timeout")]
    pub timeout_secs: u32,
    /// Dedup priority, lower wins (default: 20)
    #[serde(default = "default_bitmagnet_priority")]
    pub priority: u32,
    /// Optional outbound limit in requests per minute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limit_rpm: Option<u32>,
}

fn default_bitmagnet_name() -> String {
    "bitmagnet".to_string()
}

fn default_bitmagnet_limit() -> u32 {
    100
}

fn default_bitmagnet_timeout() -> u32 {
    5
}

fn default_bitmagnet_priority() -> u32 {
    20
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub search: SearchConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jackett: Option<SanitizedJackettConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitmagnet: Option<BitmagnetConfig>,
}

/// Sanitized Jackett config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedJackettConfig {
    pub url: String,
    pub api_key_configured: bool,
    pub indexer: String,
    pub timeout_secs: u32,
    pub priority: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limit_rpm: Option<u32>,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            search: config.search.clone(),
            jackett: config.jackett.as_ref().map(|j| SanitizedJackettConfig {
                url: j.url.clone(),
                api_key_configured: !j.api_key.is_empty(),
                indexer: j.indexer.clone(),
                timeout_secs: j.timeout_secs,
                priority: j.priority,
                rate_limit_rpm: j.rate_limit_rpm,
            }),
            bitmagnet: config.bitmagnet.clone(),
        }
    }
}
