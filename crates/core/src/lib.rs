pub mod config;
pub mod metrics;
pub mod search;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, BitmagnetConfig, Config, ConfigError,
    JackettConfig, SanitizedConfig, SearchConfig, ServerConfig,
};
pub use search::{
    build_adapters, parse_category, Aggregation, Aggregator, RawCategory, RawResult,
    ResponseCache, SearchError, SearchOutcome, SearchQuery, SearchService, SourceAdapter,
    UnifiedResult,
};
