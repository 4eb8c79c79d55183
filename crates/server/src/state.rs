use std::sync::Arc;
use magnetcloud_core::{Config, SanitizedConfig, SearchService};

/// Shared application state
pub struct AppState {
    config: Config,
    search: Arc<SearchService>,
}

impl AppState {
    pub fn new(config: Config, search: Arc<SearchService>) -> Self {
        Self { config, search }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn search(&self) -> &SearchService {
        self.search.as_ref()
    }
}
