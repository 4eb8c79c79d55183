use super::{types::Config, ConfigError};
use crate::search::JACKETT;

const TIMEOUT_RANGE: std::ops::RangeInclusive<u32> = 1..=120;

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Cache capacity and overall timeout are positive
/// - Backend sections are complete and their timeouts sane
/// - Backend names are unique
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.search.cache_capacity == 0 {
        return Err(ConfigError::ValidationError(
            "search.cache_capacity must be greater than 0".to_string(),
        ));
    }

    if config.search.overall_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "search.overall_timeout_secs must be greater than 0".to_string(),
        ));
    }

    if let Some(jackett) = &config.jackett {
        if jackett.url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "jackett.url cannot be empty".to_string(),
            ));
        }
        if jackett.api_key.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "jackett.api_key cannot be empty".to_string(),
            ));
        }
        check_timeout("jackett", jackett.timeout_secs)?;
    }

    if let Some(bitmagnet) = &config.bitmagnet {
        if bitmagnet.url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "bitmagnet.url cannot be empty".to_string(),
            ));
        }
        if bitmagnet.limit == 0 {
            return Err(ConfigError::ValidationError(
                "bitmagnet.limit must be greater than 0".to_string(),
            ));
        }
        check_timeout("bitmagnet", bitmagnet.timeout_secs)?;
        if bitmagnet.name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "bitmagnet.name cannot be empty".to_string(),
            ));
        }
        if config.jackett.is_some() && bitmagnet.name == JACKETT {
            return Err(ConfigError::ValidationError(format!(
                "bitmagnet.name '{}' is already used by the jackett backend",
                bitmagnet.name
            )));
        }
    }

    Ok(())
}

fn check_timeout(section: &str, timeout_secs: u32) -> Result<(), ConfigError> {
    if TIMEOUT_RANGE.contains(&timeout_secs) {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(format!(
            "{}.timeout_secs must be between {} and {}",
            section,
            TIMEOUT_RANGE.start(),
            TIMEOUT_RANGE.end()
        )))
    }
}
