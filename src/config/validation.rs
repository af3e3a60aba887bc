use crate::config::types::{Config, DatabaseConfig, ScrapingConfig};
use crate::ConfigError;

const MAX_TIMEOUT_SECS: u64 = 300;
const MAX_COLLECTED_ITEMS: usize = 10_000;
const MIN_BODY_BYTES: usize = 1024;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_scraping_config(&config.scraping)?;
    validate_database_config(&config.database)?;
    Ok(())
}

/// Validates fetch and extraction limits
fn validate_scraping_config(config: &ScrapingConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    // Header values must be visible ASCII
    if !config
        .user_agent
        .chars()
        .all(|c| c.is_ascii_graphic() || c == ' ')
    {
        return Err(ConfigError::Validation(format!(
            "user_agent must contain only printable ASCII characters, got '{}'",
            config.user_agent
        )));
    }

    if config.timeout < 1 || config.timeout > MAX_TIMEOUT_SECS {
        return Err(ConfigError::Validation(format!(
            "timeout must be between 1 and {} seconds, got {}",
            MAX_TIMEOUT_SECS, config.timeout
        )));
    }

    if config.max_links > MAX_COLLECTED_ITEMS {
        return Err(ConfigError::Validation(format!(
            "max_links must be <= {}, got {}",
            MAX_COLLECTED_ITEMS, config.max_links
        )));
    }

    if config.max_images > MAX_COLLECTED_ITEMS {
        return Err(ConfigError::Validation(format!(
            "max_images must be <= {}, got {}",
            MAX_COLLECTED_ITEMS, config.max_images
        )));
    }

    if config.max_body_bytes < MIN_BODY_BYTES {
        return Err(ConfigError::Validation(format!(
            "max_body_bytes must be >= {}, got {}",
            MIN_BODY_BYTES, config.max_body_bytes
        )));
    }

    Ok(())
}

/// Validates storage configuration
fn validate_database_config(config: &DatabaseConfig) -> Result<(), ConfigError> {
    if config.path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "database path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
