use crate::config::types::{Config, HarvestConfig, TargetConfig};
use crate::ConfigError;
use url::Url;

const MAX_CONCURRENCY_LIMIT: u32 = 32;
const MIN_VALIDATION_TIMEOUT_MS: u64 = 100;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_harvest_config(&config.harvest)?;
    validate_target_config(&config.target)?;
    Ok(())
}

/// Validates fetch orchestration settings
fn validate_harvest_config(config: &HarvestConfig) -> Result<(), ConfigError> {
    if config.num_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "num_pages must be >= 1, got {}",
            config.num_pages
        )));
    }

    if config.concurrency_limit < 1 || config.concurrency_limit > MAX_CONCURRENCY_LIMIT {
        return Err(ConfigError::Validation(format!(
            "concurrency_limit must be between 1 and {}, got {}",
            MAX_CONCURRENCY_LIMIT, config.concurrency_limit
        )));
    }

    if config.max_retries < 1 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be >= 1, got {}",
            config.max_retries
        )));
    }

    if config.min_result_threshold < 1 {
        return Err(ConfigError::Validation(format!(
            "min_result_threshold must be >= 1, got {}",
            config.min_result_threshold
        )));
    }

    if config.page_size < 1 {
        return Err(ConfigError::Validation(format!(
            "page_size must be >= 1, got {}",
            config.page_size
        )));
    }

    if config.validation_timeout_ms < MIN_VALIDATION_TIMEOUT_MS {
        return Err(ConfigError::Validation(format!(
            "validation_timeout_ms must be >= {}ms, got {}ms",
            MIN_VALIDATION_TIMEOUT_MS, config.validation_timeout_ms
        )));
    }

    if let Some(deadline) = config.attempt_deadline_ms {
        if deadline < config.validation_timeout_ms {
            return Err(ConfigError::Validation(format!(
                "attempt_deadline_ms ({}ms) must be >= validation_timeout_ms ({}ms)",
                deadline, config.validation_timeout_ms
            )));
        }
    }

    Ok(())
}

/// Validates the target site settings
fn validate_target_config(config: &TargetConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url '{}': {}", config.base_url, e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must use http or https",
            config.base_url
        )));
    }

    for (name, value) in [
        ("result_selector", &config.result_selector),
        ("identifier_selector", &config.identifier_selector),
        ("identifier_attribute", &config.identifier_attribute),
        ("name_selector", &config.name_selector),
    ] {
        if value.trim().is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
    }

    Ok(())
}
