//! Card-Harvester: a bounded, retrying collector for rendered search results
//!
//! This crate fetches a batch of paginated search-result pages through a
//! browser automation driver, extracts `{name, identifier}` records from the
//! result cards, and merges them into a deduplicated, order-stable list.

pub mod config;
pub mod driver;
pub mod harvest;
pub mod output;
pub mod state;

use thiserror::Error;

/// Main error type for Card-Harvester operations
///
/// Only failures outside the per-page retry loop end up here. Page-level
/// failures degrade to empty outcomes inside the worker.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Concurrency limit must be at least 1, got {0}")]
    InvalidConcurrency(usize),

    #[error("Fetch task for page {index} failed: {message}")]
    Task { index: usize, message: String },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Card-Harvester operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use harvest::{
    AggregateResult, ExtractedRecord, FetchOutcome, FetchWorker, PageRequest, ResultAggregator,
    TaskScheduler,
};
pub use state::FetchState;
