use serde::Deserialize;
use std::time::Duration;

/// Default search the harvester targets when no base URL is configured
pub const DEFAULT_BASE_URL: &str = "https://www.google.com/search?tbm=lcl&q=spa+in+new+york&hl=en";

/// Main configuration structure for Card-Harvester
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub harvest: HarvestConfig,
    #[serde(default)]
    pub target: TargetConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Fetch orchestration configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    /// Number of result pages to request
    #[serde(rename = "num-pages")]
    pub num_pages: u32,

    /// Maximum number of pages fetched at once
    #[serde(rename = "concurrency-limit")]
    pub concurrency_limit: u32,

    /// Attempts per page before it degrades to an empty outcome
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// How long to wait for the first result card to appear (milliseconds)
    #[serde(rename = "validation-timeout-ms")]
    pub validation_timeout_ms: u64,

    /// Pause between a failed attempt and the next one (milliseconds)
    #[serde(rename = "backoff-delay-ms")]
    pub backoff_delay_ms: u64,

    /// Fixed delay used when the driver cannot confirm the page is idle (milliseconds)
    #[serde(rename = "settle-delay-ms")]
    pub settle_delay_ms: u64,

    /// Minimum number of result cards for a page to count as rendered
    #[serde(rename = "min-result-threshold")]
    pub min_result_threshold: u32,

    /// Result offset between consecutive pages
    #[serde(rename = "page-size")]
    pub page_size: u32,

    /// Run the browser without a visible window
    pub headless: bool,

    /// Optional hard deadline for a single attempt (milliseconds)
    #[serde(rename = "attempt-deadline-ms")]
    pub attempt_deadline_ms: Option<u64>,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            num_pages: 5,
            concurrency_limit: 2,
            max_retries: 3,
            validation_timeout_ms: 10_000,
            backoff_delay_ms: 3_000,
            settle_delay_ms: 2_000,
            min_result_threshold: 5,
            page_size: 20,
            headless: true,
            attempt_deadline_ms: None,
        }
    }
}

impl HarvestConfig {
    pub fn validation_timeout(&self) -> Duration {
        Duration::from_millis(self.validation_timeout_ms)
    }

    pub fn backoff_delay(&self) -> Duration {
        Duration::from_millis(self.backoff_delay_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn attempt_deadline(&self) -> Option<Duration> {
        self.attempt_deadline_ms.map(Duration::from_millis)
    }
}

/// Site-specific markup knowledge
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Search URL; each page appends its own `start` offset
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Selector matching one result card
    #[serde(rename = "result-selector")]
    pub result_selector: String,

    /// Selector, relative to a card, of the element carrying the identifier
    #[serde(rename = "identifier-selector")]
    pub identifier_selector: String,

    /// Attribute holding the identifier
    #[serde(rename = "identifier-attribute")]
    pub identifier_attribute: String,

    /// Selector, relative to a card, of the display name
    #[serde(rename = "name-selector")]
    pub name_selector: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            result_selector: ".VkpGBb".to_string(),
            identifier_selector: "a[data-cid]".to_string(),
            identifier_attribute: "data-cid".to_string(),
            name_selector: ".OSrXXb".to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Path to an optional markdown report file
    #[serde(rename = "report-path")]
    pub report_path: Option<String>,
}
