use crate::config::Config;
use crate::ConfigError;
use url::Url;

/// Query parameter carrying the result offset of a page
const OFFSET_PARAM: &str = "start";

/// A single results page to fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Fully built page URL
    pub url: String,

    /// Position of this page in the batch
    pub index: usize,
}

impl PageRequest {
    pub fn new(url: impl Into<String>, index: usize) -> Self {
        Self {
            url: url.into(),
            index,
        }
    }
}

/// Builds the batch of page requests described by the configuration
///
/// Page `i` is the base URL with `start = i * page_size` appended.
pub fn build_requests(config: &Config) -> Result<Vec<PageRequest>, ConfigError> {
    let base = Url::parse(&config.target.base_url).map_err(|e| {
        ConfigError::InvalidUrl(format!(
            "Invalid base_url '{}': {}",
            config.target.base_url, e
        ))
    })?;

    let page_size = config.harvest.page_size as u64;

    Ok((0..config.harvest.num_pages as usize)
        .map(|index| {
            let mut url = base.clone();
            url.query_pairs_mut()
                .append_pair(OFFSET_PARAM, &(index as u64 * page_size).to_string());
            PageRequest::new(url.to_string(), index)
        })
        .collect())
}
