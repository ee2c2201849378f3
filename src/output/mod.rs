//! Output module for presenting harvest results
//!
//! This module handles:
//! - Printing the deduplicated records and unique count
//! - Generating markdown reports of a run
//! - Computing run statistics

mod markdown;
mod report;
pub mod stats;

pub use markdown::{format_markdown_report, generate_markdown_report};
pub use report::{format_report, print_report};
pub use stats::{print_statistics, HarvestStats};

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
