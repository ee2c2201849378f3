//! Run statistics
//!
//! This module derives summary numbers from a finished batch and prints them.

use crate::harvest::{AggregateResult, FetchOutcome};

/// Harvest statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestStats {
    /// Number of pages in the batch
    pub pages_requested: usize,

    /// Pages that produced records (or passed validation with none)
    pub pages_succeeded: usize,

    /// Pages that exhausted their retries
    pub pages_failed: usize,

    /// Attempts across all pages
    pub total_attempts: u64,

    /// Records extracted before deduplication
    pub records_seen: usize,

    pub unique_records: usize,

    pub duplicates_dropped: usize,
}

impl HarvestStats {
    pub fn from_run(outcomes: &[FetchOutcome], result: &AggregateResult) -> Self {
        let pages_succeeded = outcomes.iter().filter(|o| o.state.is_success()).count();

        Self {
            pages_requested: outcomes.len(),
            pages_succeeded,
            pages_failed: outcomes.len() - pages_succeeded,
            total_attempts: outcomes.iter().map(|o| o.attempts as u64).sum(),
            records_seen: result.total_seen(),
            unique_records: result.unique_count(),
            duplicates_dropped: result.duplicates_dropped(),
        }
    }

    /// Percentage of pages that succeeded
    pub fn success_rate(&self) -> f64 {
        if self.pages_requested == 0 {
            return 0.0;
        }
        (self.pages_succeeded as f64 / self.pages_requested as f64) * 100.0
    }
}

/// Prints statistics to stdout
pub fn print_statistics(stats: &HarvestStats) {
    println!("=== Harvest Statistics ===\n");

    println!("Pages requested: {}", stats.pages_requested);
    println!("Pages succeeded: {}", stats.pages_succeeded);
    println!("Pages failed: {}", stats.pages_failed);
    println!("Total attempts: {}", stats.total_attempts);
    println!();

    println!("Records seen: {}", stats.records_seen);
    println!("Unique records: {}", stats.unique_records);
    println!("Duplicates dropped: {}", stats.duplicates_dropped);
    println!();

    println!(
        "Success Rate: {:.1}% ({} / {} pages)",
        stats.success_rate(),
        stats.pages_succeeded,
        stats.pages_requested
    );
}
