//! Structured events emitted by the fetch worker
//!
//! The worker reports progress through an `EventSink` instead of logging
//! directly, so callers decide how attempts and page results are presented.

/// Something that happened while fetching a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HarvestEvent {
    AttemptStarted {
        index: usize,
        url: String,
        attempt: u32,
        max_attempts: u32,
    },
    AttemptFailed {
        index: usize,
        url: String,
        attempt: u32,
        reason: String,
    },
    PageSucceeded {
        index: usize,
        url: String,
        attempts: u32,
        records: usize,
    },
    PageFailed {
        index: usize,
        url: String,
        attempts: u32,
    },
}

/// Receives events from fetch workers
///
/// Implementations are shared across concurrently running workers.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &HarvestEvent);
}

/// Forwards events to `tracing` at a severity matching the event
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: &HarvestEvent) {
        match event {
            HarvestEvent::AttemptStarted {
                index,
                url,
                attempt,
                max_attempts,
            } => {
                tracing::debug!(
                    "Page {}: attempt {}/{} for {}",
                    index,
                    attempt,
                    max_attempts,
                    url
                );
            }
            HarvestEvent::AttemptFailed {
                index,
                url,
                attempt,
                reason,
            } => {
                tracing::warn!(
                    "Attempt {} failed for page {} ({}): {}",
                    attempt,
                    index,
                    url,
                    reason
                );
            }
            HarvestEvent::PageSucceeded {
                index,
                url,
                attempts,
                records,
            } => {
                tracing::info!(
                    "Successfully scraped {} identifiers from page {} ({}) after {} attempt(s)",
                    records,
                    index,
                    url,
                    attempts
                );
            }
            HarvestEvent::PageFailed {
                index,
                url,
                attempts,
            } => {
                tracing::error!(
                    "Giving up on page {} ({}) after {} attempts",
                    index,
                    url,
                    attempts
                );
            }
        }
    }
}
