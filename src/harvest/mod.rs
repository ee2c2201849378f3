//! Harvest module for fetch orchestration
//!
//! This module contains the core harvesting logic, including:
//! - Page request construction
//! - The per-page retry state machine (`FetchWorker`)
//! - Concurrency-bounded dispatch (`TaskScheduler`)
//! - Deduplicating aggregation (`ResultAggregator`)
//! - Overall run coordination

mod aggregator;
mod coordinator;
mod events;
mod record;
mod request;
mod scheduler;
mod worker;

pub use aggregator::{AggregateResult, ResultAggregator};
pub use coordinator::{harvest, run_harvest, HarvestReport};
pub use events::{EventSink, HarvestEvent, TracingEventSink};
pub use record::{ExtractedRecord, FetchOutcome, UNKNOWN_NAME};
pub use request::{build_requests, PageRequest};
pub use scheduler::{PageFetcher, TaskScheduler};
pub use worker::{AttemptOutcome, FetchWorker, RetryReason, WorkerSettings};
