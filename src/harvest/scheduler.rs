//! Task scheduler for a batch of page requests
//!
//! This module handles:
//! - Dispatching every request exactly once as its own task
//! - Global concurrency limiting via a semaphore
//! - Gathering outcomes back into submission order

use crate::harvest::record::FetchOutcome;
use crate::harvest::request::PageRequest;
use crate::HarvestError;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Fetches a single page
///
/// Implementations contain their own failures; the returned outcome is the
/// final word on the page.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, request: &PageRequest) -> FetchOutcome;
}

/// Runs page fetches with at most `concurrency_limit` in flight
///
/// The semaphore is the only state shared between tasks.
#[derive(Debug, Clone)]
pub struct TaskScheduler {
    /// Global semaphore for limiting concurrent fetches
    gate: Arc<Semaphore>,

    concurrency_limit: usize,
}

impl TaskScheduler {
    /// Creates a new scheduler
    ///
    /// # Returns
    ///
    /// * `Ok(TaskScheduler)` - Scheduler with `concurrency_limit` permits
    /// * `Err(HarvestError::InvalidConcurrency)` - The limit was zero
    pub fn new(concurrency_limit: usize) -> Result<Self, HarvestError> {
        if concurrency_limit == 0 {
            return Err(HarvestError::InvalidConcurrency(concurrency_limit));
        }

        Ok(Self {
            gate: Arc::new(Semaphore::new(concurrency_limit)),
            concurrency_limit,
        })
    }

    pub fn concurrency_limit(&self) -> usize {
        self.concurrency_limit
    }

    /// Returns the number of fetch slots currently free
    pub fn available_permits(&self) -> usize {
        self.gate.available_permits()
    }

    /// Fetches every request and returns the outcomes in submission order
    ///
    /// All tasks are spawned up front and wait on the gate, so a slow page
    /// never blocks eligible ones. The call returns once every task has
    /// finished. A task that panics does not cancel its siblings; the first
    /// such failure is returned after the rest have been joined.
    pub async fn run(
        &self,
        requests: Vec<PageRequest>,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Result<Vec<FetchOutcome>, HarvestError> {
        let mut handles = Vec::with_capacity(requests.len());

        for request in requests {
            let gate = Arc::clone(&self.gate);
            let fetcher = Arc::clone(&fetcher);
            let index = request.index;

            let handle = tokio::spawn(async move {
                let _permit = gate
                    .acquire_owned()
                    .await
                    .map_err(|e| HarvestError::Task {
                        index,
                        message: e.to_string(),
                    })?;
                Ok::<_, HarvestError>(fetcher.fetch(&request).await)
            });
            handles.push((index, handle));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        let mut first_error = None;

        for (index, handle) in handles {
            match handle.await {
                Ok(Ok(outcome)) => outcomes.push(outcome),
                Ok(Err(e)) => {
                    tracing::error!("Page {} was never dispatched: {}", index, e);
                    first_error.get_or_insert(e);
                }
                Err(join_error) => {
                    tracing::error!("Fetch task for page {} failed: {}", index, join_error);
                    first_error.get_or_insert(HarvestError::Task {
                        index,
                        message: join_error.to_string(),
                    });
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(outcomes),
        }
    }
}
