//! Harvest coordinator - batch orchestration
//!
//! Ties the pieces together for one run:
//! - Validating the configuration and building the page requests
//! - Dispatching them through the scheduler to a shared fetch worker
//! - Merging the outcomes and computing run statistics

use crate::config::{validate, Config};
use crate::driver::{BrowserDriver, ChromiumDriver};
use crate::harvest::aggregator::{AggregateResult, ResultAggregator};
use crate::harvest::events::{EventSink, TracingEventSink};
use crate::harvest::record::FetchOutcome;
use crate::harvest::request::build_requests;
use crate::harvest::scheduler::TaskScheduler;
use crate::harvest::worker::{FetchWorker, WorkerSettings};
use crate::output::HarvestStats;
use crate::HarvestError;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct HarvestReport {
    /// Deduplicated records
    pub result: AggregateResult,

    /// Per-page outcomes in submission order
    pub outcomes: Vec<FetchOutcome>,

    pub stats: HarvestStats,

    pub elapsed: Duration,
}

/// Runs a complete harvest with the given driver and event sink
///
/// Pages that exhaust their retries contribute nothing; only failures outside
/// the per-page retry loop (invalid configuration, a crashed task) abort the
/// batch.
///
/// # Example
///
/// ```no_run
/// use card_harvester::config::Config;
/// use card_harvester::driver::ChromiumDriver;
/// use card_harvester::harvest::{run_harvest, TracingEventSink};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Config::default();
/// let report = run_harvest(&config, Arc::new(ChromiumDriver::new()), Arc::new(TracingEventSink)).await?;
/// println!("{} unique identifiers", report.result.unique_count());
/// # Ok(())
/// # }
/// ```
pub async fn run_harvest(
    config: &Config,
    driver: Arc<dyn BrowserDriver>,
    events: Arc<dyn EventSink>,
) -> Result<HarvestReport, HarvestError> {
    validate(config)?;

    let requests = build_requests(config)?;
    tracing::info!(
        "Prepared {} page requests (concurrency limit {}, max retries {})",
        requests.len(),
        config.harvest.concurrency_limit,
        config.harvest.max_retries
    );
    for request in &requests {
        tracing::debug!("Page {}: {}", request.index, request.url);
    }

    let scheduler = TaskScheduler::new(config.harvest.concurrency_limit as usize)?;
    let worker = Arc::new(FetchWorker::new(
        driver,
        WorkerSettings::from_config(config),
        events,
    ));

    let start = Instant::now();
    let outcomes = scheduler.run(requests, worker).await?;
    let elapsed = start.elapsed();

    let result = ResultAggregator::merge(&outcomes);
    let stats = HarvestStats::from_run(&outcomes, &result);

    tracing::info!(
        "Harvest finished in {:?}: {}/{} pages succeeded, {} unique identifiers ({} duplicates dropped)",
        elapsed,
        stats.pages_succeeded,
        stats.pages_requested,
        stats.unique_records,
        stats.duplicates_dropped
    );

    Ok(HarvestReport {
        result,
        outcomes,
        stats,
        elapsed,
    })
}

/// Runs a harvest with headless Chromium and tracing-based event reporting
pub async fn harvest(config: &Config) -> Result<HarvestReport, HarvestError> {
    run_harvest(
        config,
        Arc::new(ChromiumDriver::new()),
        Arc::new(TracingEventSink),
    )
    .await
}
