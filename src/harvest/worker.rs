//! Page fetch worker
//!
//! Drives one page request through the retry state machine:
//!
//! | Step | State | Failure handling |
//! |------|-------|------------------|
//! | Acquire a fresh session | SessionOpen | Retry |
//! | Load the URL | Navigating | Retry |
//! | Wait for the page to settle | Stabilizing | Fall back to a fixed delay |
//! | Wait for and count result cards | Validating | Retry on timeout or too few cards |
//! | Extract records | Validating | Retry on driver errors; skip cards without an identifier |
//!
//! Each attempt gets its own session, and the session is stopped before the
//! attempt's outcome is acted on. Once `max_retries` attempts have failed the
//! page degrades to an empty `FetchOutcome`.

use crate::config::Config;
use crate::driver::{BrowserDriver, BrowserSession, DriverResult, PageElement};
use crate::harvest::events::{EventSink, HarvestEvent};
use crate::harvest::record::{ExtractedRecord, FetchOutcome};
use crate::harvest::request::PageRequest;
use crate::harvest::scheduler::PageFetcher;
use crate::state::FetchState;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Per-page fetch settings derived from the configuration
#[derive(Debug, Clone)]
pub struct WorkerSettings {
    pub max_retries: u32,
    pub validation_timeout: Duration,
    pub backoff_delay: Duration,
    pub settle_delay: Duration,
    pub min_result_threshold: usize,
    pub headless: bool,
    pub attempt_deadline: Option<Duration>,
    pub result_selector: String,
    pub identifier_selector: String,
    pub identifier_attribute: String,
    pub name_selector: String,
}

impl WorkerSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_retries: config.harvest.max_retries,
            validation_timeout: config.harvest.validation_timeout(),
            backoff_delay: config.harvest.backoff_delay(),
            settle_delay: config.harvest.settle_delay(),
            min_result_threshold: config.harvest.min_result_threshold as usize,
            headless: config.harvest.headless,
            attempt_deadline: config.harvest.attempt_deadline(),
            result_selector: config.target.result_selector.clone(),
            identifier_selector: config.target.identifier_selector.clone(),
            identifier_attribute: config.target.identifier_attribute.clone(),
            name_selector: config.target.name_selector.clone(),
        }
    }
}

/// Why an attempt has to be retried
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryReason {
    SessionStart(String),
    Navigation(String),
    ValidationTimeout(String),
    LowResultCount { found: usize, required: usize },
    Extraction(String),
    AttemptDeadline(Duration),
}

impl fmt::Display for RetryReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SessionStart(e) => write!(f, "session start failed: {}", e),
            Self::Navigation(e) => write!(f, "navigation failed: {}", e),
            Self::ValidationTimeout(e) => write!(f, "result cards did not appear: {}", e),
            Self::LowResultCount { found, required } => {
                write!(f, "only found {} results (need {})", found, required)
            }
            Self::Extraction(e) => write!(f, "extraction failed: {}", e),
            Self::AttemptDeadline(d) => write!(f, "attempt exceeded deadline of {:?}", d),
        }
    }
}

/// Result of a single attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success(Vec<ExtractedRecord>),
    Retry(RetryReason),
}

/// Fetches pages through a browser driver with bounded retry
///
/// The worker keeps no per-page state between calls, so one instance can be
/// shared by every task in a batch.
pub struct FetchWorker {
    driver: Arc<dyn BrowserDriver>,
    settings: WorkerSettings,
    events: Arc<dyn EventSink>,
}

impl FetchWorker {
    pub fn new(
        driver: Arc<dyn BrowserDriver>,
        settings: WorkerSettings,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            driver,
            settings,
            events,
        }
    }

    /// Fetches one page, retrying until it succeeds or the budget runs out
    ///
    /// Never returns an error: a page that fails every attempt yields an
    /// empty `Failed` outcome.
    pub async fn fetch_page(&self, request: &PageRequest) -> FetchOutcome {
        let max_attempts = self.settings.max_retries;
        let mut state = FetchState::Idle;

        for attempt in 1..=max_attempts {
            advance(&mut state, FetchState::SessionOpen, request);
            self.events.emit(&HarvestEvent::AttemptStarted {
                index: request.index,
                url: request.url.clone(),
                attempt,
                max_attempts,
            });

            match self.run_attempt(request, &mut state).await {
                AttemptOutcome::Success(records) => {
                    advance(&mut state, FetchState::Succeeded, request);
                    self.events.emit(&HarvestEvent::PageSucceeded {
                        index: request.index,
                        url: request.url.clone(),
                        attempts: attempt,
                        records: records.len(),
                    });
                    return FetchOutcome::succeeded(request.index, records, attempt);
                }
                AttemptOutcome::Retry(reason) => {
                    advance(&mut state, FetchState::RetryPending, request);
                    self.events.emit(&HarvestEvent::AttemptFailed {
                        index: request.index,
                        url: request.url.clone(),
                        attempt,
                        reason: reason.to_string(),
                    });

                    if attempt < max_attempts {
                        tokio::time::sleep(self.settings.backoff_delay).await;
                    }
                }
            }
        }

        advance(&mut state, FetchState::Failed, request);
        self.events.emit(&HarvestEvent::PageFailed {
            index: request.index,
            url: request.url.clone(),
            attempts: max_attempts,
        });
        FetchOutcome::failed(request.index, max_attempts)
    }

    /// Runs one attempt on a freshly started session and always stops it
    async fn run_attempt(&self, request: &PageRequest, state: &mut FetchState) -> AttemptOutcome {
        let mut session = match self.driver.start(self.settings.headless).await {
            Ok(session) => session,
            Err(e) => return AttemptOutcome::Retry(RetryReason::SessionStart(e.to_string())),
        };

        let outcome = match self.settings.attempt_deadline {
            Some(deadline) => {
                match tokio::time::timeout(deadline, self.drive(session.as_mut(), request, state))
                    .await
                {
                    Ok(outcome) => outcome,
                    Err(_) => AttemptOutcome::Retry(RetryReason::AttemptDeadline(deadline)),
                }
            }
            None => self.drive(session.as_mut(), request, state).await,
        };

        if let Err(e) = session.stop().await {
            tracing::warn!("Failed to stop session for page {}: {}", request.index, e);
        }

        outcome
    }

    async fn drive(
        &self,
        session: &mut dyn BrowserSession,
        request: &PageRequest,
        state: &mut FetchState,
    ) -> AttemptOutcome {
        advance(state, FetchState::Navigating, request);
        let page = match session.navigate(&request.url).await {
            Ok(page) => page,
            Err(e) => return AttemptOutcome::Retry(RetryReason::Navigation(e.to_string())),
        };

        advance(state, FetchState::Stabilizing, request);
        if let Err(e) = page.wait_idle().await {
            tracing::debug!(
                "Page {} not confirmed idle ({}), settling for {:?}",
                request.index,
                e,
                self.settings.settle_delay
            );
            tokio::time::sleep(self.settings.settle_delay).await;
        }

        advance(state, FetchState::Validating, request);
        if let Err(e) = page
            .wait_for(&self.settings.result_selector, self.settings.validation_timeout)
            .await
        {
            return AttemptOutcome::Retry(RetryReason::ValidationTimeout(e.to_string()));
        }

        let cards = match page.query_all(&self.settings.result_selector).await {
            Ok(cards) => cards,
            Err(e) => return AttemptOutcome::Retry(RetryReason::Extraction(e.to_string())),
        };

        if cards.len() < self.settings.min_result_threshold {
            return AttemptOutcome::Retry(RetryReason::LowResultCount {
                found: cards.len(),
                required: self.settings.min_result_threshold,
            });
        }

        match self.extract_records(&cards).await {
            Ok(records) => AttemptOutcome::Success(records),
            Err(e) => AttemptOutcome::Retry(RetryReason::Extraction(e.to_string())),
        }
    }

    /// Extracts one record per card that carries a non-empty identifier
    ///
    /// A failed name lookup only costs the record its name.
    async fn extract_records(
        &self,
        cards: &[Box<dyn PageElement>],
    ) -> DriverResult<Vec<ExtractedRecord>> {
        let mut records = Vec::with_capacity(cards.len());

        for card in cards {
            let Some(link) = card.query(&self.settings.identifier_selector).await? else {
                continue;
            };

            let identifier = match link.attribute(&self.settings.identifier_attribute).await? {
                Some(id) if !id.is_empty() => id,
                _ => continue,
            };

            let name = match card.query(&self.settings.name_selector).await {
                Ok(Some(element)) => element.text().await.ok(),
                Ok(None) => None,
                Err(e) => {
                    tracing::trace!("Name lookup failed for {}: {}", identifier, e);
                    None
                }
            };

            records.push(ExtractedRecord::new(identifier, name));
        }

        Ok(records)
    }
}

#[async_trait]
impl PageFetcher for FetchWorker {
    async fn fetch(&self, request: &PageRequest) -> FetchOutcome {
        self.fetch_page(request).await
    }
}

fn advance(state: &mut FetchState, next: FetchState, request: &PageRequest) {
    debug_assert!(
        state.can_transition_to(next),
        "invalid fetch transition {} -> {}",
        state,
        next
    );
    tracing::trace!("Page {}: {} -> {}", request.index, state, next);
    *state = next;
}
