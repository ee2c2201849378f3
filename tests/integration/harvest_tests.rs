//! Integration tests for the harvest pipeline
//!
//! These tests drive `run_harvest` end-to-end against an in-memory browser
//! driver that serves HTML fixtures and answers selector queries with
//! `scraper`.

use async_trait::async_trait;
use card_harvester::config::Config;
use card_harvester::driver::{
    BrowserDriver, BrowserSession, DriverError, DriverResult, PageElement, RenderedPage,
};
use card_harvester::harvest::{
    build_requests, run_harvest, EventSink, HarvestEvent, HarvestReport,
};
use card_harvester::FetchState;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

const BASE_URL: &str = "https://fixtures.test/search?q=spa";

/// Shared bookkeeping for every session the driver hands out
#[derive(Default)]
struct FixtureState {
    /// HTML served per URL, one entry per attempt; the last one repeats
    pages: HashMap<String, Vec<String>>,
    attempts: Mutex<HashMap<String, usize>>,
    render_delay: Duration,
    opened: AtomicUsize,
    closed: AtomicUsize,
    active: AtomicUsize,
    peak_active: AtomicUsize,
}

struct FixtureDriver {
    state: Arc<FixtureState>,
}

impl FixtureDriver {
    fn new(pages: HashMap<String, Vec<String>>, render_delay: Duration) -> Self {
        Self {
            state: Arc::new(FixtureState {
                pages,
                render_delay,
                ..Default::default()
            }),
        }
    }
}

#[async_trait]
impl BrowserDriver for FixtureDriver {
    async fn start(&self, _headless: bool) -> DriverResult<Box<dyn BrowserSession>> {
        self.state.opened.fetch_add(1, Ordering::SeqCst);
        let active = self.state.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.peak_active.fetch_max(active, Ordering::SeqCst);

        Ok(Box::new(FixtureSession {
            state: Arc::clone(&self.state),
            stopped: false,
        }))
    }
}

struct FixtureSession {
    state: Arc<FixtureState>,
    stopped: bool,
}

#[async_trait]
impl BrowserSession for FixtureSession {
    async fn navigate(&mut self, url: &str) -> DriverResult<Box<dyn RenderedPage>> {
        let bodies = self
            .state
            .pages
            .get(url)
            .ok_or_else(|| DriverError::Navigation(format!("{}: net::ERR_NAME_NOT_RESOLVED", url)))?;

        let attempt = {
            let mut attempts = self.state.attempts.lock().unwrap();
            let counter = attempts.entry(url.to_string()).or_insert(0);
            *counter += 1;
            *counter
        };
        let html = bodies[(attempt - 1).min(bodies.len() - 1)].clone();

        tokio::time::sleep(self.state.render_delay).await;

        Ok(Box::new(FixturePage { html }))
    }

    async fn stop(&mut self) -> DriverResult<()> {
        if !self.stopped {
            self.stopped = true;
            self.state.closed.fetch_add(1, Ordering::SeqCst);
            self.state.active.fetch_sub(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

struct FixturePage {
    html: String,
}

fn select_all(html: &str, selector: &str) -> DriverResult<Vec<String>> {
    let selector = Selector::parse(selector)
        .map_err(|e| DriverError::Query(format!("{}: {:?}", selector, e)))?;
    let document = Html::parse_document(html);
    Ok(document.select(&selector).map(|el| el.html()).collect())
}

#[async_trait]
impl RenderedPage for FixturePage {
    async fn wait_idle(&self) -> DriverResult<()> {
        Ok(())
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> DriverResult<()> {
        if select_all(&self.html, selector)?.is_empty() {
            tokio::time::sleep(timeout).await;
            return Err(DriverError::Timeout(selector.to_string()));
        }
        Ok(())
    }

    async fn query_all(&self, selector: &str) -> DriverResult<Vec<Box<dyn PageElement>>> {
        Ok(select_all(&self.html, selector)?
            .into_iter()
            .map(|html| Box::new(FixtureElement { html }) as Box<dyn PageElement>)
            .collect())
    }
}

/// An element kept as its outer HTML and re-parsed on every query
struct FixtureElement {
    html: String,
}

impl FixtureElement {
    fn with_root<T>(&self, f: impl FnOnce(ElementRef<'_>) -> T) -> Option<T> {
        let fragment = Html::parse_fragment(&self.html);
        let root = fragment.root_element().children().find_map(ElementRef::wrap)?;
        Some(f(root))
    }
}

#[async_trait]
impl PageElement for FixtureElement {
    async fn query(&self, selector: &str) -> DriverResult<Option<Box<dyn PageElement>>> {
        let parsed = Selector::parse(selector)
            .map_err(|e| DriverError::Query(format!("{}: {:?}", selector, e)))?;
        let found = self
            .with_root(|root| root.select(&parsed).next().map(|el| el.html()))
            .flatten();
        Ok(found.map(|html| Box::new(FixtureElement { html }) as Box<dyn PageElement>))
    }

    async fn attribute(&self, name: &str) -> DriverResult<Option<String>> {
        Ok(self
            .with_root(|root| root.value().attr(name).map(str::to_string))
            .flatten())
    }

    async fn text(&self) -> DriverResult<String> {
        Ok(self
            .with_root(|root| root.text().collect::<String>())
            .unwrap_or_default())
    }
}

#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<HarvestEvent>>,
}

impl EventSink for RecordingSink {
    fn emit(&self, event: &HarvestEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Renders a results page with one card per `(identifier, name)` pair
fn results_page(cards: &[(Option<&str>, Option<&str>)]) -> String {
    let mut body = String::from("<html><body><div id=\"results\">");
    for (identifier, name) in cards {
        body.push_str("<div class=\"VkpGBb\">");
        if let Some(name) = name {
            body.push_str(&format!("<span class=\"OSrXXb\">{}</span>", name));
        }
        match identifier {
            Some(id) => body.push_str(&format!("<a data-cid=\"{}\" href=\"#\">Website</a>", id)),
            None => body.push_str("<a href=\"#\">Directions</a>"),
        }
        body.push_str("</div>");
    }
    body.push_str("</div></body></html>");
    body
}

fn named_cards(prefix: &str, n: usize) -> String {
    let ids: Vec<String> = (0..n).map(|i| format!("{}{}", prefix, i)).collect();
    let names: Vec<String> = (0..n).map(|i| format!("{} Spa {}", prefix, i)).collect();
    let cards: Vec<_> = ids
        .iter()
        .zip(&names)
        .map(|(id, name)| (Some(id.as_str()), Some(name.as_str())))
        .collect();
    results_page(&cards)
}

fn test_config(num_pages: u32) -> Config {
    let mut config = Config::default();
    config.target.base_url = BASE_URL.to_string();
    config.harvest.num_pages = num_pages;
    config.harvest.concurrency_limit = 2;
    config.harvest.max_retries = 3;
    config.harvest.validation_timeout_ms = 100;
    config.harvest.backoff_delay_ms = 10;
    config.harvest.settle_delay_ms = 1;
    config
}

fn page_urls(config: &Config) -> Vec<String> {
    build_requests(config)
        .unwrap()
        .into_iter()
        .map(|r| r.url)
        .collect()
}

async fn run(
    config: &Config,
    pages: HashMap<String, Vec<String>>,
    render_delay: Duration,
) -> (HarvestReport, Arc<FixtureState>, Arc<RecordingSink>) {
    let driver = FixtureDriver::new(pages, render_delay);
    let state = Arc::clone(&driver.state);
    let sink = Arc::new(RecordingSink::default());

    let report = run_harvest(config, Arc::new(driver), sink.clone())
        .await
        .expect("harvest should complete");

    (report, state, sink)
}

fn identifiers(report: &HarvestReport) -> Vec<String> {
    report
        .result
        .iter()
        .map(|r| r.identifier.clone())
        .collect()
}

#[tokio::test]
async fn test_two_pages_of_distinct_cards() {
    let config = test_config(2);
    let urls = page_urls(&config);
    let pages = HashMap::from([
        (urls[0].clone(), vec![named_cards("a", 6)]),
        (urls[1].clone(), vec![named_cards("b", 6)]),
    ]);

    let (report, state, _) = run(&config, pages, Duration::ZERO).await;

    assert_eq!(report.result.unique_count(), 12);
    let ids = identifiers(&report);
    assert_eq!(&ids[..2], ["a0", "a1"]);
    assert_eq!(&ids[6..8], ["b0", "b1"]);
    assert_eq!(report.result.records()[0].name, "a Spa 0");
    assert_eq!(state.opened.load(Ordering::SeqCst), 2);
    assert_eq!(state.closed.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_overlapping_pages_keep_first_name() {
    let mut config = test_config(2);
    config.harvest.min_result_threshold = 2;
    let urls = page_urls(&config);
    let pages = HashMap::from([
        (
            urls[0].clone(),
            vec![results_page(&[
                (Some("x1"), Some("Serenity")),
                (Some("x2"), Some("Page A Name")),
            ])],
        ),
        (
            urls[1].clone(),
            vec![results_page(&[
                (Some("x2"), Some("Page B Name")),
                (Some("x3"), Some("Oasis")),
            ])],
        ),
    ]);

    let (report, _, _) = run(&config, pages, Duration::ZERO).await;

    assert_eq!(identifiers(&report), vec!["x1", "x2", "x3"]);
    assert_eq!(report.result.records()[1].name, "Page A Name");
    assert_eq!(report.stats.duplicates_dropped, 1);
}

#[tokio::test]
async fn test_thin_page_fails_after_max_retries() {
    let config = test_config(2);
    let urls = page_urls(&config);
    let pages = HashMap::from([
        (urls[0].clone(), vec![named_cards("ok", 5)]),
        (urls[1].clone(), vec![named_cards("thin", 3)]),
    ]);

    let (report, state, sink) = run(&config, pages, Duration::ZERO).await;

    assert_eq!(report.outcomes[1].state, FetchState::Failed);
    assert_eq!(report.outcomes[1].attempts, 3);
    assert!(report.outcomes[1].records.is_empty());
    assert_eq!(report.result.unique_count(), 5);

    // One session for the good page, three for the thin one
    assert_eq!(state.opened.load(Ordering::SeqCst), 4);
    assert_eq!(state.closed.load(Ordering::SeqCst), 4);
    assert_eq!(state.active.load(Ordering::SeqCst), 0);

    let events = sink.events.lock().unwrap();
    let failed_pages: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, HarvestEvent::PageFailed { .. }))
        .collect();
    assert_eq!(failed_pages.len(), 1);
}

#[tokio::test]
async fn test_page_recovers_on_later_attempt() {
    let config = test_config(1);
    let urls = page_urls(&config);
    let pages = HashMap::from([(
        urls[0].clone(),
        vec![
            "<html><body>Loading...</body></html>".to_string(),
            named_cards("late", 3),
            named_cards("late", 6),
        ],
    )]);

    let (report, state, _) = run(&config, pages, Duration::ZERO).await;

    assert_eq!(report.outcomes[0].state, FetchState::Succeeded);
    assert_eq!(report.outcomes[0].attempts, 3);
    assert_eq!(report.result.unique_count(), 6);
    assert_eq!(state.opened.load(Ordering::SeqCst), 3);
    assert_eq!(state.closed.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_card_defaults_and_skips() {
    let config = test_config(1);
    let urls = page_urls(&config);
    let pages = HashMap::from([(
        urls[0].clone(),
        vec![results_page(&[
            (Some("c1"), Some("Lotus")),
            (Some("c2"), None),
            (None, Some("Sponsored")),
            (Some("c3"), Some("Haven")),
            (Some("c4"), Some("Retreat")),
        ])],
    )]);

    let (report, _, _) = run(&config, pages, Duration::ZERO).await;

    assert_eq!(identifiers(&report), vec!["c1", "c2", "c3", "c4"]);
    assert_eq!(report.result.records()[1].name, "Unknown");
}

#[tokio::test]
async fn test_unreachable_page_does_not_abort_batch() {
    let config = test_config(3);
    let urls = page_urls(&config);
    let pages = HashMap::from([
        (urls[0].clone(), vec![named_cards("p0-", 5)]),
        (urls[2].clone(), vec![named_cards("p2-", 5)]),
    ]);

    let (report, state, _) = run(&config, pages, Duration::ZERO).await;

    assert_eq!(report.stats.pages_succeeded, 2);
    assert_eq!(report.stats.pages_failed, 1);
    assert_eq!(report.result.unique_count(), 10);
    assert_eq!(
        state.opened.load(Ordering::SeqCst),
        state.closed.load(Ordering::SeqCst)
    );
}

#[tokio::test]
async fn test_concurrency_gate_bounds_sessions() {
    let config = test_config(5);
    let pages: HashMap<_, _> = page_urls(&config)
        .into_iter()
        .enumerate()
        .map(|(i, url)| (url, vec![named_cards(&format!("p{}-", i), 5)]))
        .collect();
    let per_page = Duration::from_millis(100);

    let start = Instant::now();
    let (report, state, _) = run(&config, pages, per_page).await;
    let elapsed = start.elapsed();

    assert_eq!(report.result.unique_count(), 25);
    assert_eq!(state.peak_active.load(Ordering::SeqCst), 2);
    // ceil(5 / 2) rounds of rendering
    assert!(elapsed >= per_page * 3, "finished too fast: {:?}", elapsed);
}
