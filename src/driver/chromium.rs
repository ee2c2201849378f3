use crate::driver::{
    BrowserDriver, BrowserSession, DriverError, DriverResult, PageElement, RenderedPage,
};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::Page;
use futures_util::stream::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(5);
const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Chromium-backed driver
///
/// Every session launches its own browser process, so sessions never share
/// tabs, cookies or CDP connections.
#[derive(Debug, Clone)]
pub struct ChromiumDriver {
    idle_timeout: Duration,
}

impl ChromiumDriver {
    pub fn new() -> Self {
        Self {
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }
}

impl Default for ChromiumDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BrowserDriver for ChromiumDriver {
    async fn start(&self, headless: bool) -> DriverResult<Box<dyn BrowserSession>> {
        let mut builder = BrowserConfig::builder().no_sandbox();
        if !headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(DriverError::Launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| DriverError::Launch(e.to_string()))?;

        // The CDP handler must be polled for the browser to make progress
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::trace!("CDP handler event error: {}", e);
                }
            }
        });

        tracing::debug!("Launched browser session (headless: {})", headless);

        Ok(Box::new(ChromiumSession {
            browser: Some(browser),
            handler_task: Some(handler_task),
            idle_timeout: self.idle_timeout,
        }))
    }
}

/// One browser process plus its CDP handler task
pub struct ChromiumSession {
    browser: Option<Browser>,
    handler_task: Option<JoinHandle<()>>,
    idle_timeout: Duration,
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn navigate(&mut self, url: &str) -> DriverResult<Box<dyn RenderedPage>> {
        let browser = self.browser.as_ref().ok_or(DriverError::Closed)?;

        let page = browser
            .new_page(url)
            .await
            .map_err(|e| DriverError::Navigation(format!("{}: {}", url, e)))?;

        Ok(Box::new(ChromiumPage {
            page,
            idle_timeout: self.idle_timeout,
        }))
    }

    async fn stop(&mut self) -> DriverResult<()> {
        let result = match self.browser.take() {
            Some(mut browser) => {
                let closed = browser
                    .close()
                    .await
                    .map(|_| ())
                    .map_err(|e| DriverError::Shutdown(e.to_string()));
                if let Err(e) = browser.wait().await {
                    tracing::debug!("Browser process did not exit cleanly: {}", e);
                }
                closed
            }
            None => Ok(()),
        };

        if let Some(task) = self.handler_task.take() {
            task.abort();
        }

        result
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        if let Some(task) = self.handler_task.take() {
            task.abort();
        }
        if self.browser.is_some() {
            tracing::warn!("Browser session dropped without stop()");
        }
    }
}

/// A tab opened by a `ChromiumSession`
pub struct ChromiumPage {
    page: Page,
    idle_timeout: Duration,
}

#[async_trait]
impl RenderedPage for ChromiumPage {
    async fn wait_idle(&self) -> DriverResult<()> {
        match tokio::time::timeout(self.idle_timeout, self.page.wait_for_navigation()).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(DriverError::Navigation(e.to_string())),
            Err(_) => Err(DriverError::Timeout(format!(
                "page not idle after {:?}",
                self.idle_timeout
            ))),
        }
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> DriverResult<()> {
        let deadline = Instant::now() + timeout;

        loop {
            match self.page.find_elements(selector).await {
                Ok(elements) if !elements.is_empty() => return Ok(()),
                Ok(_) => {}
                Err(e) => tracing::trace!("Selector {} not ready: {}", selector, e),
            }

            if Instant::now() >= deadline {
                return Err(DriverError::Timeout(format!(
                    "no element matched '{}' within {:?}",
                    selector, timeout
                )));
            }

            tokio::time::sleep(SELECTOR_POLL_INTERVAL).await;
        }
    }

    async fn query_all(&self, selector: &str) -> DriverResult<Vec<Box<dyn PageElement>>> {
        let elements = self
            .page
            .find_elements(selector)
            .await
            .map_err(|e| DriverError::Query(format!("{}: {}", selector, e)))?;

        Ok(elements
            .into_iter()
            .map(|element| Box::new(ChromiumElement { element }) as Box<dyn PageElement>)
            .collect())
    }
}

/// A DOM element resolved through CDP
pub struct ChromiumElement {
    element: Element,
}

#[async_trait]
impl PageElement for ChromiumElement {
    async fn query(&self, selector: &str) -> DriverResult<Option<Box<dyn PageElement>>> {
        let matches = self
            .element
            .find_elements(selector)
            .await
            .map_err(|e| DriverError::Query(format!("{}: {}", selector, e)))?;

        Ok(matches
            .into_iter()
            .next()
            .map(|element| Box::new(ChromiumElement { element }) as Box<dyn PageElement>))
    }

    async fn attribute(&self, name: &str) -> DriverResult<Option<String>> {
        self.element
            .attribute(name)
            .await
            .map_err(|e| DriverError::Query(format!("attribute {}: {}", name, e)))
    }

    async fn text(&self) -> DriverResult<String> {
        self.element
            .inner_text()
            .await
            .map(|text| text.unwrap_or_default())
            .map_err(|e| DriverError::Query(format!("inner text: {}", e)))
    }
}
