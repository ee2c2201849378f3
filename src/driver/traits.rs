//! Browser automation contract
//!
//! The harvester only talks to a browser through these traits. A driver hands
//! out sessions; a session renders pages; a page answers selector queries.

use crate::driver::DriverResult;
use async_trait::async_trait;
use std::time::Duration;

/// Launches rendering sessions
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Starts a new session that the caller owns exclusively
    async fn start(&self, headless: bool) -> DriverResult<Box<dyn BrowserSession>>;
}

/// A single rendering session
///
/// `stop` must release every resource the session holds and must be safe to
/// call more than once.
#[async_trait]
pub trait BrowserSession: Send {
    /// Loads `url` and returns the rendered page
    async fn navigate(&mut self, url: &str) -> DriverResult<Box<dyn RenderedPage>>;

    async fn stop(&mut self) -> DriverResult<()>;
}

/// A page loaded by a session
#[async_trait]
pub trait RenderedPage: Send + Sync {
    /// Best-effort wait for rendering to settle; may fail or be unsupported
    async fn wait_idle(&self) -> DriverResult<()>;

    /// Waits until at least one element matches `selector`
    ///
    /// Fails with `DriverError::Timeout` if nothing matches within `timeout`.
    async fn wait_for(&self, selector: &str, timeout: Duration) -> DriverResult<()>;

    async fn query_all(&self, selector: &str) -> DriverResult<Vec<Box<dyn PageElement>>>;
}

/// An element on a rendered page
#[async_trait]
pub trait PageElement: Send + Sync {
    /// First descendant matching `selector`, if any
    async fn query(&self, selector: &str) -> DriverResult<Option<Box<dyn PageElement>>>;

    async fn attribute(&self, name: &str) -> DriverResult<Option<String>>;

    async fn text(&self) -> DriverResult<String>;
}
