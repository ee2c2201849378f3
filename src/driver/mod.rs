//! Browser automation driver
//!
//! This module defines the contract the fetch worker relies on and ships a
//! Chromium implementation of it:
//! - `BrowserDriver` / `BrowserSession` / `RenderedPage` / `PageElement` traits
//! - `ChromiumDriver`, one headless Chromium process per session

mod chromium;
mod error;
mod traits;

pub use chromium::{ChromiumDriver, ChromiumElement, ChromiumPage, ChromiumSession};
pub use error::{DriverError, DriverResult};
pub use traits::{BrowserDriver, BrowserSession, PageElement, RenderedPage};
