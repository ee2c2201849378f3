use thiserror::Error;

pub type DriverResult<T> = std::result::Result<T, DriverError>;

/// Failures reported by a browser automation driver
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("browser launch failed: {0}")]
    Launch(String),

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("browser shutdown failed: {0}")]
    Shutdown(String),

    #[error("session already stopped")]
    Closed,
}
