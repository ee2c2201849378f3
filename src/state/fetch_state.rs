/// Fetch state definitions for a single page request
///
/// This module defines the states a page fetch moves through while a worker
/// owns it, and which transitions between them are legal.
use std::fmt;

/// Represents the current state of a page fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchState {
    // ===== Active States =====
    /// Worker has not started the request yet
    Idle,

    /// A fresh rendering session is being acquired
    SessionOpen,

    /// The session is loading the request URL
    Navigating,

    /// Waiting for the rendered page to settle
    Stabilizing,

    /// Waiting for and counting result cards
    Validating,

    /// The last attempt failed and the worker is backing off
    RetryPending,

    // ===== Terminal States =====
    /// Records were extracted from the page
    Succeeded,

    /// Every attempt failed; the page contributes no records
    Failed,
}

impl FetchState {
    /// Returns true if no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    /// Returns true while a session is open and the page is being worked on
    pub fn is_fetching(&self) -> bool {
        matches!(
            self,
            Self::SessionOpen | Self::Navigating | Self::Stabilizing | Self::Validating
        )
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }

    /// Returns true if moving from `self` to `next` is a legal transition
    ///
    /// Any fetching state may fall back to `RetryPending`; only `Validating`
    /// can succeed, and only `RetryPending` can give up.
    pub fn can_transition_to(&self, next: FetchState) -> bool {
        use FetchState::*;

        match (self, next) {
            (Idle, SessionOpen) => true,
            (SessionOpen, Navigating) => true,
            (Navigating, Stabilizing) => true,
            (Stabilizing, Validating) => true,
            (Validating, Succeeded) => true,
            (from, RetryPending) if from.is_fetching() => true,
            (RetryPending, SessionOpen) => true,
            (RetryPending, Failed) => true,
            _ => false,
        }
    }

    /// Short lowercase label used in logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::SessionOpen => "session_open",
            Self::Navigating => "navigating",
            Self::Stabilizing => "stabilizing",
            Self::Validating => "validating",
            Self::RetryPending => "retry_pending",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for FetchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
