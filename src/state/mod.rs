//! State module for tracking fetch progress
//!
//! # Components
//!
//! - `FetchState`: Tracks the state of a single page fetch (session open, navigating, validating, etc.)

mod fetch_state;

// Re-export main types
pub use fetch_state::FetchState;
