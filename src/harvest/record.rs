use crate::state::FetchState;

/// Display name used when a card has no name element
pub const UNKNOWN_NAME: &str = "Unknown";

/// A `{name, identifier}` pair extracted from one result card
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExtractedRecord {
    pub name: String,
    pub identifier: String,
}

impl ExtractedRecord {
    /// Builds a record, falling back to `UNKNOWN_NAME` when no name was found
    pub fn new(identifier: impl Into<String>, name: Option<String>) -> Self {
        Self {
            name: name.unwrap_or_else(|| UNKNOWN_NAME.to_string()),
            identifier: identifier.into(),
        }
    }
}

/// The result of fetching one page
///
/// An empty `records` list on a `Failed` outcome is the soft failure a page
/// degrades to once its retry budget is spent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    /// Index of the request this outcome belongs to
    pub index: usize,

    pub records: Vec<ExtractedRecord>,

    /// Number of attempts the worker made
    pub attempts: u32,

    /// Terminal state of the fetch (`Succeeded` or `Failed`)
    pub state: FetchState,
}

impl FetchOutcome {
    pub fn succeeded(index: usize, records: Vec<ExtractedRecord>, attempts: u32) -> Self {
        Self {
            index,
            records,
            attempts,
            state: FetchState::Succeeded,
        }
    }

    pub fn failed(index: usize, attempts: u32) -> Self {
        Self {
            index,
            records: Vec::new(),
            attempts,
            state: FetchState::Failed,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
