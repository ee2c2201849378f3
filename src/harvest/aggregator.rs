use crate::harvest::record::{ExtractedRecord, FetchOutcome};
use std::collections::HashSet;

/// Deduplicated records from a whole batch
///
/// No two records share an identifier, and each record sits where its
/// identifier was first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateResult {
    records: Vec<ExtractedRecord>,

    /// Records seen before deduplication
    total_seen: usize,
}

impl AggregateResult {
    pub fn records(&self) -> &[ExtractedRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ExtractedRecord> {
        self.records.iter()
    }

    pub fn unique_count(&self) -> usize {
        self.records.len()
    }

    pub fn total_seen(&self) -> usize {
        self.total_seen
    }

    pub fn duplicates_dropped(&self) -> usize {
        self.total_seen - self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a AggregateResult {
    type Item = &'a ExtractedRecord;
    type IntoIter = std::slice::Iter<'a, ExtractedRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Merges per-page outcomes into one deduplicated list
pub struct ResultAggregator;

impl ResultAggregator {
    /// Flattens `outcomes` in order, keeping the first record per identifier
    ///
    /// Later duplicates are dropped along with their names. The merge is
    /// deterministic: the same input always yields the same result.
    pub fn merge(outcomes: &[FetchOutcome]) -> AggregateResult {
        Self::merge_records(outcomes.iter().flat_map(|outcome| outcome.records.iter()))
    }

    /// Deduplicates an already flattened record stream
    pub fn merge_records<'a, I>(records: I) -> AggregateResult
    where
        I: IntoIterator<Item = &'a ExtractedRecord>,
    {
        let mut seen = HashSet::new();
        let mut unique = Vec::new();
        let mut total_seen = 0;

        for record in records {
            total_seen += 1;
            if seen.insert(record.identifier.as_str()) {
                unique.push(record.clone());
            }
        }

        AggregateResult {
            records: unique,
            total_seen,
        }
    }
}
