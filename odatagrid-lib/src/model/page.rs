//! One page of query results.

use super::Record;

/// A page of records plus the total count reported by the service.
///
/// `total_count` drives pagination. When the service omits it, callers use
/// [`PageResult::effective_total`], which falls back to the number of records
/// on the page (single-page behaviour).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageResult {
    records: Vec<Record>,
    /// Total record count (requested with `$count=true`).
    total_count: Option<u64>,
}

impl PageResult {
    /// Creates a new page without a reported total.
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
            total_count: None,
        }
    }

    /// Sets the total record count.
    pub fn with_total_count(mut self, count: u64) -> Self {
        self.total_count = Some(count);
        self
    }

    /// Returns a reference to the records in this page.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Consumes the page and returns the records.
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// Returns the total count reported by the service, if any.
    pub fn total_count(&self) -> Option<u64> {
        self.total_count
    }

    /// Returns the reported total, or the page length when it was omitted.
    pub fn effective_total(&self) -> u64 {
        self.total_count.unwrap_or(self.records.len() as u64)
    }

    /// Returns `true` if this page has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the number of records in this page.
    pub fn len(&self) -> usize {
        self.records.len()
    }
}
