//! Snapshot Module
//!
//! An immutable, backend-agnostic ordered sequence of records.
//!
//! ## Responsibilities
//! - Carry the full record set out of one store and into another
//! - Persist to / load from a checksummed binary snapshot file
//!
//! Textual encodings (CSV, XML) are produced and consumed elsewhere from
//! `records()` / `Snapshot::new`.

mod file;

pub use file::{HEADER_SIZE, MAGIC, MAX_PAYLOAD_SIZE, VERSION};

use crate::record::Record;

/// Ordered, immutable set of records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    records: Vec<Record>,
}

impl Snapshot {
    /// Wrap records in their existing order
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Largest id carried, 0 when empty
    pub fn max_id(&self) -> i32 {
        self.records.iter().map(|r| r.id).max().unwrap_or(0)
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
