//! Store Module
//!
//! The record store contract and its two interchangeable backends.
//!
//! ## Backends
//! - `MemoryStore`: ordered record list plus first name / last name /
//!   date of birth indexes; lookups are O(1) bucket reads
//! - `FileStore`: fixed-size slots in one flat file, tombstones on delete,
//!   compaction on purge; lookups are full forward scans
//!
//! ## Concurrency
//! Every operation takes `&mut self` and runs to completion. Callers sharing a
//! store across threads go through `SharedStore` (one exclusive lock).

mod field_index;
mod file;
mod mark;
mod memory;
mod offset_index;
mod shared;

pub use field_index::FieldIndex;
pub use file::FileStore;
pub use memory::MemoryStore;
pub use offset_index::OffsetIndex;
pub use shared::SharedStore;

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::config::{Config, StorageKind};
use crate::error::{CabinetError, Result};
use crate::instrument::{LoggingStore, MeteredStore};
use crate::record::{Record, RecordFields};
use crate::snapshot::Snapshot;
use crate::validation::validator_for;

/// The store contract shared by every backend and decorator
pub trait RecordStore: Send {
    /// Validate fields, assign the next id and store the record
    fn create(&mut self, fields: RecordFields) -> Result<i32>;

    /// Overwrite every field of an existing record
    fn edit(&mut self, id: i32, fields: RecordFields) -> Result<()>;

    /// Remove a record from all query results
    fn delete(&mut self, id: i32) -> Result<()>;

    /// Reclaim space held by deleted records; returns the reclaimed slot count
    fn purge(&mut self) -> Result<usize>;

    /// Case-insensitive first name lookup, in record order
    fn find_by_first_name(&mut self, name: &str) -> Result<Vec<Record>>;

    /// Case-insensitive last name lookup, in record order
    fn find_by_last_name(&mut self, name: &str) -> Result<Vec<Record>>;

    /// Exact date of birth lookup, in record order
    fn find_by_date_of_birth(&mut self, date: NaiveDate) -> Result<Vec<Record>>;

    /// Every live record in creation order
    fn all_records(&mut self) -> Result<Vec<Record>>;

    /// Number of live records
    fn stat(&self) -> usize;

    fn snapshot(&mut self) -> Result<Snapshot> {
        Ok(Snapshot::new(self.all_records()?))
    }

    /// Replace all state with the snapshot's records, keeping their ids
    fn restore(&mut self, snapshot: &Snapshot) -> Result<()>;
}

impl<S: RecordStore + ?Sized> RecordStore for Box<S> {
    fn create(&mut self, fields: RecordFields) -> Result<i32> {
        (**self).create(fields)
    }

    fn edit(&mut self, id: i32, fields: RecordFields) -> Result<()> {
        (**self).edit(id, fields)
    }

    fn delete(&mut self, id: i32) -> Result<()> {
        (**self).delete(id)
    }

    fn purge(&mut self) -> Result<usize> {
        (**self).purge()
    }

    fn find_by_first_name(&mut self, name: &str) -> Result<Vec<Record>> {
        (**self).find_by_first_name(name)
    }

    fn find_by_last_name(&mut self, name: &str) -> Result<Vec<Record>> {
        (**self).find_by_last_name(name)
    }

    fn find_by_date_of_birth(&mut self, date: NaiveDate) -> Result<Vec<Record>> {
        (**self).find_by_date_of_birth(date)
    }

    fn all_records(&mut self) -> Result<Vec<Record>> {
        (**self).all_records()
    }

    fn stat(&self) -> usize {
        (**self).stat()
    }

    fn snapshot(&mut self) -> Result<Snapshot> {
        (**self).snapshot()
    }

    fn restore(&mut self, snapshot: &Snapshot) -> Result<()> {
        (**self).restore(snapshot)
    }
}

/// Open the configured backend with its validator and decorators
///
/// The stopwatch wraps the backend, the logger wraps everything.
pub fn open_store(config: &Config) -> Result<Box<dyn RecordStore>> {
    let validator = validator_for(config.validation_rules);

    let mut store: Box<dyn RecordStore> = match config.storage {
        StorageKind::Memory => Box::new(MemoryStore::new(validator)),
        StorageKind::File => Box::new(FileStore::open(
            &config.data_file,
            validator,
            config.sync_on_write,
        )?),
    };
    tracing::info!(
        "Opened {} store with {} validation rules",
        config.storage,
        config.validation_rules
    );

    if config.use_stopwatch {
        store = Box::new(MeteredStore::new(store));
    }
    if config.use_logger {
        store = Box::new(LoggingStore::new(store));
    }

    Ok(store)
}

// =============================================================================
// Shared Preconditions
// =============================================================================

/// Delete preconditions common to both backends, checked in this order:
/// non-positive id, empty store; the caller then resolves the id itself.
pub(crate) fn check_delete(id: i32, live: usize) -> Result<()> {
    if id < 1 {
        return Err(CabinetError::Validation(format!(
            "record id must be greater than zero, got {}",
            id
        )));
    }
    if live == 0 {
        return Err(CabinetError::InvalidOperation(
            "there are no records to delete".to_string(),
        ));
    }
    Ok(())
}

/// Restore input must not carry the same id twice
pub(crate) fn check_unique_ids(snapshot: &Snapshot) -> Result<()> {
    let mut seen = HashSet::with_capacity(snapshot.len());
    for record in snapshot {
        if !seen.insert(record.id) {
            return Err(CabinetError::InvalidOperation(format!(
                "snapshot contains record #{} more than once",
                record.id
            )));
        }
    }
    Ok(())
}

/// Next id after `last_id`
pub(crate) fn next_id(last_id: i32) -> Result<i32> {
    last_id
        .checked_add(1)
        .ok_or_else(|| CabinetError::InvalidOperation("record id space exhausted".to_string()))
}
