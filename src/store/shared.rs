//! Shared store handle
//!
//! Stores hold unsynchronized mutable state. `SharedStore` puts one store
//! behind a single exclusive lock so clones can be handed to several threads;
//! every call holds the lock for its whole duration.

use std::sync::Arc;

use chrono::NaiveDate;
use parking_lot::Mutex;

use crate::error::Result;
use crate::record::{Record, RecordFields};
use crate::snapshot::Snapshot;

use super::RecordStore;

/// Cloneable, lock-serialized handle to one store
#[derive(Clone)]
pub struct SharedStore {
    inner: Arc<Mutex<Box<dyn RecordStore>>>,
}

impl SharedStore {
    pub fn new(store: Box<dyn RecordStore>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Run several calls under one lock acquisition
    pub fn with<R>(&self, f: impl FnOnce(&mut dyn RecordStore) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut **guard)
    }
}

impl RecordStore for SharedStore {
    fn create(&mut self, fields: RecordFields) -> Result<i32> {
        self.inner.lock().create(fields)
    }

    fn edit(&mut self, id: i32, fields: RecordFields) -> Result<()> {
        self.inner.lock().edit(id, fields)
    }

    fn delete(&mut self, id: i32) -> Result<()> {
        self.inner.lock().delete(id)
    }

    fn purge(&mut self) -> Result<usize> {
        self.inner.lock().purge()
    }

    fn find_by_first_name(&mut self, name: &str) -> Result<Vec<Record>> {
        self.inner.lock().find_by_first_name(name)
    }

    fn find_by_last_name(&mut self, name: &str) -> Result<Vec<Record>> {
        self.inner.lock().find_by_last_name(name)
    }

    fn find_by_date_of_birth(&mut self, date: NaiveDate) -> Result<Vec<Record>> {
        self.inner.lock().find_by_date_of_birth(date)
    }

    fn all_records(&mut self) -> Result<Vec<Record>> {
        self.inner.lock().all_records()
    }

    fn stat(&self) -> usize {
        self.inner.lock().stat()
    }

    fn snapshot(&mut self) -> Result<Snapshot> {
        self.inner.lock().snapshot()
    }

    fn restore(&mut self, snapshot: &Snapshot) -> Result<()> {
        self.inner.lock().restore(snapshot)
    }
}
