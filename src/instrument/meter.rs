//! Call timing decorator

use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use parking_lot::Mutex;

use crate::error::Result;
use crate::record::{Record, RecordFields};
use crate::snapshot::Snapshot;
use crate::store::RecordStore;

/// Tracing target for timing lines
pub const METER_TARGET: &str = "filecabinet::meter";

/// Times each store call, keeping the last duration per operation
pub struct MeteredStore<S> {
    inner: S,
    // Mutex so `stat(&self)` can record too
    timings: Mutex<HashMap<&'static str, Duration>>,
}

impl<S: RecordStore> MeteredStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            timings: Mutex::new(HashMap::new()),
        }
    }

    /// Duration of the most recent call to `op` (e.g. "create")
    pub fn last_elapsed(&self, op: &str) -> Option<Duration> {
        self.timings.lock().get(op).copied()
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    fn record(&self, op: &'static str, start: Instant) {
        let elapsed = start.elapsed();
        tracing::info!(
            target: METER_TARGET,
            "{} method execution duration is {} µs",
            op,
            elapsed.as_micros()
        );
        self.timings.lock().insert(op, elapsed);
    }
}

impl<S: RecordStore> RecordStore for MeteredStore<S> {
    fn create(&mut self, fields: RecordFields) -> Result<i32> {
        let start = Instant::now();
        let result = self.inner.create(fields);
        self.record("create", start);
        result
    }

    fn edit(&mut self, id: i32, fields: RecordFields) -> Result<()> {
        let start = Instant::now();
        let result = self.inner.edit(id, fields);
        self.record("edit", start);
        result
    }

    fn delete(&mut self, id: i32) -> Result<()> {
        let start = Instant::now();
        let result = self.inner.delete(id);
        self.record("delete", start);
        result
    }

    fn purge(&mut self) -> Result<usize> {
        let start = Instant::now();
        let result = self.inner.purge();
        self.record("purge", start);
        result
    }

    fn find_by_first_name(&mut self, name: &str) -> Result<Vec<Record>> {
        let start = Instant::now();
        let result = self.inner.find_by_first_name(name);
        self.record("find_by_first_name", start);
        result
    }

    fn find_by_last_name(&mut self, name: &str) -> Result<Vec<Record>> {
        let start = Instant::now();
        let result = self.inner.find_by_last_name(name);
        self.record("find_by_last_name", start);
        result
    }

    fn find_by_date_of_birth(&mut self, date: NaiveDate) -> Result<Vec<Record>> {
        let start = Instant::now();
        let result = self.inner.find_by_date_of_birth(date);
        self.record("find_by_date_of_birth", start);
        result
    }

    fn all_records(&mut self) -> Result<Vec<Record>> {
        let start = Instant::now();
        let result = self.inner.all_records();
        self.record("all_records", start);
        result
    }

    fn stat(&self) -> usize {
        let start = Instant::now();
        let count = self.inner.stat();
        self.record("stat", start);
        count
    }

    fn snapshot(&mut self) -> Result<Snapshot> {
        let start = Instant::now();
        let result = self.inner.snapshot();
        self.record("snapshot", start);
        result
    }

    fn restore(&mut self, snapshot: &Snapshot) -> Result<()> {
        let start = Instant::now();
        let result = self.inner.restore(snapshot);
        self.record("restore", start);
        result
    }
}
