//! Call logging decorator

use std::fmt::Debug;

use chrono::NaiveDate;

use crate::error::Result;
use crate::record::{Record, RecordFields};
use crate::snapshot::Snapshot;
use crate::store::RecordStore;

/// Tracing target for audit lines
pub const AUDIT_TARGET: &str = "filecabinet::audit";

/// Logs each store call through `tracing`, then forwards it
pub struct LoggingStore<S> {
    inner: S,
}

impl<S: RecordStore> LoggingStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

fn describe(fields: &RecordFields) -> String {
    format!(
        "FirstName = '{}', LastName = '{}', DateOfBirth = '{}', WorkingHoursPerWeek = '{}', AnnualIncome = '{}', DriverLicenseCategory = '{}'",
        fields.first_name,
        fields.last_name,
        fields.date_of_birth,
        fields.working_hours_per_week,
        fields.annual_income,
        fields.driver_license_category
    )
}

fn log_outcome<T: Debug>(op: &str, result: &Result<T>) {
    match result {
        Ok(value) => tracing::info!(target: AUDIT_TARGET, "{}() returned {:?}", op, value),
        Err(e) => tracing::warn!(target: AUDIT_TARGET, "{}() failed: {}", op, e),
    }
}

fn log_records(op: &str, result: &Result<Vec<Record>>) {
    match result {
        Ok(records) => tracing::info!(target: AUDIT_TARGET, "{}() returned {} records", op, records.len()),
        Err(e) => tracing::warn!(target: AUDIT_TARGET, "{}() failed: {}", op, e),
    }
}

impl<S: RecordStore> RecordStore for LoggingStore<S> {
    fn create(&mut self, fields: RecordFields) -> Result<i32> {
        tracing::info!(target: AUDIT_TARGET, "Calling create() with {}", describe(&fields));
        let result = self.inner.create(fields);
        log_outcome("create", &result);
        result
    }

    fn edit(&mut self, id: i32, fields: RecordFields) -> Result<()> {
        tracing::info!(target: AUDIT_TARGET, "Calling edit() for #{} with {}", id, describe(&fields));
        let result = self.inner.edit(id, fields);
        log_outcome("edit", &result);
        result
    }

    fn delete(&mut self, id: i32) -> Result<()> {
        tracing::info!(target: AUDIT_TARGET, "Calling delete() for #{}", id);
        let result = self.inner.delete(id);
        log_outcome("delete", &result);
        result
    }

    fn purge(&mut self) -> Result<usize> {
        tracing::info!(target: AUDIT_TARGET, "Calling purge()");
        let result = self.inner.purge();
        log_outcome("purge", &result);
        result
    }

    fn find_by_first_name(&mut self, name: &str) -> Result<Vec<Record>> {
        tracing::info!(target: AUDIT_TARGET, "Calling find_by_first_name() with '{}'", name);
        let result = self.inner.find_by_first_name(name);
        log_records("find_by_first_name", &result);
        result
    }

    fn find_by_last_name(&mut self, name: &str) -> Result<Vec<Record>> {
        tracing::info!(target: AUDIT_TARGET, "Calling find_by_last_name() with '{}'", name);
        let result = self.inner.find_by_last_name(name);
        log_records("find_by_last_name", &result);
        result
    }

    fn find_by_date_of_birth(&mut self, date: NaiveDate) -> Result<Vec<Record>> {
        tracing::info!(target: AUDIT_TARGET, "Calling find_by_date_of_birth() with '{}'", date);
        let result = self.inner.find_by_date_of_birth(date);
        log_records("find_by_date_of_birth", &result);
        result
    }

    fn all_records(&mut self) -> Result<Vec<Record>> {
        tracing::info!(target: AUDIT_TARGET, "Calling all_records()");
        let result = self.inner.all_records();
        log_records("all_records", &result);
        result
    }

    fn stat(&self) -> usize {
        let count = self.inner.stat();
        tracing::info!(target: AUDIT_TARGET, "stat() returned {}", count);
        count
    }

    fn snapshot(&mut self) -> Result<Snapshot> {
        tracing::info!(target: AUDIT_TARGET, "Calling snapshot()");
        let result = self.inner.snapshot();
        match &result {
            Ok(snapshot) => tracing::info!(target: AUDIT_TARGET, "snapshot() captured {} records", snapshot.len()),
            Err(e) => tracing::warn!(target: AUDIT_TARGET, "snapshot() failed: {}", e),
        }
        result
    }

    fn restore(&mut self, snapshot: &Snapshot) -> Result<()> {
        tracing::info!(target: AUDIT_TARGET, "Calling restore() with {} records", snapshot.len());
        let result = self.inner.restore(snapshot);
        log_outcome("restore", &result);
        result
    }
}
