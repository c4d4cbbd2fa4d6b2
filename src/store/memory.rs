//! In-memory store
//!
//! Records live in a `Vec` in creation order; `positions` maps id → index in
//! that vec, and three `FieldIndex`es answer lookups without scanning.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::error::{CabinetError, Result};
use crate::record::{name_key, Record, RecordFields};
use crate::snapshot::Snapshot;
use crate::validation::{check_storable, RecordValidator};

use super::{check_delete, check_unique_ids, next_id, FieldIndex, RecordStore};

/// Indexed in-process record store
pub struct MemoryStore {
    validator: Box<dyn RecordValidator>,

    /// Live records in creation order
    records: Vec<Record>,

    /// id → position in `records`
    positions: HashMap<i32, usize>,

    first_names: FieldIndex<String>,
    last_names: FieldIndex<String>,
    dates_of_birth: FieldIndex<NaiveDate>,

    /// Highest id handed out so far
    last_id: i32,
}

impl MemoryStore {
    pub fn new(validator: Box<dyn RecordValidator>) -> Self {
        Self {
            validator,
            records: Vec::new(),
            positions: HashMap::new(),
            first_names: FieldIndex::new(),
            last_names: FieldIndex::new(),
            dates_of_birth: FieldIndex::new(),
            last_id: 0,
        }
    }

    /// Look up a single record by id
    pub fn get(&self, id: i32) -> Option<&Record> {
        self.positions.get(&id).map(|&pos| &self.records[pos])
    }

    /// Number of distinct first-name keys (for testing/debugging)
    pub fn first_name_buckets(&self) -> usize {
        self.first_names.bucket_count()
    }

    fn index_record(&mut self, record: &Record) {
        self.first_names.insert(name_key(&record.first_name), record.id);
        self.last_names.insert(name_key(&record.last_name), record.id);
        self.dates_of_birth.insert(record.date_of_birth, record.id);
    }

    fn unindex_record(&mut self, record: &Record) {
        self.first_names.remove(&name_key(&record.first_name), record.id);
        self.last_names.remove(&name_key(&record.last_name), record.id);
        self.dates_of_birth.remove(&record.date_of_birth, record.id);
    }

    /// Resolve a bucket of ids to records, in sequence order
    fn collect<K: std::hash::Hash + Eq>(&self, index: &FieldIndex<K>, key: &K) -> Vec<Record> {
        let Some(ids) = index.get(key) else {
            return Vec::new();
        };

        let mut positions: Vec<usize> = ids
            .iter()
            .filter_map(|id| self.positions.get(id).copied())
            .collect();
        positions.sort_unstable();
        positions.into_iter().map(|pos| self.records[pos].clone()).collect()
    }
}

impl RecordStore for MemoryStore {
    fn create(&mut self, fields: RecordFields) -> Result<i32> {
        self.validator.validate(&fields)?;
        check_storable(&fields)?;

        let id = next_id(self.last_id)?;
        let record = Record::new(id, fields);

        self.index_record(&record);
        self.positions.insert(id, self.records.len());
        self.records.push(record);
        self.last_id = id;

        tracing::debug!("Created record #{} in memory", id);
        Ok(id)
    }

    fn edit(&mut self, id: i32, fields: RecordFields) -> Result<()> {
        let pos = *self.positions.get(&id).ok_or(CabinetError::NotFound(id))?;
        self.validator.validate(&fields)?;
        check_storable(&fields)?;

        let record = &self.records[pos];
        self.first_names.reassign(
            &name_key(&record.first_name),
            name_key(&fields.first_name),
            id,
        );
        self.last_names.reassign(
            &name_key(&record.last_name),
            name_key(&fields.last_name),
            id,
        );
        self.dates_of_birth
            .reassign(&record.date_of_birth, fields.date_of_birth, id);

        self.records[pos].apply(fields);

        tracing::debug!("Edited record #{} in memory", id);
        Ok(())
    }

    fn delete(&mut self, id: i32) -> Result<()> {
        check_delete(id, self.records.len())?;
        let pos = *self.positions.get(&id).ok_or(CabinetError::NotFound(id))?;

        let record = self.records.remove(pos);
        self.unindex_record(&record);
        self.positions.remove(&id);
        for (offset, moved) in self.records[pos..].iter().enumerate() {
            self.positions.insert(moved.id, pos + offset);
        }

        tracing::debug!("Deleted record #{} from memory", id);
        Ok(())
    }

    fn purge(&mut self) -> Result<usize> {
        // Deletes are physical already
        Ok(0)
    }

    fn find_by_first_name(&mut self, name: &str) -> Result<Vec<Record>> {
        Ok(self.collect(&self.first_names, &name_key(name)))
    }

    fn find_by_last_name(&mut self, name: &str) -> Result<Vec<Record>> {
        Ok(self.collect(&self.last_names, &name_key(name)))
    }

    fn find_by_date_of_birth(&mut self, date: NaiveDate) -> Result<Vec<Record>> {
        Ok(self.collect(&self.dates_of_birth, &date))
    }

    fn all_records(&mut self) -> Result<Vec<Record>> {
        Ok(self.records.clone())
    }

    fn stat(&self) -> usize {
        self.records.len()
    }

    fn restore(&mut self, snapshot: &Snapshot) -> Result<()> {
        check_unique_ids(snapshot)?;

        self.records.clear();
        self.positions.clear();
        self.first_names.clear();
        self.last_names.clear();
        self.dates_of_birth.clear();

        for record in snapshot {
            self.index_record(record);
            self.positions.insert(record.id, self.records.len());
            self.records.push(record.clone());
        }
        self.last_id = self.last_id.max(snapshot.max_id());

        tracing::info!("Restored {} records into memory", self.records.len());
        Ok(())
    }
}
