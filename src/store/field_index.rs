//! Secondary index: normalized field value → record ids

use std::collections::{BTreeSet, HashMap};
use std::hash::Hash;

/// Maps a key to the set of record ids currently holding it
///
/// Empty buckets are removed, never left behind.
#[derive(Debug)]
pub struct FieldIndex<K> {
    buckets: HashMap<K, BTreeSet<i32>>,
}

impl<K: Hash + Eq> FieldIndex<K> {
    pub fn new() -> Self {
        Self {
            buckets: HashMap::new(),
        }
    }

    pub fn insert(&mut self, key: K, id: i32) {
        self.buckets.entry(key).or_default().insert(id);
    }

    /// Remove `id` from the bucket for `key`, dropping the bucket if it empties
    pub fn remove(&mut self, key: &K, id: i32) {
        if let Some(bucket) = self.buckets.get_mut(key) {
            bucket.remove(&id);
            if bucket.is_empty() {
                self.buckets.remove(key);
            }
        }
    }

    /// Move `id` from one key to another; no-op if the keys are equal
    pub fn reassign(&mut self, old: &K, new: K, id: i32) {
        if *old != new {
            self.remove(old, id);
            self.insert(new, id);
        }
    }

    pub fn get(&self, key: &K) -> Option<&BTreeSet<i32>> {
        self.buckets.get(key)
    }

    /// Number of distinct keys
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
    }
}

impl<K: Hash + Eq> Default for FieldIndex<K> {
    fn default() -> Self {
        Self::new()
    }
}
