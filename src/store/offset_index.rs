//! ID → offset index for the file backend
//!
//! Rebuilt by one forward scan when the file is opened or rewritten, and
//! patched in place by create (insert) and delete (remove). Edits never move
//! a slot. Offsets are never derived from ids.

use std::collections::HashMap;

/// Byte offset of every live slot, keyed by record id
#[derive(Debug, Default)]
pub struct OffsetIndex {
    offsets: HashMap<i32, u64>,
}

impl OffsetIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            offsets: HashMap::with_capacity(capacity),
        }
    }

    /// Record where `id` lives; returns the previous offset if `id` was present
    pub fn insert(&mut self, id: i32, offset: u64) -> Option<u64> {
        self.offsets.insert(id, offset)
    }

    pub fn remove(&mut self, id: i32) -> Option<u64> {
        self.offsets.remove(&id)
    }

    pub fn get(&self, id: i32) -> Option<u64> {
        self.offsets.get(&id).copied()
    }

    /// Number of live slots
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}
