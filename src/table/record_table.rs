//! RecordTable implementation
//!
//! Vec-backed compact table with a key index.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::error::{NvsError, Result};
use crate::record::{Key, Record, Value, ValueKind};

use super::{PushRejection, DEFAULT_CAPACITY};

/// Fixed-capacity, compact, ordered collection of records
#[derive(Debug, Clone)]
pub struct RecordTable {
    /// Occupied slots, in insertion order
    slots: Vec<Record>,
    /// key → slot index, tombstones included
    index: HashMap<Key, usize>,
    /// Maximum number of slots
    capacity: usize,
}

impl RecordTable {
    /// Create an empty table with `capacity` slots
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
            capacity,
        }
    }

    /// Slot holding `key`, whether or not it is tombstoned
    pub fn find(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    /// Record at `slot`
    pub fn get(&self, slot: usize) -> Option<&Record> {
        self.slots.get(slot)
    }

    /// Write `value` under `key`, creating the record on first use.
    ///
    /// Returns the slot written. Fails with:
    /// - `KeyDeleted` if the key is tombstoned
    /// - `TypeMismatch` if the key holds a different kind
    /// - `TableFull` if the key is new and every slot is taken
    pub fn insert_or_update(&mut self, key: Key, value: Value) -> Result<usize> {
        match self.find(key.as_str()) {
            Some(slot) => {
                let record = &mut self.slots[slot];

                if record.is_deleted() {
                    warn!(key = %key, "cannot update a deleted key");
                    return Err(NvsError::KeyDeleted(key.to_string()));
                }
                if record.kind() != value.kind() {
                    warn!(key = %key, stored = %record.kind(), requested = %value.kind(), "value kind mismatch");
                    return Err(NvsError::TypeMismatch {
                        key: key.to_string(),
                        expected: value.kind(),
                        found: record.kind(),
                    });
                }

                record.overwrite_value(value);
                Ok(slot)
            }
            None => {
                if self.is_full() {
                    warn!(key = %key, capacity = self.capacity, "no free slot for new key");
                    return Err(NvsError::TableFull {
                        capacity: self.capacity,
                    });
                }

                let slot = self.slots.len();
                debug!(key = %key, value = %value, slot, "new record");

                let mut record = Record::new(key.clone(), value);
                record.mark_dirty();
                self.slots.push(record);
                self.index.insert(key, slot);
                Ok(slot)
            }
        }
    }

    /// Mark `key` deleted. The slot is kept until the next reload.
    pub fn tombstone(&mut self, key: &str) -> Result<()> {
        let slot = self
            .find(key)
            .ok_or_else(|| NvsError::KeyNotFound(key.to_string()))?;

        self.slots[slot].mark_deleted();
        debug!(key, slot, "record tombstoned");
        Ok(())
    }

    /// Copy out the value of `key`, which must hold `expected` kind
    pub fn read(&self, key: &str, expected: ValueKind) -> Result<Value> {
        let slot = self
            .find(key)
            .ok_or_else(|| NvsError::KeyNotFound(key.to_string()))?;
        let record = &self.slots[slot];

        if record.kind() != expected {
            return Err(NvsError::TypeMismatch {
                key: key.to_string(),
                expected,
                found: record.kind(),
            });
        }
        if record.is_deleted() {
            return Err(NvsError::KeyDeleted(key.to_string()));
        }

        Ok(record.value().clone())
    }

    /// Append a record read from disk.
    ///
    /// Refuses duplicates and overflow instead of failing, so a load can
    /// continue past them.
    pub fn push_loaded(&mut self, record: Record) -> std::result::Result<usize, PushRejection> {
        if self.index.contains_key(record.key()) {
            return Err(PushRejection::Duplicate);
        }
        if self.is_full() {
            return Err(PushRejection::Full);
        }

        let slot = self.slots.len();
        self.index.insert(record.key().clone(), slot);
        self.slots.push(record);
        Ok(slot)
    }

    /// Drop every record
    pub fn clear(&mut self) {
        self.slots.clear();
        self.index.clear();
    }

    /// Occupied slots, tombstones included
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Records not tombstoned
    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|r| !r.is_deleted()).count()
    }

    pub fn tombstone_count(&self) -> usize {
        self.len() - self.live_count()
    }

    /// Records in slot order
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.slots.iter()
    }

    /// Mutable records in slot order (checksum refresh on commit)
    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, Record> {
        self.slots.iter_mut()
    }
}

impl Default for RecordTable {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl<'a> IntoIterator for &'a RecordTable {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
