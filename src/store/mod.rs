//! In-memory fallback store
//!
//! A per-resource ordered collection that stands in for the backend while
//! it is unreachable. Volatile by contract: seeded at wiring time, mutated
//! only through its owning gateway, gone on restart.

use crate::models::{RecordId, Resource};

/// Ordered in-memory collection of records for one resource type.
///
/// The front of the collection is the most recently inserted record, which
/// matters for tie-breaking when several records share an ordering key.
pub struct MockFallbackStore<R: Resource> {
    records: Vec<R>,
}

impl<R: Resource> MockFallbackStore<R> {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Create a store pre-populated with fixture records.
    pub fn seeded(records: Vec<R>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Insert a record at the front of the collection.
    pub fn insert_front(&mut self, record: R) {
        self.records.insert(0, record);
    }

    pub fn find_by_id(&self, id: &RecordId) -> Option<&R> {
        self.records.iter().find(|r| r.id() == id)
    }

    /// Replace the record with the given id. Returns false when no record
    /// with that id exists (nothing is inserted in that case).
    pub fn replace(&mut self, id: &RecordId, record: R) -> bool {
        match self.records.iter_mut().find(|r| r.id() == id) {
            Some(slot) => {
                *slot = record;
                true
            }
            None => false,
        }
    }

    /// Remove the record with the given id, reporting whether anything was
    /// actually removed. Callers rely on this to distinguish "deleted"
    /// from "not found".
    pub fn remove_by_id(&mut self, id: &RecordId) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id() != id);
        self.records.len() != before
    }

    /// Current contents sorted newest-first by ordering key; ties keep
    /// insertion order (stable sort, front of the store first).
    pub fn snapshot(&self) -> Vec<R> {
        let mut records = self.records.clone();
        records.sort_by(|a, b| b.ordering_key().cmp(&a.ordering_key()));
        records
    }
}

impl<R: Resource> Default for MockFallbackStore<R> {
    fn default() -> Self {
        Self::new()
    }
}
