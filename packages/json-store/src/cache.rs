//! The in-memory record cache.
//!
//! The cache is the authoritative id -> value mapping: between operations it
//! always equals the durable state of the active backend. Values never leave
//! it by reference - reads clone, so no caller can mutate cached state from
//! the outside.

use serde_json::Value;

use shelf_core::Records;

#[derive(Debug, Default)]
pub(crate) struct Cache {
    records: Records,
}

impl Cache {
    pub fn new() -> Self {
        Cache::default()
    }

    /// A cache pre-populated from an existing aggregate.
    pub fn from_records(records: Records) -> Self {
        Cache { records }
    }

    /// Clone the value under `id` out of the cache.
    pub fn read(&self, id: &str) -> Option<Value> {
        self.records.get(id).cloned()
    }

    /// Overwrite the entry under `id`, returning whatever it displaced so a
    /// failed persistence can roll back.
    pub fn stage(&mut self, id: &str, value: Value) -> Option<Value> {
        self.records.insert(id.to_string(), value)
    }

    /// Undo a `stage` or `evict`: restore the displaced entry, or absence.
    pub fn rollback(&mut self, id: &str, previous: Option<Value>) {
        match previous {
            Some(value) => {
                self.records.insert(id.to_string(), value);
            }
            None => {
                self.records.remove(id);
            }
        }
    }

    /// Remove the entry under `id`, returning it for potential rollback.
    pub fn evict(&mut self, id: &str) -> Option<Value> {
        self.records.remove(id)
    }

    /// The full mapping, as handed to backends.
    pub fn records(&self) -> &Records {
        &self.records
    }
}
