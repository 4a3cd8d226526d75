//! The storage-strategy seam: `Backend`.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::error::StoreError;

/// The full id -> value mapping held by a store's cache.
///
/// A `BTreeMap` keeps single-file aggregates and enumeration deterministic.
pub type Records = std::collections::BTreeMap<String, Value>;

/// How a value is durably stored, loaded, and removed, and how the full id
/// set is obtained.
///
/// Backends are stateless with respect to record data: the cache owns the
/// in-memory truth and passes a staged view into each call. Multi-file
/// storage touches one file per record, single-file storage rewrites the
/// whole aggregate from `records`, and memory storage does nothing beyond
/// what the cache already reflects.
///
/// # Object Safety
///
/// This trait is object-safe: you can use `Box<dyn Backend>`.
pub trait Backend: Send + Sync {
    /// Durably record the value staged under `id`.
    ///
    /// `records` is the cache with the new value already staged, so
    /// `records[id] == value` on entry.
    fn persist(&self, id: &str, value: &Value, records: &Records) -> Result<(), StoreError>;

    /// Load the value stored under `id`.
    ///
    /// # Returns
    ///
    /// * `Err(StoreError::NotFound)` - no record is stored under `id`.
    /// * `Err(StoreError::Serialization)` - a record exists but cannot be
    ///   decoded.
    /// * `Err(StoreError::Persistence)` - the record could not be read.
    fn load(&self, id: &str) -> Result<Value, StoreError>;

    /// Remove the record stored under `id`.
    ///
    /// `records` is the cache with `id` already evicted.
    fn remove(&self, id: &str, records: &Records) -> Result<(), StoreError>;

    /// Every id currently stored.
    fn enumerate(&self, records: &Records) -> Result<BTreeSet<String>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    /// Minimal backend keeping its own copy of persisted state, to exercise
    /// the contract from behind a `dyn Backend`.
    struct ScratchBackend {
        durable: Mutex<Records>,
    }

    impl Backend for ScratchBackend {
        fn persist(&self, id: &str, value: &Value, _records: &Records) -> Result<(), StoreError> {
            self.durable
                .lock()
                .unwrap()
                .insert(id.to_string(), value.clone());
            Ok(())
        }

        fn load(&self, id: &str) -> Result<Value, StoreError> {
            self.durable
                .lock()
                .unwrap()
                .get(id)
                .cloned()
                .ok_or_else(|| StoreError::NotFound { id: id.to_string() })
        }

        fn remove(&self, id: &str, _records: &Records) -> Result<(), StoreError> {
            match self.durable.lock().unwrap().remove(id) {
                Some(_) => Ok(()),
                None => Err(StoreError::NotFound { id: id.to_string() }),
            }
        }

        fn enumerate(&self, _records: &Records) -> Result<BTreeSet<String>, StoreError> {
            Ok(self.durable.lock().unwrap().keys().cloned().collect())
        }
    }

    #[test]
    fn contract_works_through_dyn() {
        let backend = ScratchBackend {
            durable: Mutex::new(Records::new()),
        };
        let backend: &dyn Backend = &backend;
        let records = Records::new();

        backend.persist("a", &json!({"x": 1}), &records).unwrap();
        assert_eq!(backend.load("a").unwrap(), json!({"x": 1}));
        assert_eq!(backend.enumerate(&records).unwrap().len(), 1);

        backend.remove("a", &records).unwrap();
        assert!(backend.load("a").unwrap_err().is_not_found());
        assert!(backend.remove("a", &records).unwrap_err().is_not_found());
    }
}
