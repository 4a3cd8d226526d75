//! Pure in-memory storage: the cache is the only state.

use std::collections::BTreeSet;

use serde_json::Value;

use shelf_core::{Backend, Records, StoreError};

/// Storage strategy with no durable side. `persist` and `remove` succeed
/// trivially - the cache already reflects the change - and `load` always
/// misses, because the facade consults the cache before reaching a backend.
pub struct MemoryBackend;

impl Backend for MemoryBackend {
    fn persist(&self, _id: &str, _value: &Value, _records: &Records) -> Result<(), StoreError> {
        Ok(())
    }

    fn load(&self, id: &str) -> Result<Value, StoreError> {
        Err(StoreError::NotFound { id: id.to_string() })
    }

    fn remove(&self, _id: &str, _records: &Records) -> Result<(), StoreError> {
        Ok(())
    }

    fn enumerate(&self, records: &Records) -> Result<BTreeSet<String>, StoreError> {
        Ok(records.keys().cloned().collect())
    }
}

#[cfg(feature = "async")]
#[async_trait::async_trait]
impl shelf_core::AsyncBackend for MemoryBackend {
    async fn persist_async(
        &self,
        _id: &str,
        _value: &Value,
        _records: &Records,
    ) -> Result<(), StoreError> {
        Ok(())
    }

    async fn load_async(&self, id: &str) -> Result<Value, StoreError> {
        Err(StoreError::NotFound { id: id.to_string() })
    }

    async fn remove_async(&self, _id: &str, _records: &Records) -> Result<(), StoreError> {
        Ok(())
    }

    async fn enumerate_async(&self, records: &Records) -> Result<BTreeSet<String>, StoreError> {
        Ok(records.keys().cloned().collect())
    }
}
