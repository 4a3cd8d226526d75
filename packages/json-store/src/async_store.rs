//! Non-blocking twins of the store operations.
//!
//! Each method mirrors its blocking namesake exactly - same cache staging,
//! same rollback, same error normalization - and suspends only at backend
//! I/O. The cache itself is never a suspension point.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use shelf_core::{AsyncBackend, Records, StoreError};

use crate::store::{normalize_load_error, Store};

impl Store {
    /// Non-blocking [`save`](Store::save).
    pub async fn save_async<T: Serialize>(&mut self, value: &T) -> Result<String, StoreError> {
        let id = self.id_generator.generate();
        self.save_with_id_async(&id, value).await
    }

    /// Non-blocking [`save_with_id`](Store::save_with_id).
    pub async fn save_with_id_async<T: Serialize>(
        &mut self,
        id: &str,
        value: &T,
    ) -> Result<String, StoreError> {
        let value = self.encode(id, value)?;
        let previous = self.cache.stage(id, value.clone());
        match self
            .backend
            .persist_async(id, &value, self.cache.records())
            .await
        {
            Ok(()) => Ok(id.to_string()),
            Err(e) => {
                self.cache.rollback(id, previous);
                Err(e)
            }
        }
    }

    /// Non-blocking [`get`](Store::get).
    pub async fn get_async<T: DeserializeOwned>(&mut self, id: &str) -> Result<T, StoreError> {
        let value = self.get_value_async(id).await?;
        serde_json::from_value(value).map_err(StoreError::from)
    }

    /// Non-blocking [`delete`](Store::delete).
    pub async fn delete_async(&mut self, id: &str) -> Result<(), StoreError> {
        let Some(previous) = self.cache.evict(id) else {
            return Err(StoreError::NotFound { id: id.to_string() });
        };
        match self.backend.remove_async(id, self.cache.records()).await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.cache.rollback(id, Some(previous));
                Err(e)
            }
        }
    }

    /// Non-blocking [`all`](Store::all).
    ///
    /// Cache misses are loaded concurrently; the first failure wins, and no
    /// value from a failed batch enters the cache.
    pub async fn all_async(&mut self) -> Result<Records, StoreError> {
        let ids = self.backend.enumerate_async(self.cache.records()).await?;

        let mut records = Records::new();
        let mut missing = Vec::new();
        for id in ids {
            match self.cache.read(&id) {
                Some(value) => {
                    records.insert(id, value);
                }
                None => missing.push(id),
            }
        }

        let backend = &self.backend;
        let loads = missing.iter().map(|id| async move {
            backend
                .load_async(id)
                .await
                .map_err(|e| normalize_load_error(id, e))
        });
        let loaded = futures::future::try_join_all(loads).await?;

        for (id, value) in missing.iter().zip(loaded) {
            self.cache.stage(id, value.clone());
            records.insert(id.clone(), value);
        }
        Ok(records)
    }

    async fn get_value_async(&mut self, id: &str) -> Result<Value, StoreError> {
        if let Some(value) = self.cache.read(id) {
            return Ok(value);
        }
        let value = self
            .backend
            .load_async(id)
            .await
            .map_err(|e| normalize_load_error(id, e))?;
        self.cache.stage(id, value.clone());
        Ok(value)
    }
}
