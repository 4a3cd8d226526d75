//! Async twin of the storage-strategy seam.
//!
//! Enable the `async` feature to use this trait:
//!
//! ```toml
//! [dependencies]
//! shelf-core = { version = "0.1", features = ["async"] }
//! ```

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreError;
use crate::traits::Records;

/// Async version of [`Backend`](crate::Backend).
///
/// Method contracts match the blocking trait exactly; only the call form
/// differs. Every non-blocking store operation suspends solely inside these
/// methods - the cache itself is never a suspension point.
///
/// # Object Safety
///
/// This trait is object-safe: you can use `Box<dyn AsyncBackend>`.
#[async_trait]
pub trait AsyncBackend: Send + Sync {
    /// Durably record the value staged under `id`.
    async fn persist_async(
        &self,
        id: &str,
        value: &Value,
        records: &Records,
    ) -> Result<(), StoreError>;

    /// Load the value stored under `id`.
    async fn load_async(&self, id: &str) -> Result<Value, StoreError>;

    /// Remove the record stored under `id`.
    async fn remove_async(&self, id: &str, records: &Records) -> Result<(), StoreError>;

    /// Every id currently stored.
    async fn enumerate_async(&self, records: &Records) -> Result<BTreeSet<String>, StoreError>;
}
