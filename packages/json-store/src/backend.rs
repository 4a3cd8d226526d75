//! Runtime dispatch over the storage strategies.

use std::collections::BTreeSet;

use serde_json::Value;

use shelf_core::{Backend, Records, StoreError};

#[cfg(feature = "async")]
use shelf_core::AsyncBackend;

use crate::memory::MemoryBackend;
use crate::multi_file::MultiFileBackend;
use crate::single_file::SingleFileBackend;

/// The backend a store was opened with. Implements the backend traits by
/// delegation so the facade works with whichever mode the configuration
/// resolved to.
pub(crate) enum BackendKind {
    MultiFile(MultiFileBackend),
    SingleFile(SingleFileBackend),
    Memory(MemoryBackend),
}

impl Backend for BackendKind {
    fn persist(&self, id: &str, value: &Value, records: &Records) -> Result<(), StoreError> {
        match self {
            BackendKind::MultiFile(b) => b.persist(id, value, records),
            BackendKind::SingleFile(b) => b.persist(id, value, records),
            BackendKind::Memory(b) => b.persist(id, value, records),
        }
    }

    fn load(&self, id: &str) -> Result<Value, StoreError> {
        match self {
            BackendKind::MultiFile(b) => b.load(id),
            BackendKind::SingleFile(b) => b.load(id),
            BackendKind::Memory(b) => b.load(id),
        }
    }

    fn remove(&self, id: &str, records: &Records) -> Result<(), StoreError> {
        match self {
            BackendKind::MultiFile(b) => b.remove(id, records),
            BackendKind::SingleFile(b) => b.remove(id, records),
            BackendKind::Memory(b) => b.remove(id, records),
        }
    }

    fn enumerate(&self, records: &Records) -> Result<BTreeSet<String>, StoreError> {
        match self {
            BackendKind::MultiFile(b) => b.enumerate(records),
            BackendKind::SingleFile(b) => b.enumerate(records),
            BackendKind::Memory(b) => b.enumerate(records),
        }
    }
}

#[cfg(feature = "async")]
#[async_trait::async_trait]
impl AsyncBackend for BackendKind {
    async fn persist_async(
        &self,
        id: &str,
        value: &Value,
        records: &Records,
    ) -> Result<(), StoreError> {
        match self {
            BackendKind::MultiFile(b) => b.persist_async(id, value, records).await,
            BackendKind::SingleFile(b) => b.persist_async(id, value, records).await,
            BackendKind::Memory(b) => b.persist_async(id, value, records).await,
        }
    }

    async fn load_async(&self, id: &str) -> Result<Value, StoreError> {
        match self {
            BackendKind::MultiFile(b) => b.load_async(id).await,
            BackendKind::SingleFile(b) => b.load_async(id).await,
            BackendKind::Memory(b) => b.load_async(id).await,
        }
    }

    async fn remove_async(&self, id: &str, records: &Records) -> Result<(), StoreError> {
        match self {
            BackendKind::MultiFile(b) => b.remove_async(id, records).await,
            BackendKind::SingleFile(b) => b.remove_async(id, records).await,
            BackendKind::Memory(b) => b.remove_async(id, records).await,
        }
    }

    async fn enumerate_async(&self, records: &Records) -> Result<BTreeSet<String>, StoreError> {
        match self {
            BackendKind::MultiFile(b) => b.enumerate_async(records).await,
            BackendKind::SingleFile(b) => b.enumerate_async(records).await,
            BackendKind::Memory(b) => b.enumerate_async(records).await,
        }
    }
}
