//! The store facade: cache + backend + id generation behind one API.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use shelf_core::{Backend, IdGenerator, IdStamp, Mode, Records, StoreConfig, StoreError};

use crate::backend::BackendKind;
use crate::cache::Cache;
use crate::memory::MemoryBackend;
use crate::multi_file::MultiFileBackend;
use crate::single_file::SingleFileBackend;

/// An embedded JSON document store.
///
/// Values go in and come out through serde, so the store never aliases
/// caller-held data: `save` serializes a copy in, `get` decodes a copy out.
/// Between operations the in-memory cache always equals the durable state of
/// the configured backend; a failed save or delete rolls the cache back to
/// exactly its prior state.
///
/// Every operation has a blocking form here and, with the `async` feature, a
/// non-blocking `_async` twin that suspends only at backend I/O.
///
/// # Example
///
/// ```rust
/// use shelf_json_store::{Store, StoreConfig};
/// use serde_json::json;
///
/// let mut store = Store::open(StoreConfig::new("scratch").memory()).unwrap();
/// let id = store.save(&json!({"x": 56})).unwrap();
/// let value: serde_json::Value = store.get(&id).unwrap();
/// assert_eq!(value, json!({"x": 56}));
/// ```
pub struct Store {
    pub(crate) backend: BackendKind,
    pub(crate) cache: Cache,
    pub(crate) id_generator: Arc<dyn IdGenerator>,
    pub(crate) id_stamp: IdStamp,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("cache", &self.cache)
            .field("id_stamp", &self.id_stamp)
            .finish_non_exhaustive()
    }
}

impl Store {
    /// Open the store described by `config`.
    ///
    /// Multi-file mode creates the record directory; single-file mode
    /// creates the parent directory, seeds an empty aggregate if absent, and
    /// loads the existing one wholesale into the cache. Any setup failure is
    /// fatal to construction.
    pub fn open(config: StoreConfig) -> Result<Store, StoreError> {
        let (backend, cache) = match config.effective_mode()? {
            Mode::MultiFile => (
                BackendKind::MultiFile(MultiFileBackend::open(
                    config.location(),
                    config.is_pretty(),
                )?),
                Cache::new(),
            ),
            Mode::SingleFile => {
                let (backend, records) =
                    SingleFileBackend::open(config.location(), config.is_pretty())?;
                (
                    BackendKind::SingleFile(backend),
                    Cache::from_records(records),
                )
            }
            Mode::Memory => (BackendKind::Memory(MemoryBackend), Cache::new()),
        };

        Ok(Store {
            backend,
            cache,
            id_generator: config.generator(),
            id_stamp: config.id_stamp().clone(),
        })
    }

    /// Save `value` under a generated id and return the id.
    pub fn save<T: Serialize>(&mut self, value: &T) -> Result<String, StoreError> {
        let id = self.id_generator.generate();
        self.save_with_id(&id, value)
    }

    /// Save `value` under `id`, overwriting any existing record.
    ///
    /// In multi-file mode the id is used verbatim as a file-name component.
    /// If id stamping is configured and the value is a JSON object, the id is
    /// written into the persisted copy - never into the caller's value.
    pub fn save_with_id<T: Serialize>(&mut self, id: &str, value: &T) -> Result<String, StoreError> {
        let value = self.encode(id, value)?;
        let previous = self.cache.stage(id, value.clone());
        match self.backend.persist(id, &value, self.cache.records()) {
            Ok(()) => Ok(id.to_string()),
            Err(e) => {
                self.cache.rollback(id, previous);
                Err(e)
            }
        }
    }

    /// Fetch the record under `id`, decoded into `T`.
    ///
    /// A cache hit decodes from a copy without touching the backend; a miss
    /// loads through the backend and populates the cache. A record that
    /// exists on disk but cannot be decoded is reported as `NotFound` (the
    /// cause is logged); a well-formed record that does not fit `T` is a
    /// `Serialization` error.
    pub fn get<T: DeserializeOwned>(&mut self, id: &str) -> Result<T, StoreError> {
        let value = self.get_value(id)?;
        serde_json::from_value(value).map_err(StoreError::from)
    }

    /// Delete the record under `id`.
    ///
    /// An id this store has never observed fails with `NotFound` before the
    /// backend is touched. A backend failure restores the evicted entry.
    pub fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        let Some(previous) = self.cache.evict(id) else {
            return Err(StoreError::NotFound { id: id.to_string() });
        };
        match self.backend.remove(id, self.cache.records()) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.cache.rollback(id, Some(previous));
                Err(e)
            }
        }
    }

    /// Every record in the store, keyed by id.
    ///
    /// Fails fast on the first unreadable record; ids resolved before the
    /// failure may remain cached.
    pub fn all(&mut self) -> Result<Records, StoreError> {
        let ids = self.backend.enumerate(self.cache.records())?;
        let mut records = Records::new();
        for id in ids {
            let value = self.get_value(&id)?;
            records.insert(id, value);
        }
        Ok(records)
    }

    pub(crate) fn get_value(&mut self, id: &str) -> Result<Value, StoreError> {
        if let Some(value) = self.cache.read(id) {
            return Ok(value);
        }
        let value = self
            .backend
            .load(id)
            .map_err(|e| normalize_load_error(id, e))?;
        self.cache.stage(id, value.clone());
        Ok(value)
    }

    pub(crate) fn encode<T: Serialize>(&self, id: &str, value: &T) -> Result<Value, StoreError> {
        let mut value = serde_json::to_value(value)?;
        if let (Some(key), Value::Object(map)) = (self.id_stamp.key(), &mut value) {
            map.insert(key.to_string(), Value::String(id.to_string()));
        }
        Ok(value)
    }
}

/// At the `get` boundary an undecodable record is indistinguishable from a
/// missing one; the cause goes to the log, not the caller.
pub(crate) fn normalize_load_error(id: &str, error: StoreError) -> StoreError {
    match error {
        StoreError::Serialization { message } => {
            log::warn!("could not load '{}': {}", id, message);
            StoreError::NotFound { id: id.to_string() }
        }
        other => other,
    }
}
