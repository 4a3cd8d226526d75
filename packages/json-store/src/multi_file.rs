//! One file per record: `<dir>/<id>.json`.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;

use shelf_core::{Backend, Records, StoreError, RECORD_EXT};

use crate::fs_util;

/// The default storage strategy. Records are independent files, so
/// operations on different ids never touch each other's data.
pub struct MultiFileBackend {
    dir: PathBuf,
    pretty: bool,
}

impl MultiFileBackend {
    /// Open the record directory, creating it if needed.
    pub fn open(dir: &Path, pretty: bool) -> Result<Self, StoreError> {
        fs::create_dir_all(dir).map_err(|e| StoreError::Initialization {
            message: format!(
                "could not create record directory '{}': {}",
                dir.display(),
                e
            ),
        })?;
        Ok(MultiFileBackend {
            dir: dir.to_path_buf(),
            pretty,
        })
    }

    fn record_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", id, RECORD_EXT))
    }

    fn decode(id: &str, text: &str) -> Result<Value, StoreError> {
        serde_json::from_str(text).map_err(|e| StoreError::Serialization {
            message: format!("record '{}' is not valid JSON: {}", id, e),
        })
    }

    fn io_error(id: &str, path: &Path, source: io::Error) -> StoreError {
        if source.kind() == io::ErrorKind::NotFound {
            StoreError::NotFound { id: id.to_string() }
        } else {
            StoreError::Persistence {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

impl Backend for MultiFileBackend {
    fn persist(&self, id: &str, value: &Value, _records: &Records) -> Result<(), StoreError> {
        fs_util::write_atomic(&self.record_path(id), value, self.pretty)
    }

    fn load(&self, id: &str) -> Result<Value, StoreError> {
        let path = self.record_path(id);
        log::debug!("reading {}", path.display());
        let text = fs::read_to_string(&path).map_err(|e| Self::io_error(id, &path, e))?;
        Self::decode(id, &text)
    }

    fn remove(&self, id: &str, _records: &Records) -> Result<(), StoreError> {
        let path = self.record_path(id);
        fs::remove_file(&path).map_err(|e| Self::io_error(id, &path, e))
    }

    fn enumerate(&self, _records: &Records) -> Result<BTreeSet<String>, StoreError> {
        fs_util::list_ids(&self.dir)
    }
}

#[cfg(feature = "async")]
#[async_trait::async_trait]
impl shelf_core::AsyncBackend for MultiFileBackend {
    async fn persist_async(
        &self,
        id: &str,
        value: &Value,
        _records: &Records,
    ) -> Result<(), StoreError> {
        fs_util::write_atomic_async(&self.record_path(id), value, self.pretty).await
    }

    async fn load_async(&self, id: &str) -> Result<Value, StoreError> {
        let path = self.record_path(id);
        log::debug!("reading {}", path.display());
        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| Self::io_error(id, &path, e))?;
        Self::decode(id, &text)
    }

    async fn remove_async(&self, id: &str, _records: &Records) -> Result<(), StoreError> {
        let path = self.record_path(id);
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| Self::io_error(id, &path, e))
    }

    async fn enumerate_async(&self, _records: &Records) -> Result<BTreeSet<String>, StoreError> {
        fs_util::list_ids_async(&self.dir).await
    }
}
