//! The whole store as one aggregate file: a JSON object mapping id -> value.

use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;

use shelf_core::{Backend, Records, StoreError, RECORD_EXT};

use crate::fs_util;

/// Storage strategy keeping every record in a single document.
///
/// `persist` and `remove` rewrite the entire aggregate from the staged cache
/// view; there are no partial-file updates, so the file on disk is always a
/// complete, parseable document.
#[derive(Debug)]
pub struct SingleFileBackend {
    file: PathBuf,
    pretty: bool,
}

impl SingleFileBackend {
    /// Open the aggregate at `location`, seeding an empty document if absent,
    /// and return the records it holds.
    ///
    /// `location` may name the aggregate file itself (`data/all.json`) or a
    /// bare store name (`data/all`), which maps to `data/all.json`.
    pub fn open(location: &Path, pretty: bool) -> Result<(Self, Records), StoreError> {
        let file = aggregate_path(location);

        if let Some(dir) = file.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| StoreError::Initialization {
                message: format!("could not create store directory '{}': {}", dir.display(), e),
            })?;
        }

        if !file.exists() {
            fs_util::write_atomic(&file, &Records::new(), pretty).map_err(|e| {
                StoreError::Initialization {
                    message: format!("could not create database '{}': {}", file.display(), e),
                }
            })?;
        }

        let text = fs::read_to_string(&file).map_err(|e| StoreError::Initialization {
            message: format!("could not read database '{}': {}", file.display(), e),
        })?;
        let records: Records =
            serde_json::from_str(&text).map_err(|e| StoreError::Initialization {
                message: format!("database '{}' is corrupt: {}", file.display(), e),
            })?;

        Ok((SingleFileBackend { file, pretty }, records))
    }

    fn decode(&self, text: &str) -> Result<Records, StoreError> {
        serde_json::from_str(text).map_err(|e| StoreError::Serialization {
            message: format!("database '{}' is corrupt: {}", self.file.display(), e),
        })
    }

    fn io_error(&self, id: &str, source: io::Error) -> StoreError {
        if source.kind() == io::ErrorKind::NotFound {
            StoreError::NotFound { id: id.to_string() }
        } else {
            StoreError::Persistence {
                path: self.file.clone(),
                source,
            }
        }
    }
}

fn aggregate_path(location: &Path) -> PathBuf {
    if location.extension().and_then(OsStr::to_str) == Some(RECORD_EXT) {
        location.to_path_buf()
    } else {
        let mut name = location.as_os_str().to_os_string();
        name.push(format!(".{}", RECORD_EXT));
        PathBuf::from(name)
    }
}

impl Backend for SingleFileBackend {
    fn persist(&self, _id: &str, _value: &Value, records: &Records) -> Result<(), StoreError> {
        fs_util::write_atomic(&self.file, records, self.pretty)
    }

    fn load(&self, id: &str) -> Result<Value, StoreError> {
        log::debug!("reading {}", self.file.display());
        let text = fs::read_to_string(&self.file).map_err(|e| self.io_error(id, e))?;
        let records = self.decode(&text)?;
        records
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })
    }

    fn remove(&self, _id: &str, records: &Records) -> Result<(), StoreError> {
        fs_util::write_atomic(&self.file, records, self.pretty)
    }

    fn enumerate(&self, records: &Records) -> Result<BTreeSet<String>, StoreError> {
        Ok(records.keys().cloned().collect())
    }
}

#[cfg(feature = "async")]
#[async_trait::async_trait]
impl shelf_core::AsyncBackend for SingleFileBackend {
    async fn persist_async(
        &self,
        _id: &str,
        _value: &Value,
        records: &Records,
    ) -> Result<(), StoreError> {
        fs_util::write_atomic_async(&self.file, records, self.pretty).await
    }

    async fn load_async(&self, id: &str) -> Result<Value, StoreError> {
        log::debug!("reading {}", self.file.display());
        let text = tokio::fs::read_to_string(&self.file)
            .await
            .map_err(|e| self.io_error(id, e))?;
        let records = self.decode(&text)?;
        records
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })
    }

    async fn remove_async(&self, _id: &str, records: &Records) -> Result<(), StoreError> {
        fs_util::write_atomic_async(&self.file, records, self.pretty).await
    }

    async fn enumerate_async(&self, records: &Records) -> Result<BTreeSet<String>, StoreError> {
        Ok(records.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn open_seeds_an_empty_document() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("db.json");

        let (_backend, records) = SingleFileBackend::open(&file, false).unwrap();

        assert!(records.is_empty());
        assert_eq!(fs::read_to_string(&file).unwrap(), "{}");
    }

    #[test]
    fn bare_name_maps_to_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let location = dir.path().join("db");

        SingleFileBackend::open(&location, false).unwrap();

        assert!(dir.path().join("db.json").is_file());
    }

    #[test]
    fn open_loads_an_existing_database() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("db.json");
        fs::write(&file, r#"{"id1":{"foo":"bar"}}"#).unwrap();

        let (_backend, records) = SingleFileBackend::open(&file, false).unwrap();

        assert_eq!(records.get("id1"), Some(&json!({"foo": "bar"})));
    }

    #[test]
    fn open_rejects_a_corrupt_database() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("db.json");
        fs::write(&file, b"not a json object").unwrap();

        let err = SingleFileBackend::open(&file, false).unwrap_err();
        assert!(matches!(err, StoreError::Initialization { .. }));
    }

    #[test]
    fn persist_rewrites_the_whole_aggregate() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("db.json");
        let (backend, _) = SingleFileBackend::open(&file, false).unwrap();

        let mut records = Records::new();
        records.insert("d1".to_string(), json!({"x": 0.6}));
        records.insert("d2".to_string(), json!({"z": -3}));
        backend.persist("d2", &json!({"z": -3}), &records).unwrap();

        assert_eq!(
            fs::read_to_string(&file).unwrap(),
            r#"{"d1":{"x":0.6},"d2":{"z":-3}}"#
        );
    }

    #[test]
    fn load_extracts_the_sub_key() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("db.json");
        fs::write(&file, r#"{"a":1,"b":2}"#).unwrap();
        let (backend, _) = SingleFileBackend::open(&file, false).unwrap();

        assert_eq!(backend.load("b").unwrap(), json!(2));
        assert!(backend.load("c").unwrap_err().is_not_found());
    }

    #[test]
    fn enumerate_returns_the_record_keys() {
        let dir = tempfile::tempdir().unwrap();
        let (backend, _) =
            SingleFileBackend::open(&dir.path().join("db.json"), false).unwrap();

        let mut records = Records::new();
        records.insert("a".to_string(), json!(1));

        let ids = backend.enumerate(&records).unwrap();
        assert_eq!(ids.into_iter().collect::<Vec<_>>(), vec!["a"]);
    }
}
