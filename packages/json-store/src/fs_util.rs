//! Filesystem plumbing: the atomic writer and the directory lister.

use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use uuid::Uuid;

use shelf_core::{StoreError, RECORD_EXT};

/// Extension reserved for not-yet-committed temporary files.
const TMP_EXT: &str = "tmp";

fn encode<T: Serialize>(data: &T, pretty: bool) -> Result<String, StoreError> {
    let text = if pretty {
        serde_json::to_string_pretty(data)?
    } else {
        serde_json::to_string(data)?
    };
    Ok(text)
}

/// `<destination><uuid>.tmp`, alongside the destination so the final rename
/// never crosses a filesystem boundary.
fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(format!("{}.{}", Uuid::new_v4(), TMP_EXT));
    PathBuf::from(name)
}

fn persistence(path: &Path, source: io::Error) -> StoreError {
    StoreError::Persistence {
        path: path.to_path_buf(),
        source,
    }
}

fn read_only_error() -> io::Error {
    io::Error::new(io::ErrorKind::PermissionDenied, "destination is read-only")
}

/// Advisory probe: reject an existing read-only destination before any bytes
/// are written. A rename can still replace a read-only file on POSIX, so this
/// catches the common permission mistake early; it guarantees nothing.
fn probe_writable(path: &Path) -> Result<(), StoreError> {
    match fs::metadata(path) {
        Ok(meta) if meta.permissions().readonly() => Err(persistence(path, read_only_error())),
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(persistence(path, e)),
    }
}

/// Serialize `data` and persist it at `path` via temp-file-plus-rename.
///
/// Serialization failures abort before anything touches disk. The rename is
/// the commit point: readers never observe a partially written destination.
/// A temporary file can be left behind if the process dies between write and
/// rename; it is not swept.
pub(crate) fn write_atomic<T: Serialize>(
    path: &Path,
    data: &T,
    pretty: bool,
) -> Result<(), StoreError> {
    let text = encode(data, pretty)?;
    probe_writable(path)?;

    let tmp = tmp_path(path);
    log::debug!("writing {}", tmp.display());
    fs::write(&tmp, &text).map_err(|e| persistence(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| persistence(path, e))
}

/// Ids of every record file directly under `dir`, in no meaningful order.
pub(crate) fn list_ids(dir: &Path) -> Result<BTreeSet<String>, StoreError> {
    let entries = fs::read_dir(dir).map_err(|e| persistence(dir, e))?;
    let mut ids = BTreeSet::new();
    for entry in entries {
        let entry = entry.map_err(|e| persistence(dir, e))?;
        collect_id(&entry.path(), &mut ids);
    }
    Ok(ids)
}

fn collect_id(path: &Path, ids: &mut BTreeSet<String>) {
    if path.extension().and_then(OsStr::to_str) != Some(RECORD_EXT) {
        return;
    }
    if let Some(stem) = path.file_stem().and_then(OsStr::to_str) {
        ids.insert(stem.to_string());
    }
}

#[cfg(feature = "async")]
pub(crate) async fn write_atomic_async<T: Serialize>(
    path: &Path,
    data: &T,
    pretty: bool,
) -> Result<(), StoreError> {
    let text = encode(data, pretty)?;
    probe_writable_async(path).await?;

    let tmp = tmp_path(path);
    log::debug!("writing {}", tmp.display());
    tokio::fs::write(&tmp, &text)
        .await
        .map_err(|e| persistence(&tmp, e))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| persistence(path, e))
}

#[cfg(feature = "async")]
async fn probe_writable_async(path: &Path) -> Result<(), StoreError> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.permissions().readonly() => Err(persistence(path, read_only_error())),
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(persistence(path, e)),
    }
}

#[cfg(feature = "async")]
pub(crate) async fn list_ids_async(dir: &Path) -> Result<BTreeSet<String>, StoreError> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| persistence(dir, e))?;
    let mut ids = BTreeSet::new();
    while let Some(entry) = entries.next_entry().await.map_err(|e| persistence(dir, e))? {
        collect_id(&entry.path(), &mut ids);
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn writes_compact_json() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("record.json");

        write_atomic(&dest, &json!({"x": 56}), false).unwrap();

        assert_eq!(fs::read_to_string(&dest).unwrap(), r#"{"x":56}"#);
    }

    #[test]
    fn writes_pretty_json() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("record.json");

        write_atomic(&dest, &json!({"p": "retty"}), true).unwrap();

        assert_eq!(
            fs::read_to_string(&dest).unwrap(),
            "{\n  \"p\": \"retty\"\n}"
        );
    }

    #[test]
    fn leaves_no_temp_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("record.json");

        write_atomic(&dest, &json!(1), false).unwrap();
        write_atomic(&dest, &json!(2), false).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("record.json")]);
    }

    #[test]
    fn unserializable_data_aborts_before_disk() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("record.json");

        // Non-string map keys cannot be represented in JSON.
        let mut bad = BTreeMap::new();
        bad.insert((1, 2), 3);

        let err = write_atomic(&dest, &bad, false).unwrap_err();
        assert!(matches!(err, StoreError::Serialization { .. }));
        assert!(!dest.exists());
    }

    #[test]
    fn rejects_read_only_destination() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("record.json");
        write_atomic(&dest, &json!({"some": "data"}), false).unwrap();

        let mut perms = fs::metadata(&dest).unwrap().permissions();
        perms.set_readonly(true);
        fs::set_permissions(&dest, perms.clone()).unwrap();

        let err = write_atomic(&dest, &json!({"bar": "baz"}), false).unwrap_err();
        assert!(matches!(err, StoreError::Persistence { .. }));
        assert_eq!(fs::read_to_string(&dest).unwrap(), r#"{"some":"data"}"#);

        perms.set_readonly(false);
        fs::set_permissions(&dest, perms).unwrap();
    }

    #[test]
    fn write_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("no/such/dir/record.json");

        let err = write_atomic(&dest, &json!(1), false).unwrap_err();
        assert!(matches!(err, StoreError::Persistence { .. }));
    }

    #[test]
    fn lists_only_record_ids() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.json", "b.json", "sub.key.json", "notes.txt"] {
            fs::write(dir.path().join(name), b"{}").unwrap();
        }

        let ids = list_ids(dir.path()).unwrap();

        let expected: BTreeSet<String> = ["a", "b", "sub.key"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn listing_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = list_ids(&dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, StoreError::Persistence { .. }));
    }

    #[cfg(feature = "async")]
    mod async_io {
        use super::*;

        #[tokio::test]
        async fn async_write_matches_blocking() {
            let dir = tempfile::tempdir().unwrap();
            let dest = dir.path().join("record.json");

            write_atomic_async(&dest, &json!({"x": 56}), false)
                .await
                .unwrap();

            assert_eq!(fs::read_to_string(&dest).unwrap(), r#"{"x":56}"#);
        }

        #[tokio::test]
        async fn async_listing_matches_blocking() {
            let dir = tempfile::tempdir().unwrap();
            for name in ["a.json", "b.txt"] {
                fs::write(dir.path().join(name), b"{}").unwrap();
            }

            let ids = list_ids_async(dir.path()).await.unwrap();
            assert_eq!(ids, list_ids(dir.path()).unwrap());
        }
    }
}
