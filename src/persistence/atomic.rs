use std::ffi::OsString;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::error::StorageError;

/// Crash-safe single-file store for one serialized value.
///
/// Writes go to `<path>.tmp`, the current file is copied to `<path>.backup`,
/// and the temp file is renamed over `<path>`. A reader therefore sees either
/// the previous generation or the new one, never a partial write.
#[derive(Debug)]
pub struct AtomicRecordStore<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

impl<T> AtomicRecordStore<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn tmp_path(&self) -> PathBuf {
        sibling(&self.path, ".tmp")
    }

    pub fn backup_path(&self) -> PathBuf {
        sibling(&self.path, ".backup")
    }

    /// Loads the stored value.
    ///
    /// Returns `None` when the file is absent, or when both the primary file
    /// and its backup are unreadable. Never fails: corrupt data is logged and
    /// treated as missing.
    pub async fn load(&self) -> Option<T> {
        match read_json::<T>(&self.path).await {
            Ok(Some(value)) => return Some(value),
            Ok(None) => return None,
            Err(reason) => {
                warn!(path = %self.path.display(), %reason, "primary file unreadable; trying backup");
            }
        }

        let backup = self.backup_path();
        match read_json::<T>(&backup).await {
            Ok(Some(value)) => {
                info!(path = %backup.display(), "recovered collection from backup");
                Some(value)
            }
            Ok(None) => {
                warn!(path = %self.path.display(), "no backup available; starting empty");
                None
            }
            Err(reason) => {
                warn!(path = %backup.display(), %reason, "backup unreadable; starting empty");
                None
            }
        }
    }

    /// Reads the raw bytes of the primary file without any recovery.
    pub async fn read_raw(&self) -> Option<Vec<u8>> {
        fs::read(&self.path).await.ok()
    }

    /// Persists `value`, leaving the primary file untouched on any failure.
    pub async fn save(&self, value: &T) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec_pretty(value)?;

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .await
                .map_err(|e| StorageError::io("create dir", dir, e))?;
        }

        let tmp = self.tmp_path();
        if let Err(e) = self.replace_with(&tmp, &bytes).await {
            if let Err(cleanup) = fs::remove_file(&tmp).await {
                if cleanup.kind() != ErrorKind::NotFound {
                    warn!(path = %tmp.display(), error = %cleanup, "could not remove temp file");
                }
            }
            warn!(path = %self.path.display(), error = %e, "save failed");
            return Err(e);
        }

        debug!(path = %self.path.display(), bytes = bytes.len(), "collection saved");
        Ok(())
    }

    async fn replace_with(&self, tmp: &Path, bytes: &[u8]) -> Result<(), StorageError> {
        fs::write(tmp, bytes)
            .await
            .map_err(|e| StorageError::io("write temp file", tmp, e))?;

        if fs::try_exists(&self.path).await.unwrap_or(false) {
            let backup = self.backup_path();
            fs::copy(&self.path, &backup)
                .await
                .map_err(|e| StorageError::io("copy backup", &backup, e))?;
        }

        fs::rename(tmp, &self.path)
            .await
            .map_err(|e| StorageError::io("rename temp file", &self.path, e))
    }

    /// Deletes a temp file left behind by an interrupted save. Returns whether
    /// one was found.
    pub async fn discard_stale_temp(&self) -> bool {
        let tmp = self.tmp_path();
        match fs::remove_file(&tmp).await {
            Ok(()) => {
                info!(path = %tmp.display(), "removed temp file from interrupted save");
                true
            }
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(e) => {
                warn!(path = %tmp.display(), error = %e, "could not remove stale temp file");
                false
            }
        }
    }
}

/// `Ok(None)` for a missing file, `Err` with a reason for unreadable or
/// unparseable content.
async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, String> {
    let bytes = match fs::read(path).await {
        Ok(b) => b,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.to_string()),
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> AtomicRecordStore<Vec<String>> {
        AtomicRecordStore::new(dir.path().join("items.json"))
    }

    fn items(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn load_missing_returns_none() {
        let dir = TempDir::new().unwrap();
        assert_eq!(store(&dir).load().await, None);
    }

    #[tokio::test]
    async fn save_then_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir);
        s.save(&items(&["a", "b"])).await.unwrap();

        assert_eq!(s.load().await, Some(items(&["a", "b"])));
        assert!(!s.tmp_path().exists(), "tmp file should be gone after rename");
        assert!(!s.backup_path().exists(), "first save has nothing to back up");
    }

    #[tokio::test]
    async fn second_save_keeps_previous_generation_as_backup() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir);
        s.save(&items(&["v1"])).await.unwrap();
        s.save(&items(&["v2"])).await.unwrap();

        let backup: Vec<String> =
            serde_json::from_slice(&std::fs::read(s.backup_path()).unwrap()).unwrap();
        assert_eq!(backup, items(&["v1"]));
        assert_eq!(s.load().await, Some(items(&["v2"])));
    }

    #[tokio::test]
    async fn corrupt_primary_recovers_from_backup() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir);
        s.save(&items(&["old"])).await.unwrap();
        s.save(&items(&["new"])).await.unwrap();

        std::fs::write(s.path(), b"{ not json").unwrap();
        assert_eq!(s.load().await, Some(items(&["old"])));
    }

    #[tokio::test]
    async fn corrupt_primary_without_backup_is_empty() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir);
        std::fs::write(s.path(), b"\x00\x01garbage").unwrap();
        assert_eq!(s.load().await, None);
    }

    #[tokio::test]
    async fn interrupted_write_leaves_primary_intact() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir);
        s.save(&items(&["committed"])).await.unwrap();

        // a crash after the temp write but before the rename
        std::fs::write(s.tmp_path(), b"[\"half").unwrap();

        assert_eq!(s.load().await, Some(items(&["committed"])));
        assert!(s.discard_stale_temp().await);
        assert!(!s.tmp_path().exists());
        assert!(!s.discard_stale_temp().await);
    }

    #[tokio::test]
    async fn failed_save_propagates_and_keeps_primary() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir);
        s.save(&items(&["safe"])).await.unwrap();

        // a directory in place of the temp file makes the write fail
        std::fs::create_dir(s.tmp_path()).unwrap();
        let err = s.save(&items(&["lost"])).await.unwrap_err();
        assert!(matches!(err, StorageError::Io { op: "write temp file", .. }));

        assert_eq!(s.load().await, Some(items(&["safe"])));
    }

    #[tokio::test]
    async fn failed_backup_copy_removes_temp_file() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir);
        s.save(&items(&["first"])).await.unwrap();

        // the temp write succeeds, then copying over a directory fails
        std::fs::create_dir(s.backup_path()).unwrap();
        let err = s.save(&items(&["second"])).await.unwrap_err();
        assert!(matches!(err, StorageError::Io { op: "copy backup", .. }));

        assert!(!s.tmp_path().exists());
        assert_eq!(s.load().await, Some(items(&["first"])));
    }

    #[tokio::test]
    async fn save_creates_missing_parent_dir() {
        let dir = TempDir::new().unwrap();
        let s: AtomicRecordStore<Vec<String>> =
            AtomicRecordStore::new(dir.path().join("nested/deeper/items.json"));
        s.save(&items(&["x"])).await.unwrap();
        assert_eq!(s.load().await, Some(items(&["x"])));
    }
}
