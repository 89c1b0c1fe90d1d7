use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use super::atomic::AtomicRecordStore;
use crate::error::StorageError;

/// On-disk envelope: `{ "version": n, "data": [...] }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionedCollection<T> {
    pub version: u32,
    pub data: Vec<T>,
}

/// Either shape a collection file may hold. The envelope is tried first; a
/// bare array is the pre-envelope format and is still accepted on read.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum StoredCollection<T> {
    Versioned(VersionedCollection<T>),
    Legacy(Vec<T>),
}

#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

/// Schema-tagged collection of `T` on top of [`AtomicRecordStore`].
#[derive(Debug)]
pub struct VersionedRecordStore<T> {
    inner: AtomicRecordStore<StoredCollection<T>>,
    current_version: u32,
}

impl<T> VersionedRecordStore<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: impl Into<PathBuf>, current_version: u32) -> Self {
        Self {
            inner: AtomicRecordStore::new(path),
            current_version,
        }
    }

    pub fn path(&self) -> &Path {
        self.inner.path()
    }

    pub fn current_version(&self) -> u32 {
        self.current_version
    }

    /// Loads the collection and the version to treat it as.
    ///
    /// Legacy arrays and unreadable files come back tagged with the current
    /// version; a stored version is never lowered below it.
    pub async fn load(&self) -> (Vec<T>, u32) {
        match self.inner.load().await {
            Some(StoredCollection::Versioned(c)) => {
                let version = c.version.max(self.current_version);
                (c.data, version)
            }
            Some(StoredCollection::Legacy(data)) => {
                debug!(path = %self.path().display(), items = data.len(), "read legacy bare-array collection");
                (data, self.current_version)
            }
            None => (Vec::new(), self.current_version),
        }
    }

    /// Always writes the envelope shape with the current version.
    pub async fn save(&self, data: Vec<T>) -> Result<Vec<T>, StorageError> {
        let stored = StoredCollection::Versioned(VersionedCollection {
            version: self.current_version,
            data,
        });
        self.inner.save(&stored).await?;
        match stored {
            StoredCollection::Versioned(c) => Ok(c.data),
            StoredCollection::Legacy(data) => Ok(data),
        }
    }

    /// Version field of the primary file without materialising its data.
    /// `0` when the file is absent, unversioned or unreadable.
    pub async fn peek_version(&self) -> u32 {
        self.inner
            .read_raw()
            .await
            .and_then(|bytes| serde_json::from_slice::<VersionProbe>(&bytes).ok())
            .map(|probe| probe.version)
            .unwrap_or(0)
    }

    pub async fn discard_stale_temp(&self) -> bool {
        self.inner.discard_stale_temp().await
    }
}
