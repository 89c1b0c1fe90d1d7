use std::path::PathBuf;

use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

use super::versioned::VersionedRecordStore;
use crate::error::StorageError;

enum LoadState<T> {
    Unloaded,
    Ready(Vec<T>),
}

/// One persisted collection behind an async mutex, loaded from disk on first
/// access and rewritten in full on every mutation.
///
/// Loading happens while the mutex is held, so concurrent first callers wait
/// for a single disk read instead of each performing one.
pub struct LazyCollection<T> {
    store: VersionedRecordStore<T>,
    state: Mutex<LoadState<T>>,
}

impl<T> LazyCollection<T>
where
    T: Clone + Serialize + DeserializeOwned + Send,
{
    pub fn new(path: impl Into<PathBuf>, current_version: u32) -> Self {
        Self {
            store: VersionedRecordStore::new(path, current_version),
            state: Mutex::new(LoadState::Unloaded),
        }
    }

    pub fn store(&self) -> &VersionedRecordStore<T> {
        &self.store
    }

    /// Acquires the collection lock, loading from disk if this is the first
    /// access.
    pub async fn lock(&self) -> CollectionGuard<'_, T> {
        let mut guard = self.state.lock().await;
        if let LoadState::Unloaded = *guard {
            self.store.discard_stale_temp().await;
            let (items, version) = self.store.load().await;
            debug!(
                path = %self.store.path().display(),
                items = items.len(),
                version,
                "collection loaded"
            );
            *guard = LoadState::Ready(items);
        }
        CollectionGuard {
            guard,
            store: &self.store,
        }
    }

    pub async fn read<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        let guard = self.lock().await;
        f(guard.items())
    }

    /// Applies `f` to a copy of the collection. When `f` returns `Some`, the
    /// copy is saved and becomes the in-memory state; when it returns `None`
    /// nothing is written. A failed save leaves memory and disk unchanged.
    pub async fn update<R>(
        &self,
        f: impl FnOnce(&mut Vec<T>) -> Option<R>,
    ) -> Result<Option<R>, StorageError> {
        let mut guard = self.lock().await;
        let mut next = guard.items().to_vec();
        match f(&mut next) {
            Some(out) => {
                guard.commit(next).await?;
                Ok(Some(out))
            }
            None => Ok(None),
        }
    }
}

/// Exclusive access to a loaded collection.
pub struct CollectionGuard<'a, T> {
    guard: MutexGuard<'a, LoadState<T>>,
    store: &'a VersionedRecordStore<T>,
}

impl<'a, T> CollectionGuard<'a, T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn items(&self) -> &[T] {
        match &*self.guard {
            LoadState::Ready(items) => items,
            LoadState::Unloaded => &[],
        }
    }

    /// Saves `next` as the whole collection, then adopts it in memory.
    pub async fn commit(&mut self, next: Vec<T>) -> Result<(), StorageError> {
        let saved = self.store.save(next).await?;
        *self.guard = LoadState::Ready(saved);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[tokio::test]
    async fn first_access_loads_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("n.json");
        std::fs::write(&path, r#"{"version":1,"data":[1,2,3]}"#).unwrap();

        let c: LazyCollection<u32> = LazyCollection::new(&path, 1);
        assert_eq!(c.read(|xs| xs.to_vec()).await, vec![1, 2, 3]);

        // later changes on disk are not re-read
        std::fs::write(&path, r#"{"version":1,"data":[9]}"#).unwrap();
        assert_eq!(c.read(|xs| xs.len()).await, 3);
    }

    #[tokio::test]
    async fn update_none_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("n.json");
        let c: LazyCollection<u32> = LazyCollection::new(&path, 1);

        let out = c.update(|_| None::<()>).await.unwrap();
        assert!(out.is_none());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn failed_update_leaves_memory_unchanged() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("n.json");
        let c: LazyCollection<u32> = LazyCollection::new(&path, 1);
        c.update(|xs| {
            xs.push(1);
            Some(())
        })
        .await
        .unwrap();

        std::fs::create_dir(dir.path().join("n.json.tmp")).unwrap();
        let res = c
            .update(|xs| {
                xs.push(2);
                Some(())
            })
            .await;
        assert!(res.is_err());
        assert_eq!(c.read(|xs| xs.to_vec()).await, vec![1]);
    }

    #[tokio::test]
    async fn stale_temp_is_removed_on_first_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("n.json");
        let tmp = dir.path().join("n.json.tmp");
        std::fs::write(&tmp, "[1").unwrap();

        let c: LazyCollection<u32> = LazyCollection::new(&path, 1);
        assert!(c.read(|xs| xs.is_empty()).await);
        assert!(!tmp.exists());
    }

    #[tokio::test]
    async fn concurrent_updates_are_serialized() {
        let dir = TempDir::new().unwrap();
        let c: Arc<LazyCollection<u32>> = Arc::new(LazyCollection::new(dir.path().join("n.json"), 1));

        let mut handles = Vec::new();
        for i in 0..16u32 {
            let c = c.clone();
            handles.push(tokio::spawn(async move {
                c.update(|xs| {
                    xs.push(i);
                    Some(())
                })
                .await
                .unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        let reloaded: LazyCollection<u32> = LazyCollection::new(dir.path().join("n.json"), 1);
        let mut xs = reloaded.read(|xs| xs.to_vec()).await;
        xs.sort_unstable();
        assert_eq!(xs, (0..16).collect::<Vec<_>>());
    }
}
