use std::path::Path;
use std::sync::Arc;

use time::Duration;
use tracing::{debug, info};

use super::model::{CacheEntry, CacheStats, CachedLookup};
use crate::clock::Clock;
use crate::error::StorageError;
use crate::persistence::LazyCollection;
use crate::search::CatalogEntry;

pub const BARCODE_CACHE_FILE: &str = "barcode_cache.json";
pub const BARCODE_CACHE_VERSION: u32 = 1;

/// Persisted results of barcode lookups with a soft TTL and scan counters.
pub struct BarcodeCacheRepository {
    entries: LazyCollection<CacheEntry>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl BarcodeCacheRepository {
    pub fn new(data_dir: &Path, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            entries: LazyCollection::new(data_dir.join(BARCODE_CACHE_FILE), BARCODE_CACHE_VERSION),
            clock,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    #[cfg(test)]
    pub(crate) fn collection(&self) -> &LazyCollection<CacheEntry> {
        &self.entries
    }

    /// Cached entry for `key`; stale entries are still returned, flagged.
    pub async fn get(&self, key: &str) -> Option<CachedLookup> {
        let now = self.clock.now();
        self.entries
            .read(|xs| {
                xs.iter().find(|e| e.key == key).map(|e| CachedLookup {
                    stale: e.is_stale(now, self.ttl),
                    entry: e.clone(),
                })
            })
            .await
    }

    /// Stores `payload` under `key`, resetting its age. Scan statistics of an
    /// existing entry are kept.
    pub async fn put(&self, key: &str, payload: CatalogEntry) -> Result<CacheEntry, StorageError> {
        let now = self.clock.now();
        let mut guard = self.entries.lock().await;
        let mut next = guard.items().to_vec();

        let entry = match next.iter_mut().find(|e| e.key == key) {
            Some(existing) => {
                existing.payload = payload;
                existing.cached_at = now;
                existing.clone()
            }
            None => {
                let fresh = CacheEntry {
                    key: key.to_string(),
                    payload,
                    cached_at: now,
                    scanned_count: 0,
                    last_scanned_at: now,
                };
                next.push(fresh.clone());
                fresh
            }
        };

        guard.commit(next).await?;
        debug!(%key, "barcode cached");
        Ok(entry)
    }

    /// Counts one scan of `key`. Returns `false` when `key` is not cached.
    pub async fn record_scan(&self, key: &str) -> Result<bool, StorageError> {
        let now = self.clock.now();
        let hit = self
            .entries
            .update(|xs| {
                let e = xs.iter_mut().find(|e| e.key == key)?;
                e.scanned_count = e.scanned_count.saturating_add(1);
                e.last_scanned_at = now;
                Some(())
            })
            .await?;
        Ok(hit.is_some())
    }

    /// Records a completed lookup: a fresh entry only gets its scan counted,
    /// anything else is (re)cached with the new payload and counted.
    pub async fn record_lookup(
        &self,
        key: &str,
        payload: CatalogEntry,
    ) -> Result<CacheEntry, StorageError> {
        let now = self.clock.now();
        let ttl = self.ttl;
        let mut guard = self.entries.lock().await;
        let mut next = guard.items().to_vec();

        let entry = match next.iter_mut().find(|e| e.key == key) {
            Some(existing) => {
                if existing.is_stale(now, ttl) {
                    existing.payload = payload;
                    existing.cached_at = now;
                }
                existing.scanned_count = existing.scanned_count.saturating_add(1);
                existing.last_scanned_at = now;
                existing.clone()
            }
            None => {
                let fresh = CacheEntry {
                    key: key.to_string(),
                    payload,
                    cached_at: now,
                    scanned_count: 1,
                    last_scanned_at: now,
                };
                next.push(fresh.clone());
                fresh
            }
        };

        guard.commit(next).await?;
        Ok(entry)
    }

    /// Drops every stale entry and returns how many went.
    pub async fn purge_stale(&self) -> Result<usize, StorageError> {
        let now = self.clock.now();
        let ttl = self.ttl;
        let purged = self
            .entries
            .update(|xs| {
                let before = xs.len();
                xs.retain(|e| !e.is_stale(now, ttl));
                let purged = before - xs.len();
                (purged > 0).then_some(purged)
            })
            .await?
            .unwrap_or(0);
        if purged > 0 {
            info!(purged, "stale barcode cache entries removed");
        }
        Ok(purged)
    }

    pub async fn stats(&self) -> CacheStats {
        let now = self.clock.now();
        self.entries
            .read(|xs| CacheStats {
                entries: xs.len(),
                stale_entries: xs.iter().filter(|e| e.is_stale(now, self.ttl)).count(),
                total_scans: xs.iter().map(|e| u64::from(e.scanned_count)).sum(),
            })
            .await
    }
}
