use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use super::lookup::{is_valid_barcode, BarcodeLookup};
use super::model::CachedLookup;
use super::repo::BarcodeCacheRepository;
use crate::error::StorageError;
use crate::search::CatalogEntry;

#[derive(Debug, Error)]
pub enum BarcodeError {
    #[error("invalid barcode: {0}")]
    Invalid(String),
    #[error("barcode lookup failed: {0}")]
    Lookup(#[source] anyhow::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupSource {
    Cache,
    Network,
    /// The network failed and an expired cache entry was served instead.
    StaleCache,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarcodeHit {
    pub food: CatalogEntry,
    pub source: LookupSource,
}

type InFlight = Arc<OnceCell<Option<CatalogEntry>>>;

/// Cache-first barcode resolution.
///
/// The cache lock is never held while the remote lookup runs. Concurrent
/// scans of the same uncached barcode share a single remote request.
pub struct BarcodeService {
    cache: Arc<BarcodeCacheRepository>,
    lookup: Arc<dyn BarcodeLookup>,
    in_flight: Mutex<HashMap<String, InFlight>>,
}

impl BarcodeService {
    pub fn new(cache: Arc<BarcodeCacheRepository>, lookup: Arc<dyn BarcodeLookup>) -> Self {
        Self {
            cache,
            lookup,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub fn cache(&self) -> &BarcodeCacheRepository {
        &self.cache
    }

    pub async fn scan(&self, barcode: &str) -> Result<Option<BarcodeHit>, BarcodeError> {
        let code = barcode.trim();
        if !is_valid_barcode(code) {
            return Err(BarcodeError::Invalid(code.to_string()));
        }

        let cached = self.cache.get(code).await;
        if let Some(hit) = cached.as_ref().filter(|c| !c.stale) {
            self.cache.record_scan(code).await?;
            debug!(%code, "barcode served from cache");
            return Ok(Some(BarcodeHit {
                food: hit.entry.payload.clone(),
                source: LookupSource::Cache,
            }));
        }

        let slot = self.join_in_flight(code);
        let fetched = slot
            .cell
            .get_or_try_init(|| self.lookup.lookup(code))
            .await
            .cloned();
        self.settle(code, fetched, cached).await
    }

    async fn settle(
        &self,
        code: &str,
        fetched: anyhow::Result<Option<CatalogEntry>>,
        cached: Option<CachedLookup>,
    ) -> Result<Option<BarcodeHit>, BarcodeError> {
        match fetched {
            Ok(Some(food)) => {
                let stored = self.cache.record_lookup(code, food).await?;
                Ok(Some(BarcodeHit {
                    food: stored.payload,
                    source: LookupSource::Network,
                }))
            }
            Ok(None) => match cached {
                Some(stale) => {
                    debug!(%code, "barcode unknown upstream; serving stale cache entry");
                    self.serve_stale(code, stale).await
                }
                None => Ok(None),
            },
            Err(e) => match cached {
                Some(stale) => {
                    warn!(%code, error = %e, "barcode lookup failed; serving stale cache entry");
                    self.serve_stale(code, stale).await
                }
                None => Err(BarcodeError::Lookup(e)),
            },
        }
    }

    async fn serve_stale(
        &self,
        code: &str,
        stale: CachedLookup,
    ) -> Result<Option<BarcodeHit>, BarcodeError> {
        self.cache.record_scan(code).await?;
        Ok(Some(BarcodeHit {
            food: stale.entry.payload,
            source: LookupSource::StaleCache,
        }))
    }

    /// Shared slot for the remote result of `code`. Stays registered until the
    /// returned guard drops, so late scans reuse it instead of issuing a
    /// request.
    fn join_in_flight(&self, code: &str) -> InFlightSlot<'_> {
        let mut map = self.in_flight.lock().unwrap_or_else(|p| p.into_inner());
        let cell = map.entry(code.to_string()).or_default().clone();
        InFlightSlot {
            map: &self.in_flight,
            code: code.to_string(),
            cell,
        }
    }
}

/// Unregisters its slot when dropped, including when the scan is cancelled.
struct InFlightSlot<'a> {
    map: &'a Mutex<HashMap<String, InFlight>>,
    code: String,
    cell: InFlight,
}

impl Drop for InFlightSlot<'_> {
    fn drop(&mut self) {
        let mut map = self.map.lock().unwrap_or_else(|p| p.into_inner());
        if map.get(&self.code).is_some_and(|c| Arc::ptr_eq(c, &self.cell)) {
            map.remove(&self.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::barcode::lookup::OfflineLookup;
    use crate::barcode::model::DEFAULT_TTL;
    use crate::clock::FixedClock;
    use crate::search::Catalog;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;
    use time::macros::datetime;
    use time::Duration;

    struct CountingLookup {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingLookup {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail,
            }
        }
    }

    #[async_trait]
    impl BarcodeLookup for CountingLookup {
        async fn lookup(&self, _barcode: &str) -> anyhow::Result<Option<CatalogEntry>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            if self.fail {
                anyhow::bail!("network down");
            }
            Ok(Catalog::builtin().find("greek yogurt").cloned())
        }
    }

    fn service(dir: &TempDir, lookup: Arc<dyn BarcodeLookup>) -> (Arc<FixedClock>, BarcodeService) {
        let clock = Arc::new(FixedClock::new(datetime!(2024-05-01 12:00 UTC)));
        let cache = Arc::new(BarcodeCacheRepository::new(dir.path(), clock.clone(), DEFAULT_TTL));
        (clock, BarcodeService::new(cache, lookup))
    }

    #[tokio::test]
    async fn miss_then_hit() {
        let dir = TempDir::new().unwrap();
        let lookup = Arc::new(CountingLookup::new(false));
        let (_, svc) = service(&dir, lookup.clone());

        let first = svc.scan("4006381333931").await.unwrap().unwrap();
        assert_eq!(first.source, LookupSource::Network);
        assert_eq!(first.food.name, "Greek Yogurt");

        let second = svc.scan(" 4006381333931 ").await.unwrap().unwrap();
        assert_eq!(second.source, LookupSource::Cache);
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 1);

        let stats = svc.cache().stats().await;
        assert_eq!(stats.total_scans, 2);
    }

    #[tokio::test]
    async fn concurrent_misses_share_one_lookup() {
        let dir = TempDir::new().unwrap();
        let lookup = Arc::new(CountingLookup::new(false));
        let (_, svc) = service(&dir, lookup.clone());
        let svc = Arc::new(svc);

        let mut handles = Vec::new();
        for _ in 0..4 {
            let svc = svc.clone();
            handles.push(tokio::spawn(async move { svc.scan("036000291452").await.unwrap() }));
        }
        for h in handles {
            assert!(h.await.unwrap().is_some());
        }

        assert_eq!(lookup.calls.load(Ordering::SeqCst), 1);
        let entry = svc.cache().get("036000291452").await.unwrap().entry;
        assert_eq!(entry.scanned_count, 4);
    }

    #[tokio::test]
    async fn stale_entry_is_refetched_and_served_when_network_fails() {
        let dir = TempDir::new().unwrap();
        let (clock, svc) = service(&dir, Arc::new(CountingLookup::new(false)));
        svc.scan("96385074").await.unwrap();
        clock.advance(Duration::days(45));

        let failing = Arc::new(CountingLookup::new(true));
        let cache = Arc::new(BarcodeCacheRepository::new(dir.path(), clock.clone(), DEFAULT_TTL));
        let svc = BarcodeService::new(cache, failing.clone());
        let hit = svc.scan("96385074").await.unwrap().unwrap();
        assert_eq!(hit.source, LookupSource::StaleCache);
        assert_eq!(failing.calls.load(Ordering::SeqCst), 1);
    }

    /// Completes one lookup per permit handed to `gate`.
    struct GatedLookup {
        calls: AtomicUsize,
        gate: tokio::sync::Semaphore,
    }

    #[async_trait]
    impl BarcodeLookup for GatedLookup {
        async fn lookup(&self, _barcode: &str) -> anyhow::Result<Option<CatalogEntry>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.gate.acquire().await?.forget();
            Ok(Catalog::builtin().find("milk").cloned())
        }
    }

    #[tokio::test]
    async fn cancelled_scan_releases_its_in_flight_slot() {
        let dir = TempDir::new().unwrap();
        let lookup = Arc::new(GatedLookup {
            calls: AtomicUsize::new(0),
            gate: tokio::sync::Semaphore::new(0),
        });
        let (clock, svc) = service(&dir, lookup.clone());
        let svc = Arc::new(svc);

        let scan = {
            let svc = svc.clone();
            tokio::spawn(async move { svc.scan("50000159").await })
        };
        while lookup.calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        // the lookup finishes while the cache is locked, so the scan stalls
        // after the shared result is filled in
        let held = svc.cache().collection().lock().await;
        lookup.gate.add_permits(1);
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        scan.abort();
        assert!(scan.await.unwrap_err().is_cancelled());
        drop(held);

        assert!(svc.in_flight.lock().unwrap().is_empty());
        assert!(svc.cache().get("50000159").await.is_none());

        clock.advance(Duration::days(90));
        lookup.gate.add_permits(1);
        let hit = svc.scan("50000159").await.unwrap().unwrap();
        assert_eq!(hit.source, LookupSource::Network);
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 2);
        assert!(svc.in_flight.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn stale_entry_is_served_when_barcode_is_unknown_upstream() {
        let dir = TempDir::new().unwrap();
        let (clock, svc) = service(&dir, Arc::new(CountingLookup::new(false)));
        svc.scan("96385074").await.unwrap();
        clock.advance(Duration::days(45));

        let cache = Arc::new(BarcodeCacheRepository::new(dir.path(), clock.clone(), DEFAULT_TTL));
        let svc = BarcodeService::new(cache, Arc::new(OfflineLookup));
        let hit = svc.scan("96385074").await.unwrap().unwrap();
        assert_eq!(hit.source, LookupSource::StaleCache);
        assert_eq!(hit.food.name, "Greek Yogurt");

        let entry = svc.cache().get("96385074").await.unwrap();
        assert!(entry.stale);
        assert_eq!(entry.entry.scanned_count, 2);
    }

    #[tokio::test]
    async fn errors_are_typed() {
        let dir = TempDir::new().unwrap();
        let (_, svc) = service(&dir, Arc::new(CountingLookup::new(true)));
        assert!(matches!(svc.scan("abc").await, Err(BarcodeError::Invalid(_))));
        assert!(matches!(svc.scan("12345678").await, Err(BarcodeError::Lookup(_))));

        let (_, offline) = service(&dir, Arc::new(OfflineLookup));
        assert!(offline.scan("12345678").await.unwrap().is_none());
        assert!(offline.cache().get("12345678").await.is_none());
    }
}
