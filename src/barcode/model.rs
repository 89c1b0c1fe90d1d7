use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::search::CatalogEntry;

/// Cached lookups older than this are served but flagged stale and refetched.
pub const DEFAULT_TTL: Duration = Duration::days(30);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub key: String,
    pub payload: CatalogEntry,
    #[serde(with = "time::serde::rfc3339")]
    pub cached_at: OffsetDateTime,
    #[serde(default)]
    pub scanned_count: u32,
    #[serde(with = "time::serde::rfc3339")]
    pub last_scanned_at: OffsetDateTime,
}

impl CacheEntry {
    pub fn is_stale(&self, now: OffsetDateTime, ttl: Duration) -> bool {
        now - self.cached_at > ttl
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedLookup {
    pub entry: CacheEntry,
    pub stale: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub entries: usize,
    pub stale_entries: usize,
    pub total_scans: u64,
}
