pub mod handlers;
pub mod lookup;
pub mod model;
pub mod repo;
pub mod service;

pub use lookup::{BarcodeLookup, OfflineLookup};
pub use model::{CacheEntry, CacheStats, CachedLookup, DEFAULT_TTL};
pub use repo::BarcodeCacheRepository;
pub use service::{BarcodeError, BarcodeHit, BarcodeService, LookupSource};

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::barcode_routes()
}
