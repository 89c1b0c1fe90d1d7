use std::sync::Arc;

use crate::barcode::{BarcodeCacheRepository, BarcodeLookup, BarcodeService, OfflineLookup};
use crate::clock::{Clock, IdGenerator, SystemClock, UuidIdGenerator};
use crate::config::AppConfig;
use crate::favorites::FavoritesRepository;
use crate::food_log::{ArchiveRepository, FoodLogRepository};
use crate::recipes::RecipeRepository;
use crate::search::{Catalog, FuzzyCatalogSearch};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub search: Arc<FuzzyCatalogSearch>,
    pub food_log: Arc<FoodLogRepository>,
    pub favorites: Arc<FavoritesRepository>,
    pub recipes: Arc<RecipeRepository>,
    pub barcodes: Arc<BarcodeService>,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        Ok(Self::from_parts(
            config,
            Catalog::builtin(),
            Arc::new(SystemClock),
            Arc::new(UuidIdGenerator),
            Arc::new(OfflineLookup),
        ))
    }

    /// Wires every repository under `config.data_dir`. Nothing touches the
    /// disk until a repository is first used.
    pub fn from_parts(
        config: Arc<AppConfig>,
        catalog: Catalog,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
        lookup: Arc<dyn BarcodeLookup>,
    ) -> Self {
        let dir = config.data_dir.as_path();
        let archive = Arc::new(ArchiveRepository::new(dir));
        let food_log = Arc::new(FoodLogRepository::new(dir, archive, clock.clone(), ids.clone()));
        let favorites = Arc::new(FavoritesRepository::new(dir, clock.clone(), ids.clone()));
        let recipes = Arc::new(RecipeRepository::new(dir, clock.clone(), ids));
        let ttl = time::Duration::days(config.barcode_cache_ttl_days.max(0));
        let cache = Arc::new(BarcodeCacheRepository::new(dir, clock, ttl));
        let barcodes = Arc::new(BarcodeService::new(cache, lookup));

        Self {
            search: Arc::new(FuzzyCatalogSearch::new(catalog)),
            food_log,
            favorites,
            recipes,
            barcodes,
            config,
        }
    }

    pub fn fake(data_dir: &std::path::Path) -> Self {
        Self::from_parts(
            Arc::new(AppConfig::for_data_dir(data_dir)),
            Catalog::builtin(),
            Arc::new(SystemClock),
            Arc::new(UuidIdGenerator),
            Arc::new(OfflineLookup),
        )
    }
}
