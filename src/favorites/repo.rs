use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use super::model::FavoriteEntry;
use crate::clock::{Clock, IdGenerator};
use crate::error::StorageError;
use crate::persistence::LazyCollection;
use crate::search::CatalogEntry;

pub const FAVORITES_FILE: &str = "favorites.json";
pub const FAVORITES_VERSION: u32 = 1;

pub struct FavoritesRepository {
    entries: LazyCollection<FavoriteEntry>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl FavoritesRepository {
    pub fn new(data_dir: &Path, clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            entries: LazyCollection::new(data_dir.join(FAVORITES_FILE), FAVORITES_VERSION),
            clock,
            ids,
        }
    }

    /// Adds `food` as a favorite. Returns `None` without writing when a
    /// favorite with the same food name already exists.
    pub async fn upsert(&self, food: CatalogEntry) -> Result<Option<FavoriteEntry>, StorageError> {
        let candidate = FavoriteEntry {
            id: self.ids.next_id(),
            food,
            added_at: self.clock.now(),
            times_used: 0,
        };
        let inserted = self
            .entries
            .update(|xs| {
                if xs.iter().any(|f| f.is_food(&candidate.food.name)) {
                    return None;
                }
                xs.push(candidate.clone());
                Some(candidate)
            })
            .await?;
        if let Some(f) = &inserted {
            debug!(id = %f.id, food = %f.food.name, "favorite added");
        }
        Ok(inserted)
    }

    /// Bumps `times_used` of the favorite matching an id or food name.
    /// Returns `false` without writing when nothing matches.
    pub async fn increment_usage(&self, name_or_id: &str) -> Result<bool, StorageError> {
        let bumped = self
            .entries
            .update(|xs| {
                let fav = xs.iter_mut().find(|f| f.matches(name_or_id))?;
                fav.times_used = fav.times_used.saturating_add(1);
                Some(())
            })
            .await?;
        Ok(bumped.is_some())
    }

    pub async fn remove(&self, id: &str) -> Result<bool, StorageError> {
        let removed = self
            .entries
            .update(|xs| {
                let pos = xs.iter().position(|f| f.id == id)?;
                xs.remove(pos);
                Some(())
            })
            .await?;
        Ok(removed.is_some())
    }

    pub async fn get(&self, name_or_id: &str) -> Option<FavoriteEntry> {
        self.entries
            .read(|xs| xs.iter().find(|f| f.matches(name_or_id)).cloned())
            .await
    }

    /// Most used first, then by food name.
    pub async fn list(&self) -> Vec<FavoriteEntry> {
        let mut out = self.entries.read(|xs| xs.to_vec()).await;
        out.sort_by(|a, b| {
            b.times_used
                .cmp(&a.times_used)
                .then_with(|| a.food.name.cmp(&b.food.name))
        });
        out
    }
}
