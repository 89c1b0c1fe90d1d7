use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use super::model::{RecipeDraft, RecipeEntry};
use crate::clock::{Clock, IdGenerator};
use crate::error::StorageError;
use crate::persistence::LazyCollection;

pub const RECIPES_FILE: &str = "recipes.json";
pub const RECIPES_VERSION: u32 = 1;

pub struct RecipeRepository {
    entries: LazyCollection<RecipeEntry>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl RecipeRepository {
    pub fn new(data_dir: &Path, clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            entries: LazyCollection::new(data_dir.join(RECIPES_FILE), RECIPES_VERSION),
            clock,
            ids,
        }
    }

    /// Inserts `draft`, or overwrites ingredients, description and servings of
    /// the recipe with the same name. Id, creation time and usage count of an
    /// existing recipe are preserved.
    pub async fn upsert(&self, draft: RecipeDraft) -> Result<RecipeEntry, StorageError> {
        let mut guard = self.entries.lock().await;
        let mut next = guard.items().to_vec();

        let stored = match next.iter_mut().find(|r| r.has_name(&draft.name)) {
            Some(existing) => {
                existing.ingredients = draft.ingredients;
                existing.description = draft.description;
                existing.servings = draft.servings;
                existing.clone()
            }
            None => {
                let created = RecipeEntry {
                    id: self.ids.next_id(),
                    name: draft.name.trim().to_string(),
                    ingredients: draft.ingredients,
                    description: draft.description,
                    servings: draft.servings,
                    created_at: self.clock.now(),
                    times_used: 0,
                };
                next.push(created.clone());
                created
            }
        };

        guard.commit(next).await?;
        debug!(id = %stored.id, name = %stored.name, "recipe saved");
        Ok(stored)
    }

    pub async fn increment_usage(&self, name_or_id: &str) -> Result<bool, StorageError> {
        let bumped = self
            .entries
            .update(|xs| {
                let r = xs
                    .iter_mut()
                    .find(|r| r.id == name_or_id || r.has_name(name_or_id))?;
                r.times_used = r.times_used.saturating_add(1);
                Some(())
            })
            .await?;
        Ok(bumped.is_some())
    }

    pub async fn delete(&self, id: &str) -> Result<bool, StorageError> {
        let removed = self
            .entries
            .update(|xs| {
                let pos = xs.iter().position(|r| r.id == id)?;
                xs.remove(pos);
                Some(())
            })
            .await?;
        Ok(removed.is_some())
    }

    pub async fn get_by_name(&self, name: &str) -> Option<RecipeEntry> {
        self.entries
            .read(|xs| xs.iter().find(|r| r.has_name(name)).cloned())
            .await
    }

    pub async fn list(&self) -> Vec<RecipeEntry> {
        let mut out = self.entries.read(|xs| xs.to_vec()).await;
        out.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        out
    }
}
