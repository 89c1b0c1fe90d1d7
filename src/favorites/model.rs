use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::search::CatalogEntry;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteEntry {
    pub id: String,
    pub food: CatalogEntry,
    #[serde(with = "time::serde::rfc3339")]
    pub added_at: OffsetDateTime,
    #[serde(default)]
    pub times_used: u32,
}

impl FavoriteEntry {
    /// Favorites are unique per food name, compared case-insensitively.
    pub fn is_food(&self, name: &str) -> bool {
        self.food.name.trim().eq_ignore_ascii_case(name.trim())
    }

    pub fn matches(&self, name_or_id: &str) -> bool {
        self.id == name_or_id || self.is_food(name_or_id)
    }
}
