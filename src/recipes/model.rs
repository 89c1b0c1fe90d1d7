use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::search::{CatalogEntry, Nutrients};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeIngredient {
    pub food_name: String,
    pub grams: f64,
    pub calories: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub fat: f64,
}

impl RecipeIngredient {
    pub fn from_food(food: &CatalogEntry, grams: f64) -> Self {
        let n = food.nutrients_for(grams);
        Self {
            food_name: food.name.clone(),
            grams,
            calories: n.calories,
            protein: n.protein,
            carbs: n.carbs,
            fat: n.fat,
        }
    }

    pub fn nutrients(&self) -> Nutrients {
        Nutrients {
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fat: self.fat,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub ingredients: Vec<RecipeIngredient>,
    #[serde(default)]
    pub description: String,
    pub servings: u32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default)]
    pub times_used: u32,
}

impl RecipeEntry {
    pub fn has_name(&self, name: &str) -> bool {
        self.name.trim().eq_ignore_ascii_case(name.trim())
    }

    pub fn total(&self) -> Nutrients {
        let mut total = Nutrients::default();
        for i in &self.ingredients {
            total += i.nutrients();
        }
        total
    }

    /// Totals divided by servings; zero servings counts as one.
    pub fn per_serving(&self) -> Nutrients {
        self.total().scaled(1.0 / f64::from(self.servings.max(1)))
    }
}

/// The caller-editable part of a recipe.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDraft {
    pub name: String,
    #[serde(default)]
    pub ingredients: Vec<RecipeIngredient>,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_servings")]
    pub servings: u32,
}

fn default_servings() -> u32 {
    1
}
