use serde::{Deserialize, Serialize};
use time::Date;

use crate::search::{CatalogEntry, Nutrients};

/// Meal slot; declaration order is the display order within a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Meal {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: String,
    pub date: Date,
    pub meal: Meal,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub food_name: String,
}

impl LogEntry {
    pub fn nutrients(&self) -> Nutrients {
        Nutrients {
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fat: self.fat,
        }
    }
}

/// A log entry as submitted by a caller. Without an `id` the repository
/// assigns one.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLogEntry {
    #[serde(default)]
    pub id: Option<String>,
    pub date: Date,
    pub meal: Meal,
    pub calories: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub fat: f64,
    pub food_name: String,
}

impl NewLogEntry {
    pub fn from_food(food: &CatalogEntry, grams: f64, date: Date, meal: Meal) -> Self {
        let n = food.nutrients_for(grams);
        Self {
            id: None,
            date,
            meal,
            calories: n.calories,
            protein: n.protein,
            carbs: n.carbs,
            fat: n.fat,
            food_name: food.name.clone(),
        }
    }

    pub(crate) fn into_entry(self, id: String) -> LogEntry {
        LogEntry {
            id,
            date: self.date,
            meal: self.meal,
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fat: self.fat,
            food_name: self.food_name,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyTotals {
    pub date: Option<Date>,
    pub entries: usize,
    #[serde(flatten)]
    pub nutrients: Nutrients,
}

/// Fired after every successful change to the active food log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogChanged;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::Catalog;
    use time::macros::date;

    #[test]
    fn meals_order_through_the_day() {
        let mut meals = vec![Meal::Snack, Meal::Dinner, Meal::Breakfast, Meal::Lunch];
        meals.sort();
        assert_eq!(meals, vec![Meal::Breakfast, Meal::Lunch, Meal::Dinner, Meal::Snack]);
    }

    #[test]
    fn entry_serializes_with_iso_date() {
        let e = NewLogEntry {
            id: None,
            date: date!(2024 - 06 - 01),
            meal: Meal::Lunch,
            calories: 200.0,
            protein: 10.0,
            carbs: 20.0,
            fat: 5.0,
            food_name: "Soup".into(),
        }
        .into_entry("e1".into());
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["date"], "2024-06-01");
        assert_eq!(json["meal"], "lunch");
        assert_eq!(json["foodName"], "Soup");
    }

    #[test]
    fn new_entry_from_food_scales_macros() {
        let catalog = Catalog::builtin();
        let rice = catalog.find("white rice").unwrap();
        let e = NewLogEntry::from_food(rice, 50.0, date!(2024 - 01 - 01), Meal::Dinner);
        assert!((e.calories - 65.0).abs() < 1e-9);
        assert_eq!(e.food_name, "White Rice");
        assert!(e.id.is_none());
    }
}
