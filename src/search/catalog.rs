use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoodCategory {
    Fruit,
    Vegetable,
    Grain,
    Protein,
    Dairy,
    Legume,
    NutSeed,
    Fat,
    Beverage,
    Snack,
    Prepared,
    Other,
}

/// A food with macros per 100 g. Also used as the snapshot stored inside
/// favorites and barcode cache entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub category: FoodCategory,
    pub calories_per_100g: f64,
    pub protein_per_100g: f64,
    pub carbs_per_100g: f64,
    pub fat_per_100g: f64,
    pub default_portion_grams: f64,
}

/// Macro totals for a concrete amount of food.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutrients {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl std::ops::AddAssign for Nutrients {
    fn add_assign(&mut self, rhs: Self) {
        self.calories += rhs.calories;
        self.protein += rhs.protein;
        self.carbs += rhs.carbs;
        self.fat += rhs.fat;
    }
}

impl Nutrients {
    pub fn scaled(self, factor: f64) -> Self {
        Self {
            calories: self.calories * factor,
            protein: self.protein * factor,
            carbs: self.carbs * factor,
            fat: self.fat * factor,
        }
    }
}

impl CatalogEntry {
    pub fn nutrients_for(&self, grams: f64) -> Nutrients {
        Nutrients {
            calories: self.calories_per_100g,
            protein: self.protein_per_100g,
            carbs: self.carbs_per_100g,
            fat: self.fat_per_100g,
        }
        .scaled(grams.max(0.0) / 100.0)
    }

    pub fn default_portion(&self) -> Nutrients {
        self.nutrients_for(self.default_portion_grams)
    }
}

#[allow(clippy::too_many_arguments)]
fn food(
    name: &str,
    aliases: &[&str],
    category: FoodCategory,
    kcal: f64,
    protein: f64,
    carbs: f64,
    fat: f64,
    portion: f64,
) -> CatalogEntry {
    CatalogEntry {
        name: name.to_string(),
        aliases: aliases.iter().map(|a| a.to_string()).collect(),
        category,
        calories_per_100g: kcal,
        protein_per_100g: protein,
        carbs_per_100g: carbs,
        fat_per_100g: fat,
        default_portion_grams: portion,
    }
}

lazy_static! {
    static ref BUILTIN: Vec<CatalogEntry> = {
        use FoodCategory::*;
        vec![
            food("Apple", &["red apple", "green apple"], Fruit, 52.0, 0.3, 14.0, 0.2, 182.0),
            food("Applesauce", &["apple puree"], Fruit, 68.0, 0.2, 17.0, 0.2, 122.0),
            food("Apricot", &[], Fruit, 48.0, 1.4, 11.0, 0.4, 35.0),
            food("Avocado", &["avo"], Fruit, 160.0, 2.0, 8.5, 14.7, 150.0),
            food("Banana", &[], Fruit, 89.0, 1.1, 22.8, 0.3, 118.0),
            food("Blueberries", &["blueberry"], Fruit, 57.0, 0.7, 14.5, 0.3, 148.0),
            food("Orange", &["navel orange"], Fruit, 47.0, 0.9, 11.8, 0.1, 131.0),
            food("Strawberries", &["strawberry"], Fruit, 32.0, 0.7, 7.7, 0.3, 152.0),
            food("Broccoli", &[], Vegetable, 34.0, 2.8, 6.6, 0.4, 91.0),
            food("Carrot", &["carrots"], Vegetable, 41.0, 0.9, 9.6, 0.2, 61.0),
            food("Spinach", &["baby spinach"], Vegetable, 23.0, 2.9, 3.6, 0.4, 30.0),
            food("Sweet Potato", &["yam"], Vegetable, 86.0, 1.6, 20.1, 0.1, 130.0),
            food("Tomato", &["tomatoes"], Vegetable, 18.0, 0.9, 3.9, 0.2, 123.0),
            food("Potato", &["white potato"], Vegetable, 77.0, 2.0, 17.5, 0.1, 173.0),
            food("White Rice", &["rice", "cooked rice"], Grain, 130.0, 2.7, 28.2, 0.3, 158.0),
            food("Brown Rice", &[], Grain, 112.0, 2.3, 23.5, 0.8, 195.0),
            food("Oatmeal", &["oats", "porridge", "rolled oats"], Grain, 68.0, 2.4, 12.0, 1.4, 234.0),
            food("Whole Wheat Bread", &["wholemeal bread", "bread"], Grain, 247.0, 13.0, 41.0, 3.4, 32.0),
            food("Pasta", &["spaghetti", "penne"], Grain, 131.0, 5.0, 25.0, 1.1, 140.0),
            food("Quinoa", &[], Grain, 120.0, 4.4, 21.3, 1.9, 185.0),
            food("Chicken Breast", &["chicken", "grilled chicken"], Protein, 165.0, 31.0, 0.0, 3.6, 120.0),
            food("Salmon", &["atlantic salmon"], Protein, 208.0, 20.0, 0.0, 13.0, 154.0),
            food("Tuna", &["canned tuna"], Protein, 132.0, 28.0, 0.0, 1.3, 142.0),
            food("Egg", &["eggs", "boiled egg"], Protein, 155.0, 13.0, 1.1, 11.0, 50.0),
            food("Ground Beef", &["minced beef", "beef"], Protein, 250.0, 26.0, 0.0, 15.0, 113.0),
            food("Tofu", &["bean curd"], Protein, 76.0, 8.0, 1.9, 4.8, 126.0),
            food("Greek Yogurt", &["yoghurt", "yogurt"], Dairy, 59.0, 10.0, 3.6, 0.4, 170.0),
            food("Milk", &["whole milk"], Dairy, 61.0, 3.2, 4.8, 3.3, 244.0),
            food("Cheddar Cheese", &["cheddar", "cheese"], Dairy, 403.0, 25.0, 1.3, 33.0, 28.0),
            food("Cottage Cheese", &[], Dairy, 98.0, 11.0, 3.4, 4.3, 113.0),
            food("Lentils", &["lentil"], Legume, 116.0, 9.0, 20.0, 0.4, 198.0),
            food("Chickpeas", &["garbanzo beans", "chickpea"], Legume, 164.0, 8.9, 27.4, 2.6, 164.0),
            food("Black Beans", &[], Legume, 132.0, 8.9, 23.7, 0.5, 172.0),
            food("Almonds", &["almond"], NutSeed, 579.0, 21.0, 22.0, 50.0, 28.0),
            food("Peanut Butter", &["pb"], NutSeed, 588.0, 25.0, 20.0, 50.0, 32.0),
            food("Walnuts", &["walnut"], NutSeed, 654.0, 15.0, 14.0, 65.0, 28.0),
            food("Olive Oil", &["evoo"], Fat, 884.0, 0.0, 0.0, 100.0, 14.0),
            food("Butter", &[], Fat, 717.0, 0.9, 0.1, 81.0, 14.0),
            food("Orange Juice", &["oj"], Beverage, 45.0, 0.7, 10.4, 0.2, 248.0),
            food("Coffee", &["black coffee"], Beverage, 1.0, 0.1, 0.0, 0.0, 240.0),
            food("Dark Chocolate", &["chocolate"], Snack, 546.0, 4.9, 61.0, 31.0, 28.0),
            food("Potato Chips", &["crisps", "chips"], Snack, 536.0, 7.0, 53.0, 35.0, 28.0),
            food("Pizza", &["cheese pizza"], Prepared, 266.0, 11.0, 33.0, 10.0, 107.0),
            food("Hamburger", &["burger", "cheeseburger"], Prepared, 295.0, 17.0, 24.0, 14.0, 226.0),
        ]
    };
}

/// Immutable set of foods the search runs over.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn builtin() -> Self {
        Self::new(BUILTIN.clone())
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Case-insensitive lookup by primary name or alias.
    pub fn find(&self, name: &str) -> Option<&CatalogEntry> {
        let needle = name.trim().to_lowercase();
        self.entries.iter().find(|e| {
            e.name.to_lowercase() == needle || e.aliases.iter().any(|a| a.to_lowercase() == needle)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_is_well_formed() {
        let catalog = Catalog::builtin();
        assert!(catalog.len() > 30);
        for e in catalog.entries() {
            assert!(!e.name.trim().is_empty());
            assert!(e.calories_per_100g >= 0.0, "{}", e.name);
            assert!(e.default_portion_grams > 0.0, "{}", e.name);
        }
    }

    #[test]
    fn find_matches_alias_case_insensitively() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.find("  OATS ").map(|e| e.name.as_str()), Some("Oatmeal"));
        assert_eq!(catalog.find("banana").map(|e| e.name.as_str()), Some("Banana"));
        assert!(catalog.find("dragonfruit").is_none());
    }

    #[test]
    fn nutrients_scale_with_grams() {
        let catalog = Catalog::builtin();
        let chicken = catalog.find("chicken breast").unwrap();
        let n = chicken.nutrients_for(200.0);
        assert!((n.calories - 330.0).abs() < 1e-9);
        assert!((n.protein - 62.0).abs() < 1e-9);
        assert_eq!(chicken.nutrients_for(-5.0), Nutrients::default());
    }
}
