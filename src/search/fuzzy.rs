use std::cmp::Ordering;

use serde::Serialize;
use tracing::trace;

use super::catalog::{Catalog, CatalogEntry};
use super::scorer::score;

/// Entries whose best score falls below this are not returned.
pub const MIN_RELEVANCE: f64 = 0.3;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub entry: CatalogEntry,
    pub score: f64,
    pub matched_on: String,
}

/// Typo-tolerant search over an immutable catalog. Pure and lock-free; a
/// linear scan per call.
#[derive(Debug, Clone)]
pub struct FuzzyCatalogSearch {
    catalog: Catalog,
}

impl FuzzyCatalogSearch {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn search(&self, query: &str, max_results: usize) -> Vec<SearchResult> {
        let query = query.trim().to_lowercase();
        if query.is_empty() || max_results == 0 {
            return Vec::new();
        }

        let mut results: Vec<SearchResult> = self
            .catalog
            .entries()
            .iter()
            .filter_map(|entry| {
                let (best, matched_on) = best_match(&query, entry);
                (best >= MIN_RELEVANCE).then(|| SearchResult {
                    entry: entry.clone(),
                    score: best,
                    matched_on: matched_on.to_string(),
                })
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.entry.name.cmp(&b.entry.name))
        });
        results.truncate(max_results);

        trace!(%query, hits = results.len(), "catalog search");
        results
    }
}

/// Best score across the primary name and aliases. The name wins ties.
fn best_match<'a>(query: &str, entry: &'a CatalogEntry) -> (f64, &'a str) {
    std::iter::once(&entry.name)
        .chain(entry.aliases.iter())
        .map(|candidate| (score(query, &candidate.trim().to_lowercase()), candidate.as_str()))
        .fold((f64::MIN, entry.name.as_str()), |best, cur| {
            if cur.0 > best.0 {
                cur
            } else {
                best
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::catalog::FoodCategory;

    fn entry(name: &str, aliases: &[&str]) -> CatalogEntry {
        CatalogEntry {
            name: name.into(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            category: FoodCategory::Other,
            calories_per_100g: 100.0,
            protein_per_100g: 1.0,
            carbs_per_100g: 1.0,
            fat_per_100g: 1.0,
            default_portion_grams: 100.0,
        }
    }

    fn search_over(names: &[&str]) -> FuzzyCatalogSearch {
        FuzzyCatalogSearch::new(Catalog::new(names.iter().map(|n| entry(n, &[])).collect()))
    }

    fn names(results: &[SearchResult]) -> Vec<&str> {
        results.iter().map(|r| r.entry.name.as_str()).collect()
    }

    #[test]
    fn blank_query_returns_nothing() {
        let s = search_over(&["Apple"]);
        assert!(s.search("", 5).is_empty());
        assert!(s.search("   \t", 5).is_empty());
    }

    #[test]
    fn prefix_matches_rank_before_fuzzy_matches() {
        let s = search_over(&["Apricot", "Applesauce", "Apple"]);
        let results = s.search("appl", 5);
        assert_eq!(&names(&results)[..2], &["Apple", "Applesauce"]);
        assert!(results[0].score >= results[1].score);
        if let Some(pos) = names(&results).iter().position(|n| *n == "Apricot") {
            assert_eq!(pos, 2);
        }
    }

    #[test]
    fn query_is_normalised() {
        let s = search_over(&["Apple"]);
        let results = s.search("  APPLE ", 5);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].score, 1.0);
        assert_eq!(results[0].matched_on, "Apple");
    }

    #[test]
    fn alias_can_carry_the_match() {
        let s = FuzzyCatalogSearch::new(Catalog::new(vec![entry("Garbanzo Beans", &["chickpeas"])]));
        let results = s.search("chickpea", 5);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].matched_on, "chickpeas");
        assert!(results[0].score > 0.9);
    }

    #[test]
    fn ties_break_by_name() {
        let s = search_over(&["Pear", "Peach", "Pea"]);
        let results = s.search("zzz", 5);
        assert!(results.is_empty());

        let s = search_over(&["Bcd", "Acd"]);
        let results = s.search("cd", 5);
        assert_eq!(names(&results), vec!["Acd", "Bcd"]);
        assert_eq!(results[0].score, results[1].score);
    }

    #[test]
    fn low_relevance_is_dropped_and_results_truncated() {
        let s = search_over(&["Banana", "Bandana", "Cabana", "Zucchini"]);
        let results = s.search("banana", 2);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].entry.name, "Banana");
        assert!(results.iter().all(|r| r.score >= MIN_RELEVANCE));
        assert!(s.search("banana", 10).iter().all(|r| r.entry.name != "Zucchini"));
        assert!(s.search("banana", 0).is_empty());
    }

    #[test]
    fn typo_finds_builtin_food() {
        let s = FuzzyCatalogSearch::new(Catalog::builtin());
        let results = s.search("brocoli", 3);
        assert_eq!(results.first().map(|r| r.entry.name.as_str()), Some("Broccoli"));
    }
}
