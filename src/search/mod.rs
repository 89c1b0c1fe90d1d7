pub mod catalog;
mod fuzzy;
pub mod handlers;
pub mod scorer;

pub use catalog::{Catalog, CatalogEntry, FoodCategory, Nutrients};
pub use fuzzy::{FuzzyCatalogSearch, SearchResult, MIN_RELEVANCE};

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::search_routes()
}
