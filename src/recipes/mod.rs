pub mod handlers;
pub mod model;
pub mod repo;

pub use model::{RecipeDraft, RecipeEntry, RecipeIngredient};
pub use repo::RecipeRepository;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::recipe_routes()
}
