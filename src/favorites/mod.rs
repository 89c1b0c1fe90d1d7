pub mod handlers;
pub mod model;
pub mod repo;

pub use model::FavoriteEntry;
pub use repo::FavoritesRepository;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::favorites_routes()
}
