pub mod archive;
mod dto;
pub mod handlers;
pub mod model;
pub mod repo;

pub use archive::ArchiveRepository;
pub use model::{DailyTotals, LogChanged, LogEntry, Meal, NewLogEntry};
pub use repo::FoodLogRepository;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::read_routes())
        .merge(handlers::write_routes())
}
