use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;

use super::SearchResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub limit: Option<usize>,
}

pub fn search_routes() -> Router<AppState> {
    Router::new().route("/foods/search", get(search_foods))
}

#[instrument(skip(state))]
pub async fn search_foods(
    State(state): State<AppState>,
    Query(p): Query<SearchQuery>,
) -> Json<Vec<SearchResult>> {
    let limit = p.limit.unwrap_or(state.config.search_max_results);
    Json(state.search.search(&p.q, limit))
}
