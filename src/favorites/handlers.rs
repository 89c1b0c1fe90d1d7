use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{error, instrument, warn};

use super::model::FavoriteEntry;
use crate::{error::ApiError, search::CatalogEntry, state::AppState};

/// Either a catalog food name or a full food snapshot.
#[derive(Debug, Deserialize)]
pub struct AddFavoriteRequest {
    pub name: Option<String>,
    pub food: Option<CatalogEntry>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddFavoriteResponse {
    pub added: bool,
    pub favorite: Option<FavoriteEntry>,
}

#[derive(Debug, Serialize)]
pub struct ChangedResponse {
    pub changed: bool,
}

pub fn favorites_routes() -> Router<AppState> {
    Router::new()
        .route("/favorites", get(list_favorites).post(add_favorite))
        .route("/favorites/:key/use", post(use_favorite))
        .route("/favorites/:key", delete(remove_favorite))
}

fn storage_failure(e: crate::error::StorageError) -> (StatusCode, String) {
    error!(error = %e, "favorites write failed");
    ApiError::from(e).into()
}

#[instrument(skip(state))]
pub async fn list_favorites(State(state): State<AppState>) -> Json<Vec<FavoriteEntry>> {
    Json(state.favorites.list().await)
}

#[instrument(skip(state, payload))]
pub async fn add_favorite(
    State(state): State<AppState>,
    Json(payload): Json<AddFavoriteRequest>,
) -> Result<Json<AddFavoriteResponse>, (StatusCode, String)> {
    let food = match (payload.food, payload.name) {
        (Some(food), _) => food,
        (None, Some(name)) => match state.search.catalog().find(&name) {
            Some(food) => food.clone(),
            None => {
                warn!(%name, "favorite for unknown food");
                return Err(ApiError::NotFound(format!("Unknown food: {name}")).into());
            }
        },
        (None, None) => return Err(ApiError::BadRequest("name or food is required".into()).into()),
    };

    let inserted = state.favorites.upsert(food).await.map_err(storage_failure)?;
    Ok(Json(AddFavoriteResponse {
        added: inserted.is_some(),
        favorite: inserted,
    }))
}

#[instrument(skip(state))]
pub async fn use_favorite(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ChangedResponse>, (StatusCode, String)> {
    let changed = state
        .favorites
        .increment_usage(&key)
        .await
        .map_err(storage_failure)?;
    Ok(Json(ChangedResponse { changed }))
}

#[instrument(skip(state))]
pub async fn remove_favorite(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ChangedResponse>, (StatusCode, String)> {
    let changed = state.favorites.remove(&id).await.map_err(storage_failure)?;
    Ok(Json(ChangedResponse { changed }))
}
