use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;
use tracing::{error, instrument};

use super::model::{RecipeDraft, RecipeEntry};
use crate::{error::ApiError, search::Nutrients, state::AppState};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDetails {
    #[serde(flatten)]
    pub recipe: RecipeEntry,
    pub per_serving: Nutrients,
}

#[derive(Debug, Serialize)]
pub struct ChangedResponse {
    pub changed: bool,
}

pub fn recipe_routes() -> Router<AppState> {
    Router::new()
        .route("/recipes", get(list_recipes).put(upsert_recipe))
        .route("/recipes/:key", get(get_recipe).delete(delete_recipe))
        .route("/recipes/:key/use", post(use_recipe))
}

fn storage_failure(e: crate::error::StorageError) -> (StatusCode, String) {
    error!(error = %e, "recipes write failed");
    ApiError::from(e).into()
}

fn details(recipe: RecipeEntry) -> RecipeDetails {
    RecipeDetails {
        per_serving: recipe.per_serving(),
        recipe,
    }
}

#[instrument(skip(state))]
pub async fn list_recipes(State(state): State<AppState>) -> Json<Vec<RecipeDetails>> {
    Json(state.recipes.list().await.into_iter().map(details).collect())
}

#[instrument(skip(state))]
pub async fn get_recipe(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<RecipeDetails>, (StatusCode, String)> {
    match state.recipes.get_by_name(&key).await {
        Some(r) => Ok(Json(details(r))),
        None => Err(ApiError::NotFound("Recipe not found".into()).into()),
    }
}

#[instrument(skip(state, draft))]
pub async fn upsert_recipe(
    State(state): State<AppState>,
    Json(draft): Json<RecipeDraft>,
) -> Result<Json<RecipeDetails>, (StatusCode, String)> {
    if draft.name.trim().is_empty() {
        return Err(ApiError::BadRequest("name is required".into()).into());
    }
    let stored = state.recipes.upsert(draft).await.map_err(storage_failure)?;
    Ok(Json(details(stored)))
}

#[instrument(skip(state))]
pub async fn use_recipe(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ChangedResponse>, (StatusCode, String)> {
    let changed = state
        .recipes
        .increment_usage(&key)
        .await
        .map_err(storage_failure)?;
    Ok(Json(ChangedResponse { changed }))
}

#[instrument(skip(state))]
pub async fn delete_recipe(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ChangedResponse>, (StatusCode, String)> {
    let changed = state.recipes.delete(&key).await.map_err(storage_failure)?;
    Ok(Json(ChangedResponse { changed }))
}
