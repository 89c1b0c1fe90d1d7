use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tracing::{error, instrument, warn};

use super::model::CacheStats;
use super::service::{BarcodeError, BarcodeHit};
use crate::{error::ApiError, state::AppState};

#[derive(Debug, Serialize)]
pub struct PurgeResponse {
    pub purged: usize,
}

pub fn barcode_routes() -> Router<AppState> {
    Router::new()
        .route("/barcodes/:code", get(scan_barcode))
        .route("/barcode-cache/stats", get(cache_stats))
        .route("/barcode-cache/purge", post(purge_cache))
}

impl From<BarcodeError> for ApiError {
    fn from(e: BarcodeError) -> Self {
        match e {
            BarcodeError::Invalid(code) => ApiError::BadRequest(format!("Invalid barcode: {code}")),
            BarcodeError::Lookup(e) => ApiError::Upstream(e),
            BarcodeError::Storage(e) => ApiError::Storage(e),
        }
    }
}

#[instrument(skip(state))]
pub async fn scan_barcode(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<BarcodeHit>, (StatusCode, String)> {
    match state.barcodes.scan(&code).await {
        Ok(Some(hit)) => Ok(Json(hit)),
        Ok(None) => Err(ApiError::NotFound("Product not found".into()).into()),
        Err(e @ BarcodeError::Invalid(_)) => {
            warn!(%code, "invalid barcode");
            Err(ApiError::from(e).into())
        }
        Err(e) => {
            error!(error = %e, %code, "barcode scan failed");
            Err(ApiError::from(e).into())
        }
    }
}

#[instrument(skip(state))]
pub async fn cache_stats(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.barcodes.cache().stats().await)
}

#[instrument(skip(state))]
pub async fn purge_cache(
    State(state): State<AppState>,
) -> Result<Json<PurgeResponse>, (StatusCode, String)> {
    let purged = state.barcodes.cache().purge_stale().await.map_err(|e| {
        error!(error = %e, "barcode cache purge failed");
        <(StatusCode, String)>::from(ApiError::from(e))
    })?;
    Ok(Json(PurgeResponse { purged }))
}
