use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use time::{macros::format_description, Date};
use tracing::{error, info, instrument};

use super::dto::{ArchiveRequest, ArchiveResponse, DeleteResponse};
use super::model::{DailyTotals, LogEntry, NewLogEntry};
use crate::{error::ApiError, state::AppState};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/log/days/:date", get(entries_for_day))
        .route("/log/days/:date/totals", get(totals_for_day))
        .route("/log/archive/days/:date", get(archived_for_day))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/log/entries", post(add_entry))
        .route("/log/entries/:id", delete(delete_entry))
        .route("/log/archive", post(run_archive))
}

pub(crate) fn parse_day(raw: &str) -> Result<Date, (StatusCode, String)> {
    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .map_err(|_| ApiError::BadRequest(format!("invalid date: {raw}")).into())
}

#[instrument(skip(state))]
pub async fn entries_for_day(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<Vec<LogEntry>>, (StatusCode, String)> {
    let date = parse_day(&date)?;
    Ok(Json(state.food_log.entries_for_date(date).await))
}

#[instrument(skip(state))]
pub async fn totals_for_day(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<DailyTotals>, (StatusCode, String)> {
    let date = parse_day(&date)?;
    Ok(Json(state.food_log.daily_totals(date).await))
}

#[instrument(skip(state))]
pub async fn archived_for_day(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<Vec<LogEntry>>, (StatusCode, String)> {
    let date = parse_day(&date)?;
    Ok(Json(state.food_log.archive().entries_for_date(date).await))
}

#[instrument(skip(state, payload))]
pub async fn add_entry(
    State(state): State<AppState>,
    Json(payload): Json<NewLogEntry>,
) -> Result<(StatusCode, Json<LogEntry>), (StatusCode, String)> {
    if payload.food_name.trim().is_empty() {
        return Err(ApiError::BadRequest("foodName is required".into()).into());
    }
    match state.food_log.add_entry(payload).await {
        Ok(entry) => Ok((StatusCode::CREATED, Json(entry))),
        Err(e) => {
            error!(error = %e, "add log entry failed");
            Err(ApiError::from(e).into())
        }
    }
}

#[instrument(skip(state))]
pub async fn delete_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, (StatusCode, String)> {
    let deleted = state.food_log.delete_entry(&id).await.map_err(|e| {
        error!(error = %e, %id, "delete log entry failed");
        <(StatusCode, String)>::from(ApiError::from(e))
    })?;
    Ok(Json(DeleteResponse { deleted }))
}

#[instrument(skip(state))]
pub async fn run_archive(
    State(state): State<AppState>,
    Json(req): Json<ArchiveRequest>,
) -> Result<Json<ArchiveResponse>, (StatusCode, String)> {
    let months = req.months.unwrap_or(state.config.archive_after_months);
    let moved = state.food_log.archive_older_than(months).await.map_err(|e| {
        error!(error = %e, months, "archive run failed");
        <(StatusCode, String)>::from(ApiError::from(e))
    })?;
    info!(moved, months, "archive run finished");
    Ok(Json(ArchiveResponse { moved }))
}
