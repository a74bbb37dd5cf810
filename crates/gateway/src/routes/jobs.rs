//! Queue visibility and cancellation routes for the host UI.

use axum::extract::{Path, Query, State};
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use relay_common::error::AppError;
use relay_common::types::NotificationJob;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/jobs", get(list_jobs))
        .route("/api/jobs/{id}", delete(cancel_job))
}

#[derive(Debug, Deserialize)]
pub struct JobsQuery {
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    50
}

/// GET /api/jobs — most recently created jobs.
async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobsQuery>,
) -> Result<Json<Vec<NotificationJob>>, AppError> {
    let jobs = state.store.recent(query.limit).await?;
    Ok(Json(jobs))
}

/// DELETE /api/jobs/:id — cancel a non-terminal job.
async fn cancel_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let cancelled = state.store.cancel(id).await?;
    if cancelled {
        Ok(Json(serde_json::json!({"cancelled": true})))
    } else {
        Err(AppError::NotFound(format!("Job {} not found or already terminal", id)))
    }
}
