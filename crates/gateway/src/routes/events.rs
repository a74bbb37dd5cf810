//! Event ingress routes.
//!
//! The host's broadcast receivers report raw telephony events here, at most
//! once per physical event; call-state dedup inside the pipeline tolerates
//! re-delivery. The connectivity callback feeds the queue's network gate.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use relay_common::error::AppError;
use relay_common::types::CallState;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/events/sms", post(receive_sms))
        .route("/api/events/call", post(receive_call))
        .route("/api/network", post(set_network_state))
}

#[derive(Debug, Deserialize)]
pub struct SmsEventRequest {
    pub subscription_id: i32,
    pub sender: String,
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct CallEventRequest {
    pub subscription_id: i32,
    pub state: CallState,
    pub number: String,
}

#[derive(Debug, Deserialize)]
pub struct NetworkStateRequest {
    pub available: bool,
}

/// POST /api/events/sms — an SMS arrived on a line.
async fn receive_sms(
    State(state): State<AppState>,
    Json(request): Json<SmsEventRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let job = state
        .pipeline
        .handle_sms(request.subscription_id, &request.sender, &request.body)
        .await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "job_id": job.id, "status": job.status })),
    ))
}

/// POST /api/events/call — the phone state changed on a line.
async fn receive_call(
    State(state): State<AppState>,
    Json(request): Json<CallEventRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let queued = state
        .pipeline
        .handle_call_state(request.subscription_id, request.state, &request.number)
        .await?;

    Ok(match queued {
        Some(job) => (
            StatusCode::ACCEPTED,
            Json(json!({ "job_id": job.id, "status": job.status })),
        ),
        None => (StatusCode::OK, Json(json!({ "suppressed": true }))),
    })
}

/// POST /api/network — host connectivity signal.
async fn set_network_state(
    State(state): State<AppState>,
    Json(request): Json<NetworkStateRequest>,
) -> Json<serde_json::Value> {
    state.network.set_available(request.available);
    Json(json!({ "available": request.available }))
}
