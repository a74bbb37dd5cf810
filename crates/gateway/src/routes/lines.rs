//! Line listing route, read-only display for the host settings UI.

use std::collections::BTreeMap;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use relay_common::types::Line;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/lines", get(list_lines))
}

/// GET /api/lines — all known lines keyed by slot.
async fn list_lines(State(state): State<AppState>) -> Json<BTreeMap<u8, Line>> {
    Json(state.registry.list())
}
