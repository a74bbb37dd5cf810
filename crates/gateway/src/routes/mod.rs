pub mod events;
pub mod health;
pub mod jobs;
pub mod lines;

use axum::Router;

use crate::state::AppState;

/// Build the complete ingress router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(events::router())
        .merge(lines::router())
        .merge(jobs::router())
        .with_state(state)
}
