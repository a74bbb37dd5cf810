//! Shared application state for the Axum ingress.

use std::sync::Arc;

use relay_lines::LineRegistry;
use relay_pipeline::EventPipeline;
use relay_queue::{JobStore, NetworkHandle};

/// Application state shared across all route handlers via Axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<EventPipeline>,
    pub registry: Arc<LineRegistry>,
    pub store: JobStore,
    pub network: Arc<NetworkHandle>,
}

impl AppState {
    pub fn new(
        pipeline: Arc<EventPipeline>,
        registry: Arc<LineRegistry>,
        store: JobStore,
        network: Arc<NetworkHandle>,
    ) -> Self {
        Self {
            pipeline,
            registry,
            store,
            network,
        }
    }
}
