//! API Module
//!
//! HTTP API layer over the pipeline service.

pub mod build_run;
pub mod error;
pub mod health;

use axum::{
    Router,
    routing::{get, post},
};
use launchpad_pipeline::PipelineService;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<dyn PipelineService>,
}

impl AppState {
    pub fn new(pipeline: Arc<dyn PipelineService>) -> Self {
        Self { pipeline }
    }
}

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::welcome))
        .route("/health", get(health::health_check))
        .route("/k8s/build_run", post(build_run::build_run))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
