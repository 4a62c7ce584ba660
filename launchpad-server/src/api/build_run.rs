//! Build-and-run API Handler

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::header,
    response::IntoResponse,
};
use launchpad_core::dto::build_run::BuildRunRequest;

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult};

/// Results are one-off and must never be served from a cache
pub const NO_CACHE: &str = "no-cache, no-store, must-revalidate";

/// POST /k8s/build_run
/// Build, publish and run the submitted code, returning the job's output
///
/// The pipeline runs on its own task so a disconnecting caller cannot
/// abandon a run between submission and cleanup.
pub async fn build_run(
    State(state): State<AppState>,
    payload: Result<Json<BuildRunRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    tracing::info!(
        "Build-run requested for deployment {} ({})",
        request.deployment_name,
        request.language
    );

    let pipeline = state.pipeline.clone();
    let result = tokio::spawn(async move { pipeline.build_run(request).await })
        .await
        .map_err(|e| ApiError::InternalError(format!("Pipeline task failed: {}", e)))??;

    Ok(([(header::CACHE_CONTROL, NO_CACHE)], Json(result)))
}
