//! API Error Handling
//!
//! Unified error types and conversion for API responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use launchpad_pipeline::PipelineError;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    PipelineFailed(PipelineError),
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::PipelineFailed(err) => {
                tracing::error!("Pipeline failed at {} stage: {}", err.stage(), err);
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        ApiError::PipelineFailed(err)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
