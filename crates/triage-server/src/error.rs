use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use triage_core::models::diagnosis::{DiagnosisResult, FailureKind};
use triage_engine::compose::INTERNAL_FAILURE_MESSAGE;

/// Failures raised by the HTTP layer itself, outside the pipeline. The body
/// has the same shape as a failed [`DiagnosisResult`].
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                DiagnosisResult::failure(FailureKind::Validation, msg),
            ),
            ApiError::Internal(msg) => {
                tracing::error!("internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    DiagnosisResult::failure(FailureKind::Internal, INTERNAL_FAILURE_MESSAGE),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(format!("invalid request body: {}", rejection.body_text()))
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(e: tokio::task::JoinError) -> Self {
        ApiError::Internal(format!("diagnosis task failed: {e}"))
    }
}
