use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use triage_core::models::diagnosis::{DiagnosisResult, FailureKind};
use triage_core::models::request::DiagnosisRequest;
use triage_engine::pipeline::CancelToken;

use crate::error::ApiError;
use crate::state::AppState;

/// Trips the token when the handler future is dropped, e.g. because the
/// client disconnected, so the blocking pipeline stops at its next stage.
struct CancelOnDrop(CancelToken);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

pub async fn diagnose(
    State(state): State<AppState>,
    payload: Result<Json<DiagnosisRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<DiagnosisResult>), ApiError> {
    let Json(request) = payload?;
    if let Some(user_id) = &request.user_id {
        tracing::debug!(user_id = %user_id, "diagnosis requested");
    }

    let registry = state.registry.current();
    let pipeline = state.pipeline;
    let cancel = CancelToken::with_timeout(state.request_timeout);
    let _guard = CancelOnDrop(cancel.clone());

    let task =
        tokio::task::spawn_blocking(move || pipeline.diagnose(&registry, &request, &cancel));
    let result = match tokio::time::timeout(state.request_timeout, task).await {
        Ok(joined) => joined?,
        Err(_) => {
            return Err(ApiError::Internal(format!(
                "diagnosis exceeded the {} ms deadline",
                state.request_timeout.as_millis()
            )));
        }
    };

    let status = match result.failure_kind() {
        None => StatusCode::OK,
        Some(FailureKind::Validation) => StatusCode::BAD_REQUEST,
        Some(FailureKind::Internal) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    Ok((status, Json(result)))
}
