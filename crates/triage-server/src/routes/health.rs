use std::collections::BTreeMap;

use axum::extract::State;
use axum::Json;
use jiff::Timestamp;
use serde::Serialize;
use triage_core::models::demographics::Sex;

use crate::state::AppState;

pub const SERVICE_NAME: &str = "triage-server";

#[derive(Debug, Serialize)]
pub struct PartitionHealth {
    loaded: bool,
    labels: usize,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    timestamp: Timestamp,
    models: BTreeMap<Sex, PartitionHealth>,
    service: &'static str,
    version: &'static str,
}

/// A registry only exists with both partitions loaded, so a running server
/// is always healthy; the per-partition detail is for operators.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let registry = state.registry.current();
    let models = registry
        .partitions()
        .map(|p| {
            (
                p.sex(),
                PartitionHealth {
                    loaded: true,
                    labels: p.labels().len(),
                },
            )
        })
        .collect();

    Json(HealthResponse {
        status: "healthy",
        timestamp: Timestamp::now(),
        models,
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
    })
}
