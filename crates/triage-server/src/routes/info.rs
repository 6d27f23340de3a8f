use std::collections::BTreeMap;

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use triage_core::models::demographics::Sex;
use triage_core::models::features::EncodingStrategy;

use crate::routes::health::SERVICE_NAME;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PartitionInfo {
    classifier_type: String,
    model_type: String,
    encoding: EncodingStrategy,
    feature_count: usize,
    vocabulary_size: usize,
    labels: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    training_samples: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reported_accuracy: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct InfoResponse {
    service: &'static str,
    version: &'static str,
    top_k: usize,
    request_timeout_ms: u64,
    partitions: BTreeMap<Sex, PartitionInfo>,
}

pub async fn model_info(State(state): State<AppState>) -> Json<InfoResponse> {
    let registry = state.registry.current();
    let partitions = registry
        .partitions()
        .map(|p| {
            let metadata = p.metadata();
            (
                p.sex(),
                PartitionInfo {
                    classifier_type: p.classifier().kind().to_string(),
                    model_type: metadata.model_type.clone(),
                    encoding: p.encoder().strategy(),
                    feature_count: p.encoder().feature_count(),
                    vocabulary_size: p.encoder().vocabulary_size(),
                    labels: p.labels().to_vec(),
                    training_samples: metadata.training_samples,
                    reported_accuracy: metadata.reported_accuracy,
                },
            )
        })
        .collect();

    Json(InfoResponse {
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        top_k: state.pipeline.top_k(),
        request_timeout_ms: u64::try_from(state.request_timeout.as_millis()).unwrap_or(u64::MAX),
        partitions,
    })
}
