use std::path::PathBuf;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use triage_core::models::demographics::Sex;
use triage_engine::encode::CategoricalEncoder;
use triage_engine::pipeline::{Pipeline, PipelineConfig};
use triage_engine::router::{ModelRegistry, Partition};
use triage_model::bundle::ArtifactMetadata;
use triage_model::classifier::Classifier;
use triage_model::error::ClassifierError;
use triage_server::build_router;
use triage_server::middleware::request_log::REQUEST_ID_HEADER;
use triage_server::state::AppState;

fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../fixtures/models")
}

fn app_with(registry: ModelRegistry) -> Router {
    build_router(AppState::new(
        registry,
        Pipeline::new(PipelineConfig { top_k: 3 }),
        Duration::from_secs(10),
    ))
}

fn fixture_app() -> Router {
    app_with(ModelRegistry::load(&fixture_dir(), None).unwrap())
}

/// Classifier whose output never sums to one.
struct BrokenClassifier;

impl Classifier for BrokenClassifier {
    fn kind(&self) -> &str {
        "broken"
    }

    fn feature_count(&self) -> usize {
        9
    }

    fn label_count(&self) -> usize {
        2
    }

    fn predict_probabilities(&self, _features: &[f64]) -> Result<Vec<f64>, ClassifierError> {
        Ok(vec![0.9, 0.9])
    }
}

fn broken_app() -> Router {
    let partitions = Sex::ALL.map(|sex| {
        let encoder = CategoricalEncoder::new(
            &["".to_string(), "fever".to_string()],
            vec!["low".to_string()],
            vec![sex.as_str().to_string()],
        )
        .unwrap();
        Partition::new(
            sex,
            vec!["A".to_string(), "B".to_string()],
            Box::new(BrokenClassifier),
            Box::new(encoder),
            ArtifactMetadata::default(),
        )
        .unwrap()
    });
    app_with(ModelRegistry::from_partitions(partitions).unwrap())
}

fn post_json(uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn diagnose_returns_ranked_result() {
    let body = json!({
        "age": 30,
        "symptoms": "fever, cough, body aches, fatigue",
        "severity": "medium",
        "sex": "male"
    });
    let (status, json) = send(fixture_app(), post_json("/ai/diagnose", body.to_string())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["diagnosis"]["primary"]["condition"], "Influenza");
    assert_eq!(json["diagnosis"]["primary"]["confidence"], "82.0%");
    assert_eq!(json["diagnosis"]["urgency"], "Medium");
    assert_eq!(json["diagnosis"]["candidates"].as_array().unwrap().len(), 3);
    assert_eq!(json["diagnosis"]["metadata"]["partition"], "male");
    assert!(json.get("error").is_none());
}

#[tokio::test]
async fn accepts_gender_alias_and_string_age() {
    let body = json!({
        "age": "25",
        "symptoms": "chills, coughing, muscle aches, sore throat",
        "severity": "Medium",
        "gender": "Female",
        "user_id": "u-123"
    });
    let (status, json) = send(fixture_app(), post_json("/ai/diagnose", body.to_string())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["diagnosis"]["metadata"]["partition"], "female");
    assert_eq!(json["diagnosis"]["primary"]["condition"], "Influenza");
}

#[tokio::test]
async fn invalid_sex_is_a_bad_request() {
    let body = json!({"age": 30, "symptoms": "fever", "severity": "low", "sex": "other"});
    let (status, json) = send(fixture_app(), post_json("/ai/diagnose", body.to_string())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["kind"], "validation");
    assert!(json["error"]["message"].as_str().unwrap().contains("male or female"));
}

#[tokio::test]
async fn conflicting_sex_and_gender_is_a_bad_request() {
    let body = json!({
        "symptoms": "fever",
        "severity": "low",
        "sex": "male",
        "gender": "female"
    });
    let (status, json) = send(fixture_app(), post_json("/ai/diagnose", body.to_string())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["kind"], "validation");
    let message = json["error"]["message"].as_str().unwrap();
    assert!(message.contains("sex 'male' and gender 'female' disagree"));
}

#[tokio::test]
async fn missing_severity_is_a_bad_request() {
    let body = json!({"symptoms": "fever", "sex": "male"});
    let (status, json) = send(fixture_app(), post_json("/ai/diagnose", body.to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["kind"], "validation");
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let request = post_json("/ai/diagnose", "{not json".to_string());
    let (status, json) = send(fixture_app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["kind"], "validation");
}

#[tokio::test]
async fn internal_failures_are_opaque() {
    let body = json!({"age": 30, "symptoms": "fever", "severity": "low", "sex": "male"});
    let (status, json) = send(broken_app(), post_json("/ai/diagnose", body.to_string())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"]["kind"], "internal");
    let message = json["error"]["message"].as_str().unwrap();
    assert!(!message.contains("sum"));
    assert!(json["diagnosis"].is_null());
}

#[tokio::test]
async fn health_reports_both_partitions() {
    let (status, json) = send(fixture_app(), get("/ai/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["models"]["male"]["loaded"], true);
    assert_eq!(json["models"]["male"]["labels"], 4);
    assert_eq!(json["models"]["female"]["labels"], 4);
    assert!(json["timestamp"].is_string());
}

#[tokio::test]
async fn info_describes_each_partition() {
    let (status, json) = send(fixture_app(), get("/ai/info")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["top_k"], 3);
    assert_eq!(json["partitions"]["male"]["classifier_type"], "random_forest");
    assert_eq!(json["partitions"]["female"]["classifier_type"], "logistic_regression");
    assert_eq!(json["partitions"]["male"]["encoding"], "categorical");
    assert_eq!(json["partitions"]["male"]["feature_count"], 9);
    assert_eq!(json["partitions"]["female"]["training_samples"], 26000);
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let response = fixture_app().oneshot(get("/ai/health")).await.unwrap();
    let id = response.headers().get(REQUEST_ID_HEADER).unwrap();
    assert_eq!(id.to_str().unwrap().len(), 36);
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let response = fixture_app().oneshot(get("/ai/nope")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
