use thiserror::Error;
use triage_core::error::ValidationError;
use triage_model::error::{ClassifierError, EmbeddingError};

/// Failure inside the pipeline after validation succeeded. Never shown to
/// the caller verbatim.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("embedding provider failed: {0}")]
    Embedding(EmbeddingError),

    #[error("embedding provider timed out")]
    EmbeddingTimeout,

    #[error("feature vector has {actual} values, expected {expected}")]
    FeatureShape { expected: usize, actual: usize },

    #[error("classifier failed: {0}")]
    Classifier(#[from] ClassifierError),

    #[error("classifier returned {actual} probabilities for {expected} labels")]
    LabelMismatch { expected: usize, actual: usize },

    #[error("invalid probability distribution: {0}")]
    InvalidDistribution(String),

    #[error("request was cancelled")]
    Cancelled,

    #[error("request deadline exceeded")]
    DeadlineExceeded,

    #[error("pipeline stage panicked: {0}")]
    Panicked(String),
}

impl From<EmbeddingError> for InferenceError {
    fn from(e: EmbeddingError) -> Self {
        match e {
            EmbeddingError::Timeout => InferenceError::EmbeddingTimeout,
            EmbeddingError::Dimension { expected, actual } => {
                InferenceError::FeatureShape { expected, actual }
            }
            other => InferenceError::Embedding(other),
        }
    }
}

/// Anything that can stop a single diagnosis.
#[derive(Debug, Error)]
pub enum DiagnosisError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Inference(#[from] InferenceError),
}
