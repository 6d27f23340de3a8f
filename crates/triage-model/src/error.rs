use std::path::PathBuf;

use thiserror::Error;
use triage_core::models::demographics::Sex;

/// Failure to load or validate a model artifact. Always fatal at startup.
#[derive(Debug, Error)]
pub enum ArtifactLoadError {
    #[error("failed to read model bundle {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("model bundle is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unsupported bundle format version {found} (supported: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("bundle declares partition '{found}' but was loaded for '{expected}'")]
    PartitionMismatch { expected: Sex, found: Sex },

    #[error("no model bundle loaded for the {0} partition")]
    MissingPartition(Sex),

    #[error("invalid label set: {0}")]
    Labels(String),

    #[error("invalid vocabulary: {0}")]
    Vocabulary(String),

    #[error("feature shape mismatch: {context} expects {expected} features, found {actual}")]
    Shape {
        context: String,
        expected: usize,
        actual: usize,
    },

    #[error("invalid classifier: {0}")]
    InvalidClassifier(String),

    #[error("embedding provider unavailable: {0}")]
    Embedding(#[from] EmbeddingError),
}

/// Runtime failure of a classifier on a single input.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("expected {expected} features, got {actual}")]
    FeatureCount { expected: usize, actual: usize },

    #[error("classifier produced a non-finite score")]
    NonFinite,
}

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding request timed out")]
    Timeout,

    #[error("embedding transport error: {0}")]
    Transport(String),

    #[error("embedding response could not be parsed: {0}")]
    Response(String),

    #[error("embedding has {actual} dimensions, expected {expected}")]
    Dimension { expected: usize, actual: usize },

    #[error("embedding model error: {0}")]
    Model(String),
}
