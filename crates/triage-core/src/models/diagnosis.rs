use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::demographics::Sex;
use crate::models::features::EncodingStrategy;

/// How quickly the caller should seek care.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Urgency {
    Low,
    Medium,
    High,
    Emergency,
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Urgency::Low => "Low",
            Urgency::Medium => "Medium",
            Urgency::High => "High",
            Urgency::Emergency => "Emergency",
        };
        f.write_str(s)
    }
}

/// Intrinsic seriousness of a condition, independent of urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SeverityTag {
    Low,
    Medium,
    High,
}

/// One ranked condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisCandidate {
    /// 1-based position in the ranking.
    pub rank: usize,
    pub condition: String,
    pub probability: f64,
    /// Probability as a percentage with one decimal, e.g. `"82.0%"`.
    pub confidence: String,
    pub severity: SeverityTag,
    pub urgency: Urgency,
}

/// Provenance of a diagnosis: which partition answered and how.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisMetadata {
    pub partition: Sex,
    pub classifier_type: String,
    pub model_type: String,
    pub encoding: EncodingStrategy,
    pub label_count: usize,
    pub vocabulary_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub training_samples: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reported_accuracy: Option<f64>,
    /// Canonical symptoms after normalization, in slot order.
    pub normalized_symptoms: Vec<String>,
    /// Symptoms absent from the training vocabulary (encoded as empty).
    pub unrecognized_symptoms: Vec<String>,
    /// Symptoms dropped because the input exceeded the slot count.
    pub truncated_symptoms: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub summary: String,
    pub primary: DiagnosisCandidate,
    pub candidates: Vec<DiagnosisCandidate>,
    pub urgency: Urgency,
    pub recommendations: Vec<String>,
    pub disclaimer: String,
    pub metadata: DiagnosisMetadata,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The request was malformed; the message says how to fix it.
    Validation,
    /// Something failed inside the pipeline; the message is generic.
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureDetail {
    pub kind: FailureKind,
    pub message: String,
}

/// Final pipeline output, either a diagnosis or a structured failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisResult {
    pub success: bool,
    pub diagnosis: Option<Diagnosis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FailureDetail>,
}

impl DiagnosisResult {
    pub fn success(diagnosis: Diagnosis) -> Self {
        Self {
            success: true,
            diagnosis: Some(diagnosis),
            error: None,
        }
    }

    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            diagnosis: None,
            error: Some(FailureDetail {
                kind,
                message: message.into(),
            }),
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.error.as_ref().map(|e| e.kind)
    }
}
