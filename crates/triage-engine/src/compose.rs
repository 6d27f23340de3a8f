//! Final result assembly.

use tracing::{error, warn};
use triage_core::models::diagnosis::{
    Diagnosis, DiagnosisCandidate, DiagnosisMetadata, DiagnosisResult, FailureKind,
};

use crate::encode::VocabularyMiss;
use crate::error::DiagnosisError;
use crate::normalize::NormalizedSymptoms;
use crate::rank::{format_confidence, RankedLabel};
use crate::router::Partition;
use crate::triage::TriageAssessor;

/// Message returned for every internal failure. Details only go to the log.
pub const INTERNAL_FAILURE_MESSAGE: &str =
    "The diagnosis could not be completed due to an internal error. Please try again later.";

#[derive(Debug, Clone, Copy)]
pub struct ResponseComposer<'a> {
    assessor: TriageAssessor<'a>,
}

impl Default for ResponseComposer<'static> {
    fn default() -> Self {
        Self::new(TriageAssessor::default())
    }
}

impl<'a> ResponseComposer<'a> {
    pub fn new(assessor: TriageAssessor<'a>) -> Self {
        Self { assessor }
    }

    /// Build the success payload from a non-empty ranking.
    pub fn compose(
        &self,
        partition: &Partition,
        ranked: &[RankedLabel],
        symptoms: &NormalizedSymptoms,
        misses: &[VocabularyMiss],
    ) -> Option<Diagnosis> {
        let candidates: Vec<DiagnosisCandidate> = ranked
            .iter()
            .enumerate()
            .map(|(i, r)| DiagnosisCandidate {
                rank: i + 1,
                condition: r.condition.clone(),
                probability: r.probability,
                confidence: format_confidence(r.probability),
                severity: self.assessor.assess_severity(&r.condition),
                urgency: self.assessor.assess_urgency(&r.condition, r.probability),
            })
            .collect();
        let primary = candidates.first()?.clone();
        let urgency = primary.urgency;

        let metadata = DiagnosisMetadata {
            partition: partition.sex(),
            classifier_type: partition.classifier().kind().to_string(),
            model_type: partition.metadata().model_type.clone(),
            encoding: partition.encoder().strategy(),
            label_count: partition.labels().len(),
            vocabulary_size: partition.encoder().vocabulary_size(),
            training_samples: partition.metadata().training_samples,
            reported_accuracy: partition.metadata().reported_accuracy,
            normalized_symptoms: symptoms
                .slots
                .present()
                .map(|t| t.to_string())
                .collect(),
            unrecognized_symptoms: misses.iter().map(|m| m.token.clone()).collect(),
            truncated_symptoms: symptoms.truncated,
        };

        Some(Diagnosis {
            summary: format!("Based on AI analysis: {}", primary.condition),
            recommendations: self.assessor.recommendations(urgency),
            disclaimer: self.assessor.disclaimer().to_string(),
            urgency,
            primary,
            candidates,
            metadata,
        })
    }

    /// Turn a stage failure into a caller-safe result.
    pub fn failure(&self, err: &DiagnosisError) -> DiagnosisResult {
        match err {
            DiagnosisError::Validation(e) => {
                warn!(error = %e, "rejected diagnosis request");
                DiagnosisResult::failure(FailureKind::Validation, e.to_string())
            }
            DiagnosisError::Inference(e) => {
                error!(error = %e, "diagnosis failed");
                DiagnosisResult::failure(FailureKind::Internal, INTERNAL_FAILURE_MESSAGE)
            }
        }
    }
}
