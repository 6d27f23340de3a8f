//! Stage orchestration with cancellation and a single fault boundary.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};
use triage_core::models::diagnosis::{Diagnosis, DiagnosisResult};
use triage_core::models::request::DiagnosisRequest;

use crate::compose::ResponseComposer;
use crate::error::{DiagnosisError, InferenceError};
use crate::normalize::SymptomNormalizer;
use crate::rank::{RankingAssembler, DEFAULT_TOP_K};
use crate::router::ModelRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Number of ranked candidates returned, clamped to the label count.
    pub top_k: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
        }
    }
}

/// Cooperative cancellation, checked between stages. Clones share the flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            cancelled: Arc::default(),
            deadline: Instant::now().checked_add(timeout),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub fn check(&self) -> Result<(), InferenceError> {
        if self.is_cancelled() {
            return Err(InferenceError::Cancelled);
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(InferenceError::DeadlineExceeded);
        }
        Ok(())
    }
}

/// The full request-to-result path. Holds no per-request state and no
/// models; the registry is passed in so a reload never changes a request
/// midway.
#[derive(Debug, Clone, Copy)]
pub struct Pipeline {
    normalizer: SymptomNormalizer<'static>,
    ranking: RankingAssembler,
    composer: ResponseComposer<'static>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            normalizer: SymptomNormalizer::default(),
            ranking: RankingAssembler::new(config.top_k),
            composer: ResponseComposer::default(),
        }
    }

    pub fn top_k(&self) -> usize {
        self.ranking.top_k()
    }

    /// Run every stage and always produce a result. Failures and panics
    /// become structured failure results.
    pub fn diagnose(
        &self,
        registry: &ModelRegistry,
        request: &DiagnosisRequest,
        cancel: &CancelToken,
    ) -> DiagnosisResult {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.run(registry, request, cancel)));
        match outcome {
            Ok(Ok(diagnosis)) => DiagnosisResult::success(diagnosis),
            Ok(Err(err)) => self.composer.failure(&err),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                self.composer
                    .failure(&InferenceError::Panicked(message).into())
            }
        }
    }

    /// The stages in order: validate, normalize, route, encode, classify,
    /// rank, compose. Routing needs the validated sex, and the encoder
    /// belongs to the routed partition.
    pub fn run(
        &self,
        registry: &ModelRegistry,
        request: &DiagnosisRequest,
        cancel: &CancelToken,
    ) -> Result<Diagnosis, DiagnosisError> {
        let request = request.validate()?;
        cancel.check()?;

        let symptoms = self.normalizer.normalize(&request.symptoms);
        cancel.check()?;

        let partition = registry.route(request.sex);
        let encoded = partition.encoder().encode(
            request.age,
            &symptoms.slots,
            request.severity,
            request.sex,
        )?;
        cancel.check()?;

        let classifier = partition.classifier();
        if encoded.vector.len() != classifier.feature_count() {
            return Err(InferenceError::FeatureShape {
                expected: classifier.feature_count(),
                actual: encoded.vector.len(),
            }
            .into());
        }
        let probabilities = classifier
            .predict_probabilities(encoded.vector.as_slice())
            .map_err(InferenceError::from)?;
        cancel.check()?;

        let ranked = self.ranking.rank(partition.labels(), &probabilities)?;
        debug!(
            partition = %request.sex,
            candidates = ranked.len(),
            "ranked classifier output"
        );

        let diagnosis = self
            .composer
            .compose(partition, &ranked, &symptoms, &encoded.misses)
            .ok_or_else(|| InferenceError::InvalidDistribution("no candidates".to_string()))?;

        info!(
            partition = %request.sex,
            primary = %diagnosis.primary.condition,
            confidence = %diagnosis.primary.confidence,
            urgency = %diagnosis.urgency,
            unrecognized = diagnosis.metadata.unrecognized_symptoms.len(),
            "diagnosis complete"
        );
        Ok(diagnosis)
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
