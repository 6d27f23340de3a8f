//! Symptom slots plus demographics to a classifier feature vector.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;
use triage_core::models::demographics::{Severity, Sex};
use triage_core::models::features::{EncodingStrategy, FeatureVector};
use triage_core::models::symptom::{SymptomSlotList, SLOT_COUNT};
use triage_model::bundle::EncodingSpec;
use triage_model::embedding::EmbeddingProvider;
use triage_model::error::ArtifactLoadError;

use crate::error::InferenceError;

/// A symptom token the partition's vocabulary does not know. Encoded as the
/// empty token and reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabularyMiss {
    pub slot: usize,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EncodedFeatures {
    pub vector: FeatureVector,
    pub misses: Vec<VocabularyMiss>,
}

pub trait FeatureEncoder: Send + Sync {
    fn encode(
        &self,
        age: u32,
        symptoms: &SymptomSlotList,
        severity: Severity,
        sex: Sex,
    ) -> Result<EncodedFeatures, InferenceError>;

    /// Length of every vector produced by [`FeatureEncoder::encode`].
    fn feature_count(&self) -> usize;

    fn strategy(&self) -> EncodingStrategy;

    /// Number of symptom classes known to the encoder (0 for encoders that
    /// have no discrete symptom vocabulary).
    fn vocabulary_size(&self) -> usize;
}

/// Build the encoder a bundle was trained with. Semantic encodings need an
/// embedding provider of matching dimension.
pub fn encoder_for(
    spec: &EncodingSpec,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
) -> Result<Box<dyn FeatureEncoder>, ArtifactLoadError> {
    match spec {
        EncodingSpec::Categorical {
            symptom_vocabulary,
            severity_vocabulary,
            sex_vocabulary,
        } => Ok(Box::new(CategoricalEncoder::new(
            symptom_vocabulary,
            severity_vocabulary.clone(),
            sex_vocabulary.clone(),
        )?)),
        EncodingSpec::Semantic {
            embedding_dimension,
            severity_vocabulary,
            sex_vocabulary,
        } => {
            let embedder = embedder.ok_or_else(|| {
                ArtifactLoadError::InvalidClassifier(
                    "semantic bundle requires an embedding provider".to_string(),
                )
            })?;
            Ok(Box::new(SemanticEncoder::new(
                embedder,
                *embedding_dimension,
                severity_vocabulary.clone(),
                sex_vocabulary.clone(),
            )?))
        }
    }
}

/// Position of `value` in a label-encoder style vocabulary, falling back to
/// the first class when the value was never seen in training.
fn class_index(vocabulary: &[String], value: &str, field: &'static str) -> usize {
    match vocabulary.iter().position(|v| v == value) {
        Some(i) => i,
        None => {
            warn!(field, value, "value missing from encoder vocabulary, using class 0");
            0
        }
    }
}

/// One vocabulary index per slot: `[age, s1..s6, severity, sex]`.
#[derive(Debug, Clone)]
pub struct CategoricalEncoder {
    symptom_index: HashMap<String, usize>,
    empty_index: usize,
    severity_vocabulary: Vec<String>,
    sex_vocabulary: Vec<String>,
}

impl CategoricalEncoder {
    pub fn new(
        symptom_vocabulary: &[String],
        severity_vocabulary: Vec<String>,
        sex_vocabulary: Vec<String>,
    ) -> Result<Self, ArtifactLoadError> {
        let symptom_index: HashMap<String, usize> = symptom_vocabulary
            .iter()
            .enumerate()
            .map(|(i, s)| (s.clone(), i))
            .collect();
        let empty_index = *symptom_index.get("").ok_or_else(|| {
            ArtifactLoadError::Vocabulary("symptom vocabulary has no empty token".to_string())
        })?;

        Ok(Self {
            symptom_index,
            empty_index,
            severity_vocabulary,
            sex_vocabulary,
        })
    }
}

impl FeatureEncoder for CategoricalEncoder {
    fn encode(
        &self,
        age: u32,
        symptoms: &SymptomSlotList,
        severity: Severity,
        sex: Sex,
    ) -> Result<EncodedFeatures, InferenceError> {
        let mut values = Vec::with_capacity(self.feature_count());
        let mut misses = Vec::new();

        values.push(f64::from(age));
        for (slot, token) in symptoms.iter().enumerate() {
            let index = match self.symptom_index.get(token.as_str()) {
                Some(&i) => i,
                None => {
                    warn!(slot, token = %token, "symptom not in vocabulary, encoding as empty");
                    misses.push(VocabularyMiss {
                        slot,
                        token: token.to_string(),
                    });
                    self.empty_index
                }
            };
            values.push(index as f64);
        }
        values.push(class_index(&self.severity_vocabulary, severity.as_str(), "severity") as f64);
        values.push(class_index(&self.sex_vocabulary, sex.as_str(), "sex") as f64);

        Ok(EncodedFeatures {
            vector: FeatureVector::new(values),
            misses,
        })
    }

    fn feature_count(&self) -> usize {
        1 + SLOT_COUNT + 2
    }

    fn strategy(&self) -> EncodingStrategy {
        EncodingStrategy::Categorical
    }

    fn vocabulary_size(&self) -> usize {
        self.symptom_index.len()
    }
}

/// Text used for a request whose slots are all empty. Matches what the
/// semantic models saw during training.
pub const NO_SYMPTOMS_TEXT: &str = "no symptoms";

/// Dense sentence embedding of the joined symptoms:
/// `[age] ++ embedding ++ [severity, sex]`.
pub struct SemanticEncoder {
    embedder: Arc<dyn EmbeddingProvider>,
    dimension: usize,
    severity_vocabulary: Vec<String>,
    sex_vocabulary: Vec<String>,
}

impl SemanticEncoder {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        dimension: usize,
        severity_vocabulary: Vec<String>,
        sex_vocabulary: Vec<String>,
    ) -> Result<Self, ArtifactLoadError> {
        if embedder.dimension() != dimension {
            return Err(ArtifactLoadError::Shape {
                context: format!("embedding provider '{}'", embedder.name()),
                expected: dimension,
                actual: embedder.dimension(),
            });
        }
        Ok(Self {
            embedder,
            dimension,
            severity_vocabulary,
            sex_vocabulary,
        })
    }

    /// The sentence handed to the embedding provider.
    pub fn embedding_text(symptoms: &SymptomSlotList) -> String {
        if symptoms.is_all_empty() {
            return NO_SYMPTOMS_TEXT.to_string();
        }
        symptoms
            .present()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn severity_index(&self, severity: Severity) -> usize {
        let vocab = &self.severity_vocabulary;
        if let Some(i) = vocab.iter().position(|v| v == severity.as_str()) {
            return i;
        }
        warn!(
            severity = %severity,
            "severity missing from encoder vocabulary, using 'medium'"
        );
        vocab
            .iter()
            .position(|v| v == Severity::Medium.as_str())
            .unwrap_or(0)
    }
}

impl FeatureEncoder for SemanticEncoder {
    fn encode(
        &self,
        age: u32,
        symptoms: &SymptomSlotList,
        severity: Severity,
        sex: Sex,
    ) -> Result<EncodedFeatures, InferenceError> {
        let text = Self::embedding_text(symptoms);
        let embedding = self.embedder.embed(&text)?;
        if embedding.len() != self.dimension {
            return Err(InferenceError::FeatureShape {
                expected: self.dimension,
                actual: embedding.len(),
            });
        }

        let mut values = Vec::with_capacity(self.feature_count());
        values.push(f64::from(age));
        values.extend(embedding.iter().map(|&v| f64::from(v)));
        values.push(self.severity_index(severity) as f64);
        values.push(class_index(&self.sex_vocabulary, sex.as_str(), "sex") as f64);

        Ok(EncodedFeatures {
            vector: FeatureVector::new(values),
            misses: Vec::new(),
        })
    }

    fn feature_count(&self) -> usize {
        1 + self.dimension + 2
    }

    fn strategy(&self) -> EncodingStrategy {
        EncodingStrategy::Semantic
    }

    fn vocabulary_size(&self) -> usize {
        0
    }
}
