//! On-disk model bundle: one JSON document per demographic partition.
//!
//! A bundle carries everything needed to serve one partition: the ordered
//! label set, the encoding vocabularies, the classifier parameters, and
//! descriptive metadata. Loading validates every declared shape up front so
//! that nothing is silently truncated or padded at request time.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;
use triage_core::models::demographics::Sex;
use triage_core::models::features::EncodingStrategy;
use triage_core::models::symptom::SLOT_COUNT;

use crate::classifier::Classifier;
use crate::error::ArtifactLoadError;
use crate::forest::{DecisionTree, ForestClassifier};
use crate::linear::{LinearClassifier, LinearParameters};

/// Bundle format understood by this build.
pub const BUNDLE_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelBundle {
    pub format_version: u32,
    pub partition: Sex,
    pub labels: Vec<String>,
    pub feature_count: usize,
    pub encoding: EncodingSpec,
    pub classifier: ClassifierSpec,
    #[serde(default)]
    pub metadata: ArtifactMetadata,
}

/// Feature layout the classifier was trained on.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum EncodingSpec {
    Categorical {
        /// Ordered symptom classes; a token's index is its position. Must
        /// contain the empty token.
        symptom_vocabulary: Vec<String>,
        severity_vocabulary: Vec<String>,
        sex_vocabulary: Vec<String>,
    },
    Semantic {
        embedding_dimension: usize,
        severity_vocabulary: Vec<String>,
        sex_vocabulary: Vec<String>,
    },
}

impl EncodingSpec {
    pub fn strategy(&self) -> EncodingStrategy {
        match self {
            EncodingSpec::Categorical { .. } => EncodingStrategy::Categorical,
            EncodingSpec::Semantic { .. } => EncodingStrategy::Semantic,
        }
    }

    /// Feature vector length implied by this layout: age, the symptom
    /// block, severity, sex.
    pub fn feature_count(&self) -> usize {
        let symptom_block = match self {
            EncodingSpec::Categorical { .. } => SLOT_COUNT,
            EncodingSpec::Semantic {
                embedding_dimension,
                ..
            } => *embedding_dimension,
        };
        1 + symptom_block + 1 + 1
    }

    pub fn severity_vocabulary(&self) -> &[String] {
        match self {
            EncodingSpec::Categorical {
                severity_vocabulary,
                ..
            }
            | EncodingSpec::Semantic {
                severity_vocabulary,
                ..
            } => severity_vocabulary,
        }
    }

    pub fn sex_vocabulary(&self) -> &[String] {
        match self {
            EncodingSpec::Categorical { sex_vocabulary, .. }
            | EncodingSpec::Semantic { sex_vocabulary, .. } => sex_vocabulary,
        }
    }

    fn validate(&self) -> Result<(), ArtifactLoadError> {
        if let EncodingSpec::Categorical {
            symptom_vocabulary,
            ..
        } = self
        {
            if !symptom_vocabulary.iter().any(String::is_empty) {
                return Err(ArtifactLoadError::Vocabulary(
                    "symptom vocabulary has no empty token".to_string(),
                ));
            }
            ensure_unique("symptom", symptom_vocabulary)?;
        }
        if let EncodingSpec::Semantic {
            embedding_dimension: 0,
            ..
        } = self
        {
            return Err(ArtifactLoadError::Vocabulary(
                "embedding dimension must be positive".to_string(),
            ));
        }
        if self.severity_vocabulary().is_empty() {
            return Err(ArtifactLoadError::Vocabulary(
                "severity vocabulary is empty".to_string(),
            ));
        }
        if self.sex_vocabulary().is_empty() {
            return Err(ArtifactLoadError::Vocabulary(
                "sex vocabulary is empty".to_string(),
            ));
        }
        ensure_unique("severity", self.severity_vocabulary())?;
        ensure_unique("sex", self.sex_vocabulary())?;
        Ok(())
    }
}

fn ensure_unique(name: &str, values: &[String]) -> Result<(), ArtifactLoadError> {
    let mut seen = HashSet::new();
    match values.iter().find(|v| !seen.insert(v.as_str())) {
        Some(dup) => Err(ArtifactLoadError::Vocabulary(format!(
            "{name} vocabulary lists '{dup}' twice"
        ))),
        None => Ok(()),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClassifierSpec {
    Forest { trees: Vec<DecisionTree> },
    Linear(LinearParameters),
}

/// Descriptive training metadata, reported back to callers as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    #[serde(default = "default_model_type")]
    pub model_type: String,
    #[serde(default)]
    pub training_samples: Option<u64>,
    #[serde(default)]
    pub reported_accuracy: Option<f64>,
}

impl Default for ArtifactMetadata {
    fn default() -> Self {
        Self {
            model_type: default_model_type(),
            training_samples: None,
            reported_accuracy: None,
        }
    }
}

fn default_model_type() -> String {
    "unspecified".to_string()
}

/// A validated, ready-to-serve model for one partition.
pub struct ClassifierArtifact {
    pub partition: Sex,
    pub labels: Vec<String>,
    pub feature_count: usize,
    pub encoding: EncodingSpec,
    pub classifier: Box<dyn Classifier>,
    pub metadata: ArtifactMetadata,
}

/// Conventional bundle location for a partition inside a model directory.
pub fn bundle_path(model_dir: &Path, sex: Sex) -> PathBuf {
    model_dir.join(format!("{sex}.bundle.json"))
}

impl ClassifierArtifact {
    /// Load `<model_dir>/<sex>.bundle.json`.
    pub fn load(model_dir: &Path, sex: Sex) -> Result<Self, ArtifactLoadError> {
        let path = bundle_path(model_dir, sex);
        let contents = std::fs::read_to_string(&path).map_err(|source| ArtifactLoadError::Io {
            path: path.clone(),
            source,
        })?;
        let artifact = Self::from_json(&contents, sex)?;
        info!(
            path = %path.display(),
            partition = %sex,
            labels = artifact.labels.len(),
            features = artifact.feature_count,
            classifier = artifact.classifier.kind(),
            "model bundle loaded"
        );
        Ok(artifact)
    }

    pub fn from_json(json: &str, expected: Sex) -> Result<Self, ArtifactLoadError> {
        let bundle: ModelBundle = serde_json::from_str(json)?;
        Self::from_bundle(bundle, expected)
    }

    pub fn from_bundle(bundle: ModelBundle, expected: Sex) -> Result<Self, ArtifactLoadError> {
        if bundle.format_version != BUNDLE_FORMAT_VERSION {
            return Err(ArtifactLoadError::UnsupportedVersion {
                found: bundle.format_version,
                supported: BUNDLE_FORMAT_VERSION,
            });
        }
        if bundle.partition != expected {
            return Err(ArtifactLoadError::PartitionMismatch {
                expected,
                found: bundle.partition,
            });
        }

        if bundle.labels.is_empty() {
            return Err(ArtifactLoadError::Labels("label set is empty".to_string()));
        }
        if bundle.labels.iter().any(|l| l.trim().is_empty()) {
            return Err(ArtifactLoadError::Labels("label set contains a blank label".to_string()));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = bundle.labels.iter().find(|l| !seen.insert(l.as_str())) {
            return Err(ArtifactLoadError::Labels(format!("label '{dup}' appears twice")));
        }

        bundle.encoding.validate()?;
        let implied = bundle.encoding.feature_count();
        if implied != bundle.feature_count {
            return Err(ArtifactLoadError::Shape {
                context: format!("{} encoding", bundle.encoding.strategy().as_str()),
                expected: bundle.feature_count,
                actual: implied,
            });
        }

        let label_count = bundle.labels.len();
        let classifier: Box<dyn Classifier> = match bundle.classifier {
            ClassifierSpec::Forest { trees } => Box::new(ForestClassifier::new(
                trees,
                bundle.feature_count,
                label_count,
            )?),
            ClassifierSpec::Linear(params) => Box::new(LinearClassifier::new(
                params,
                bundle.feature_count,
                label_count,
            )?),
        };

        Ok(Self {
            partition: bundle.partition,
            labels: bundle.labels,
            feature_count: bundle.feature_count,
            encoding: bundle.encoding,
            classifier,
            metadata: bundle.metadata,
        })
    }
}
