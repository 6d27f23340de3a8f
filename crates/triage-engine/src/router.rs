//! Demographic routing: one independently trained model per sex.
//!
//! Partitions never share labels, vocabularies, or classifiers, so a request
//! can only ever be scored by the model trained on its own demographic.

use std::path::Path;
use std::sync::{Arc, RwLock};

use tracing::info;
use triage_core::models::demographics::Sex;
use triage_model::bundle::{ArtifactMetadata, ClassifierArtifact};
use triage_model::classifier::Classifier;
use triage_model::embedding::EmbeddingProvider;
use triage_model::error::ArtifactLoadError;

use crate::encode::{encoder_for, FeatureEncoder};

/// Everything needed to score a request for one sex.
pub struct Partition {
    sex: Sex,
    labels: Vec<String>,
    classifier: Box<dyn Classifier>,
    encoder: Box<dyn FeatureEncoder>,
    metadata: ArtifactMetadata,
}

impl Partition {
    /// Assemble a partition, checking that the encoder, classifier, and
    /// label set agree on shape.
    pub fn new(
        sex: Sex,
        labels: Vec<String>,
        classifier: Box<dyn Classifier>,
        encoder: Box<dyn FeatureEncoder>,
        metadata: ArtifactMetadata,
    ) -> Result<Self, ArtifactLoadError> {
        if encoder.feature_count() != classifier.feature_count() {
            return Err(ArtifactLoadError::Shape {
                context: format!("{sex} {} encoder", encoder.strategy().as_str()),
                expected: classifier.feature_count(),
                actual: encoder.feature_count(),
            });
        }
        if labels.len() != classifier.label_count() {
            return Err(ArtifactLoadError::InvalidClassifier(format!(
                "{sex} classifier scores {} labels but the label set has {}",
                classifier.label_count(),
                labels.len()
            )));
        }
        Ok(Self {
            sex,
            labels,
            classifier,
            encoder,
            metadata,
        })
    }

    pub fn from_artifact(
        artifact: ClassifierArtifact,
        embedder: Option<Arc<dyn EmbeddingProvider>>,
    ) -> Result<Self, ArtifactLoadError> {
        let encoder = encoder_for(&artifact.encoding, embedder)?;
        if encoder.feature_count() != artifact.feature_count {
            return Err(ArtifactLoadError::Shape {
                context: format!("{} bundle", artifact.partition),
                expected: artifact.feature_count,
                actual: encoder.feature_count(),
            });
        }
        Self::new(
            artifact.partition,
            artifact.labels,
            artifact.classifier,
            encoder,
            artifact.metadata,
        )
    }

    pub fn sex(&self) -> Sex {
        self.sex
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    pub fn encoder(&self) -> &dyn FeatureEncoder {
        self.encoder.as_ref()
    }

    pub fn metadata(&self) -> &ArtifactMetadata {
        &self.metadata
    }
}

/// Immutable set of loaded partitions. Both sexes are always present.
pub struct ModelRegistry {
    male: Partition,
    female: Partition,
}

impl ModelRegistry {
    /// Build a registry from partitions in any order. Fails if either sex is
    /// missing.
    pub fn from_partitions(
        partitions: impl IntoIterator<Item = Partition>,
    ) -> Result<Self, ArtifactLoadError> {
        let mut male = None;
        let mut female = None;
        for partition in partitions {
            match partition.sex {
                Sex::Male => male = Some(partition),
                Sex::Female => female = Some(partition),
            }
        }
        Ok(Self {
            male: male.ok_or(ArtifactLoadError::MissingPartition(Sex::Male))?,
            female: female.ok_or(ArtifactLoadError::MissingPartition(Sex::Female))?,
        })
    }

    /// Load `<model_dir>/male.bundle.json` and `<model_dir>/female.bundle.json`.
    pub fn load(
        model_dir: &Path,
        embedder: Option<Arc<dyn EmbeddingProvider>>,
    ) -> Result<Self, ArtifactLoadError> {
        let mut partitions = Vec::with_capacity(Sex::ALL.len());
        for sex in Sex::ALL {
            let artifact = ClassifierArtifact::load(model_dir, sex)?;
            partitions.push(Partition::from_artifact(artifact, embedder.clone())?);
        }
        let registry = Self::from_partitions(partitions)?;
        info!(model_dir = %model_dir.display(), "model registry ready");
        Ok(registry)
    }

    pub fn route(&self, sex: Sex) -> &Partition {
        match sex {
            Sex::Male => &self.male,
            Sex::Female => &self.female,
        }
    }

    pub fn partitions(&self) -> impl Iterator<Item = &Partition> {
        [&self.male, &self.female].into_iter()
    }
}

/// Swappable pointer to the live registry. Readers take a cheap `Arc`
/// snapshot; a reload replaces the whole registry at once, and requests
/// already in flight keep the snapshot they started with.
pub struct RegistryHandle {
    current: RwLock<Arc<ModelRegistry>>,
}

impl RegistryHandle {
    pub fn new(registry: ModelRegistry) -> Self {
        Self {
            current: RwLock::new(Arc::new(registry)),
        }
    }

    pub fn current(&self) -> Arc<ModelRegistry> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Install a new registry, returning the one it replaced.
    pub fn replace(&self, registry: ModelRegistry) -> Arc<ModelRegistry> {
        let next = Arc::new(registry);
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        std::mem::replace(&mut *guard, next)
    }
}
