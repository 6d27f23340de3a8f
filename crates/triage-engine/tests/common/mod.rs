#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use triage_core::models::demographics::Sex;
use triage_engine::encode::{CategoricalEncoder, SemanticEncoder};
use triage_engine::router::{ModelRegistry, Partition};
use triage_model::bundle::ArtifactMetadata;
use triage_model::classifier::Classifier;
use triage_model::embedding::EmbeddingProvider;
use triage_model::error::{ClassifierError, EmbeddingError};
use triage_model::linear::{LinearClassifier, LinearParameters};

pub fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../fixtures/models")
}

pub fn fixture_registry() -> ModelRegistry {
    ModelRegistry::load(&fixture_dir(), None).expect("fixture bundles load")
}

pub fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

/// Returns a fixed distribution and counts how often it was asked.
pub struct StubClassifier {
    pub distribution: Vec<f64>,
    pub calls: Arc<AtomicUsize>,
    pub panics: bool,
}

impl StubClassifier {
    pub fn new(distribution: Vec<f64>) -> Self {
        Self {
            distribution,
            calls: Arc::default(),
            panics: false,
        }
    }

    pub fn panicking(label_count: usize) -> Self {
        Self {
            distribution: vec![1.0 / label_count as f64; label_count],
            calls: Arc::default(),
            panics: true,
        }
    }
}

impl Classifier for StubClassifier {
    fn kind(&self) -> &str {
        "stub"
    }

    fn feature_count(&self) -> usize {
        9
    }

    fn label_count(&self) -> usize {
        self.distribution.len()
    }

    fn predict_probabilities(&self, features: &[f64]) -> Result<Vec<f64>, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.panics {
            panic!("stub classifier exploded");
        }
        assert_eq!(features.len(), 9);
        Ok(self.distribution.clone())
    }
}

/// Categorical partition over a small vocabulary with a stub classifier.
/// Returns the partition and the classifier's call counter.
pub fn stub_partition(
    sex: Sex,
    labels: &[&str],
    classifier: StubClassifier,
) -> (Partition, Arc<AtomicUsize>) {
    let calls = Arc::clone(&classifier.calls);
    let encoder = CategoricalEncoder::new(
        &strings(&["", "cough", "fever", "headache"]),
        strings(&["high", "low", "medium"]),
        strings(&[sex.as_str()]),
    )
    .unwrap();
    let partition = Partition::new(
        sex,
        strings(labels),
        Box::new(classifier),
        Box::new(encoder),
        ArtifactMetadata::default(),
    )
    .unwrap();
    (partition, calls)
}

pub struct StubRegistry {
    pub registry: ModelRegistry,
    pub male_calls: Arc<AtomicUsize>,
    pub female_calls: Arc<AtomicUsize>,
}

impl StubRegistry {
    pub fn calls(&self) -> usize {
        self.male_calls.load(Ordering::SeqCst) + self.female_calls.load(Ordering::SeqCst)
    }
}

pub fn stub_registry(
    labels: &[&str],
    male: StubClassifier,
    female: StubClassifier,
) -> StubRegistry {
    let (male, male_calls) = stub_partition(Sex::Male, labels, male);
    let (female, female_calls) = stub_partition(Sex::Female, labels, female);
    StubRegistry {
        registry: ModelRegistry::from_partitions([male, female]).unwrap(),
        male_calls,
        female_calls,
    }
}

/// Semantic partitions over a 4-dimensional embedding. The classifier
/// scores "Stroke" by the sum of the embedding values, so any non-zero
/// embedding makes it the primary condition.
pub fn semantic_registry(embedder: Arc<dyn EmbeddingProvider>) -> ModelRegistry {
    let partitions = Sex::ALL.map(|sex| {
        let encoder = SemanticEncoder::new(
            Arc::clone(&embedder),
            4,
            strings(&["high", "low", "medium"]),
            strings(&[sex.as_str()]),
        )
        .unwrap();
        let classifier = LinearClassifier::new(
            LinearParameters {
                weights: vec![vec![0.0; 7], vec![0.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0]],
                bias: vec![0.0, 0.0],
            },
            7,
            2,
        )
        .unwrap();
        Partition::new(
            sex,
            strings(&["Common Cold", "Stroke"]),
            Box::new(classifier),
            Box::new(encoder),
            ArtifactMetadata::default(),
        )
        .unwrap()
    });
    ModelRegistry::from_partitions(partitions).unwrap()
}

/// Deterministic bag-of-bytes embedding. Different texts (including
/// permutations of the same words joined differently) give different
/// vectors; identical texts give identical vectors.
pub struct TestEmbedder {
    pub dimension: usize,
    pub texts: std::sync::Mutex<Vec<String>>,
}

impl TestEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            texts: std::sync::Mutex::new(Vec::new()),
        }
    }
}

impl EmbeddingProvider for TestEmbedder {
    fn name(&self) -> &str {
        "test"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.texts.lock().unwrap().push(text.to_string());
        let mut v = vec![0.0f32; self.dimension];
        for (i, b) in text.bytes().enumerate() {
            v[(i + b as usize) % self.dimension] += (b as f32) / 255.0;
        }
        Ok(v)
    }
}

/// Always fails with the given error.
pub struct FailingEmbedder {
    pub dimension: usize,
    pub timeout: bool,
}

impl EmbeddingProvider for FailingEmbedder {
    fn name(&self) -> &str {
        "failing"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if self.timeout {
            Err(EmbeddingError::Timeout)
        } else {
            Err(EmbeddingError::Transport("connection refused".to_string()))
        }
    }
}
