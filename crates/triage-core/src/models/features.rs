use serde::{Deserialize, Serialize};

/// How symptom slots are turned into numeric features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodingStrategy {
    /// One vocabulary index per slot.
    Categorical,
    /// A dense sentence embedding of the joined symptom text.
    Semantic,
}

impl EncodingStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            EncodingStrategy::Categorical => "categorical",
            EncodingStrategy::Semantic => "semantic",
        }
    }
}

/// Classifier input: `[age] ++ symptom block ++ [severity] ++ [sex]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}
