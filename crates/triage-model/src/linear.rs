use serde::{Deserialize, Serialize};

use crate::classifier::{check_feature_count, Classifier};
use crate::error::{ArtifactLoadError, ClassifierError};

/// Serialized multinomial logistic regression parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearParameters {
    /// One row of `feature_count` weights per label.
    pub weights: Vec<Vec<f64>>,
    /// One intercept per label.
    pub bias: Vec<f64>,
}

/// Multinomial logistic regression: `softmax(W·x + b)`.
#[derive(Debug, Clone)]
pub struct LinearClassifier {
    weights: Vec<Vec<f64>>,
    bias: Vec<f64>,
    feature_count: usize,
}

impl LinearClassifier {
    pub fn new(
        params: LinearParameters,
        feature_count: usize,
        label_count: usize,
    ) -> Result<Self, ArtifactLoadError> {
        let LinearParameters { weights, bias } = params;

        if weights.len() != label_count || bias.len() != label_count {
            return Err(ArtifactLoadError::InvalidClassifier(format!(
                "linear model has {} weight rows and {} biases, expected {label_count} of each",
                weights.len(),
                bias.len()
            )));
        }
        if let Some((label, row)) = weights
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != feature_count)
        {
            return Err(ArtifactLoadError::Shape {
                context: format!("weight row {label}"),
                expected: feature_count,
                actual: row.len(),
            });
        }
        if weights.iter().flatten().chain(&bias).any(|v| !v.is_finite()) {
            return Err(ArtifactLoadError::InvalidClassifier(
                "linear model has non-finite parameters".to_string(),
            ));
        }

        Ok(Self {
            weights,
            bias,
            feature_count,
        })
    }
}

impl Classifier for LinearClassifier {
    fn kind(&self) -> &str {
        "logistic_regression"
    }

    fn feature_count(&self) -> usize {
        self.feature_count
    }

    fn label_count(&self) -> usize {
        self.bias.len()
    }

    fn predict_probabilities(&self, features: &[f64]) -> Result<Vec<f64>, ClassifierError> {
        check_feature_count(self.feature_count, features)?;

        let logits: Vec<f64> = self
            .weights
            .iter()
            .zip(&self.bias)
            .map(|(row, b)| row.iter().zip(features).map(|(w, x)| w * x).sum::<f64>() + b)
            .collect();

        // Shift by the max logit so exp() cannot overflow.
        let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if !max.is_finite() {
            return Err(ClassifierError::NonFinite);
        }
        let exps: Vec<f64> = logits.iter().map(|l| (l - max).exp()).collect();
        let total: f64 = exps.iter().sum();

        Ok(exps.into_iter().map(|e| e / total).collect())
    }
}
