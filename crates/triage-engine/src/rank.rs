//! Classifier distribution to an ordered candidate list.

use crate::error::InferenceError;

/// Allowed drift of a distribution's sum from 1.
pub const PROBABILITY_SUM_TOLERANCE: f64 = 1e-3;

/// Default number of candidates returned.
pub const DEFAULT_TOP_K: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct RankedLabel {
    /// Position of the label in the classifier's label order.
    pub label_index: usize,
    pub condition: String,
    pub probability: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct RankingAssembler {
    top_k: usize,
}

impl Default for RankingAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_K)
    }
}

impl RankingAssembler {
    /// `top_k` of zero is treated as one: a result always has a primary.
    pub fn new(top_k: usize) -> Self {
        Self {
            top_k: top_k.max(1),
        }
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Check the distribution and return the top `min(top_k, K)` labels,
    /// highest probability first. Equal probabilities keep label order.
    pub fn rank(
        &self,
        labels: &[String],
        probabilities: &[f64],
    ) -> Result<Vec<RankedLabel>, InferenceError> {
        check_distribution(labels.len(), probabilities)?;

        let mut order: Vec<usize> = (0..labels.len()).collect();
        order.sort_by(|&a, &b| probabilities[b].total_cmp(&probabilities[a]));

        Ok(order
            .into_iter()
            .take(self.top_k.min(labels.len()))
            .map(|i| RankedLabel {
                label_index: i,
                condition: labels[i].clone(),
                probability: probabilities[i],
            })
            .collect())
    }
}

fn check_distribution(label_count: usize, probabilities: &[f64]) -> Result<(), InferenceError> {
    if probabilities.len() != label_count {
        return Err(InferenceError::LabelMismatch {
            expected: label_count,
            actual: probabilities.len(),
        });
    }
    if label_count == 0 {
        return Err(InferenceError::InvalidDistribution(
            "empty distribution".to_string(),
        ));
    }
    if let Some(p) = probabilities
        .iter()
        .find(|p| !p.is_finite() || **p < 0.0 || **p > 1.0)
    {
        return Err(InferenceError::InvalidDistribution(format!(
            "probability {p} outside [0, 1]"
        )));
    }
    let sum: f64 = probabilities.iter().sum();
    if (sum - 1.0).abs() > PROBABILITY_SUM_TOLERANCE {
        return Err(InferenceError::InvalidDistribution(format!(
            "probabilities sum to {sum}"
        )));
    }
    Ok(())
}

/// Caller-facing percentage with one decimal, e.g. `0.82` → `"82.0%"`.
pub fn format_confidence(probability: f64) -> String {
    format!("{:.1}%", probability * 100.0)
}
