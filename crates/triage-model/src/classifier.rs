use crate::error::ClassifierError;

/// A trained, immutable classifier over a fixed feature layout.
///
/// Implementations must be pure: the same input always yields the same
/// distribution, and nothing about the model changes after loading.
pub trait Classifier: Send + Sync {
    /// Short identifier of the algorithm, e.g. `"random_forest"`.
    fn kind(&self) -> &str;

    /// Number of features every input vector must have.
    fn feature_count(&self) -> usize;

    /// Number of labels in the output distribution.
    fn label_count(&self) -> usize;

    /// Probability of each label, in label order.
    fn predict_probabilities(&self, features: &[f64]) -> Result<Vec<f64>, ClassifierError>;
}

pub(crate) fn check_feature_count(
    expected: usize,
    features: &[f64],
) -> Result<(), ClassifierError> {
    if features.len() != expected {
        return Err(ClassifierError::FeatureCount {
            expected,
            actual: features.len(),
        });
    }
    Ok(())
}
