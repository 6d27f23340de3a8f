use serde::{Deserialize, Serialize};

use crate::classifier::{check_feature_count, Classifier};
use crate::error::{ArtifactLoadError, ClassifierError};

/// A node of a binary decision tree, stored in a flat array.
///
/// Inputs with `features[feature] <= threshold` go to `left`, everything
/// else (including NaN) goes to `right`. Children always have a larger index
/// than their parent, which rules out cycles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        /// Per-label training counts (or weights) that reached this leaf.
        value: Vec<f64>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

/// Random-forest style ensemble: the predicted distribution is the mean of
/// every tree's normalized leaf distribution.
#[derive(Debug, Clone)]
pub struct ForestClassifier {
    trees: Vec<DecisionTree>,
    feature_count: usize,
    label_count: usize,
}

impl ForestClassifier {
    /// Validate the trees against the declared shape and normalize every
    /// leaf into a probability distribution.
    pub fn new(
        mut trees: Vec<DecisionTree>,
        feature_count: usize,
        label_count: usize,
    ) -> Result<Self, ArtifactLoadError> {
        if trees.is_empty() {
            return Err(ArtifactLoadError::InvalidClassifier(
                "forest has no trees".to_string(),
            ));
        }

        for (t, tree) in trees.iter_mut().enumerate() {
            validate_tree(t, tree, feature_count, label_count)?;
            for node in &mut tree.nodes {
                if let TreeNode::Leaf { value } = node {
                    let total: f64 = value.iter().sum();
                    value.iter_mut().for_each(|v| *v /= total);
                }
            }
        }

        Ok(Self {
            trees,
            feature_count,
            label_count,
        })
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }
}

fn validate_tree(
    t: usize,
    tree: &DecisionTree,
    feature_count: usize,
    label_count: usize,
) -> Result<(), ArtifactLoadError> {
    let invalid = |msg: String| ArtifactLoadError::InvalidClassifier(format!("tree {t}: {msg}"));

    if tree.nodes.is_empty() {
        return Err(invalid("has no nodes".to_string()));
    }

    let len = tree.nodes.len();
    for (i, node) in tree.nodes.iter().enumerate() {
        match node {
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if *feature >= feature_count {
                    return Err(invalid(format!(
                        "node {i} splits on feature {feature}, but only {feature_count} features exist"
                    )));
                }
                if !threshold.is_finite() {
                    return Err(invalid(format!("node {i} has a non-finite threshold")));
                }
                for child in [*left, *right] {
                    if child <= i || child >= len {
                        return Err(invalid(format!(
                            "node {i} points to child {child}; children must come after their parent and within {len} nodes"
                        )));
                    }
                }
            }
            TreeNode::Leaf { value } => {
                if value.len() != label_count {
                    return Err(invalid(format!(
                        "leaf {i} has {} values, expected {label_count}",
                        value.len()
                    )));
                }
                if value.iter().any(|v| !v.is_finite() || *v < 0.0) {
                    return Err(invalid(format!("leaf {i} has a negative or non-finite value")));
                }
                if value.iter().sum::<f64>() <= 0.0 {
                    return Err(invalid(format!("leaf {i} has no mass")));
                }
            }
        }
    }
    Ok(())
}

impl DecisionTree {
    fn leaf(&self, features: &[f64]) -> &[f64] {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if features[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
                TreeNode::Leaf { value } => return value,
            }
        }
    }
}

impl Classifier for ForestClassifier {
    fn kind(&self) -> &str {
        "random_forest"
    }

    fn feature_count(&self) -> usize {
        self.feature_count
    }

    fn label_count(&self) -> usize {
        self.label_count
    }

    fn predict_probabilities(&self, features: &[f64]) -> Result<Vec<f64>, ClassifierError> {
        check_feature_count(self.feature_count, features)?;

        let mut probabilities = vec![0.0; self.label_count];
        for tree in &self.trees {
            for (acc, p) in probabilities.iter_mut().zip(tree.leaf(features)) {
                *acc += p;
            }
        }

        let n = self.trees.len() as f64;
        probabilities.iter_mut().for_each(|p| *p /= n);
        Ok(probabilities)
    }
}
