//! Concrete model families that implement [`Predictor`].
//!
//! Weights come from an external training run; these types only evaluate them.

use crate::error::ModelError;
use crate::scorer::Predictor;
use serde::{Deserialize, Serialize};

/// Linear regression: `intercept + sum(weights[i] * x[i])`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub weights: Vec<f64>,
    pub intercept: f64,
}

impl LinearModel {
    pub fn new(weights: Vec<f64>, intercept: f64) -> Self {
        Self { weights, intercept }
    }
}

impl Predictor for LinearModel {
    fn predict(&self, features: &[f64]) -> f64 {
        if features.len() != self.weights.len() {
            return f64::NAN;
        }
        self.intercept
            + self
                .weights
                .iter()
                .zip(features)
                .map(|(w, x)| w * x)
                .sum::<f64>()
    }

    fn name(&self) -> &str {
        "linear"
    }

    fn input_len(&self) -> Option<usize> {
        Some(self.weights.len())
    }
}

/// A node of a regression tree. Node 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeNode {
    /// Go `left` when `x[feature] <= threshold`, otherwise `right`.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

#[derive(Deserialize)]
struct TreeParts {
    n_features: usize,
    nodes: Vec<TreeNode>,
}

/// A single regression tree over `n_features` inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TreeParts")]
pub struct DecisionTree {
    n_features: usize,
    nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Build a tree, checking that every split points at later nodes and valid features.
    ///
    /// Children always come after their parent, so evaluation cannot loop.
    pub fn new(n_features: usize, nodes: Vec<TreeNode>) -> Result<Self, ModelError> {
        if nodes.is_empty() {
            return Err(ModelError::invalid_tree("tree has no nodes"));
        }
        for (index, node) in nodes.iter().enumerate() {
            if let TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } = *node
            {
                if feature >= n_features {
                    return Err(ModelError::invalid_tree(format!(
                        "node {index} splits on feature {feature} of {n_features}"
                    )));
                }
                if !threshold.is_finite() {
                    return Err(ModelError::invalid_tree(format!(
                        "node {index} has a non-finite threshold"
                    )));
                }
                for child in [left, right] {
                    if child <= index || child >= nodes.len() {
                        return Err(ModelError::invalid_tree(format!(
                            "node {index} points at node {child}"
                        )));
                    }
                }
            }
        }
        Ok(Self { n_features, nodes })
    }

    /// A tree that always predicts `value`.
    pub fn constant(n_features: usize, value: f64) -> Self {
        Self {
            n_features,
            nodes: vec![TreeNode::Leaf { value }],
        }
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[TreeNode], index: usize) -> usize {
            match nodes[index] {
                TreeNode::Leaf { .. } => 1,
                TreeNode::Split { left, right, .. } => {
                    1 + walk(nodes, left).max(walk(nodes, right))
                }
            }
        }
        walk(&self.nodes, 0)
    }
}

impl TryFrom<TreeParts> for DecisionTree {
    type Error = ModelError;

    fn try_from(parts: TreeParts) -> Result<Self, Self::Error> {
        Self::new(parts.n_features, parts.nodes)
    }
}

impl Predictor for DecisionTree {
    fn predict(&self, features: &[f64]) -> f64 {
        if features.len() != self.n_features {
            return f64::NAN;
        }
        let mut index = 0;
        loop {
            match self.nodes[index] {
                TreeNode::Leaf { value } => return value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if features[feature] <= threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }

    fn name(&self) -> &str {
        "decision_tree"
    }

    fn input_len(&self) -> Option<usize> {
        Some(self.n_features)
    }
}

/// How an ensemble combines its trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// Gradient boosting: trees add up.
    #[default]
    Sum,
    /// Random forest: trees are averaged.
    Mean,
}

#[derive(Deserialize)]
struct EnsembleParts {
    trees: Vec<DecisionTree>,
    #[serde(default)]
    base: f64,
    #[serde(default = "default_scale")]
    scale: f64,
    #[serde(default)]
    aggregation: Aggregation,
}

fn default_scale() -> f64 {
    1.0
}

/// Tree ensemble: `base + scale * aggregate(tree predictions)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "EnsembleParts")]
pub struct TreeEnsemble {
    trees: Vec<DecisionTree>,
    base: f64,
    scale: f64,
    aggregation: Aggregation,
}

impl TreeEnsemble {
    pub fn new(
        trees: Vec<DecisionTree>,
        base: f64,
        scale: f64,
        aggregation: Aggregation,
    ) -> Result<Self, ModelError> {
        let Some(first) = trees.first() else {
            return Err(ModelError::EmptyEnsemble);
        };
        let n_features = first.n_features();
        if let Some(odd) = trees.iter().find(|t| t.n_features() != n_features) {
            return Err(ModelError::FeatureCount {
                expected: n_features,
                actual: odd.n_features(),
            });
        }
        Ok(Self {
            trees,
            base,
            scale,
            aggregation,
        })
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }
}

impl TryFrom<EnsembleParts> for TreeEnsemble {
    type Error = ModelError;

    fn try_from(parts: EnsembleParts) -> Result<Self, Self::Error> {
        Self::new(parts.trees, parts.base, parts.scale, parts.aggregation)
    }
}

impl Predictor for TreeEnsemble {
    fn predict(&self, features: &[f64]) -> f64 {
        let total: f64 = self.trees.iter().map(|t| t.predict(features)).sum();
        let combined = match self.aggregation {
            Aggregation::Sum => total,
            Aggregation::Mean => total / self.trees.len() as f64,
        };
        self.base + self.scale * combined
    }

    fn name(&self) -> &str {
        match self.aggregation {
            Aggregation::Sum => "gradient_boosting",
            Aggregation::Mean => "random_forest",
        }
    }

    fn input_len(&self) -> Option<usize> {
        self.trees.first().map(DecisionTree::n_features)
    }
}
