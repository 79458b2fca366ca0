//! Gradient-boosted regression tree ensembles exported as JSON.
//!
//! ```json
//! {
//!   "target": "CO2 emissions (g/km)",
//!   "base_score": 0.0,
//!   "feature_names": ["Model year", "Engine size (L)", "Cylinders", "..."],
//!   "trees": [
//!     { "nodes": [
//!         {"feature": 1, "threshold": 2.5, "left": 1, "right": 2},
//!         {"leaf": 170.0},
//!         {"leaf": 250.0}
//!     ] }
//!   ]
//! }
//! ```
//!
//! Traversal starts at node 0 and goes left when `x < threshold`. The
//! prediction is `base_score` plus the leaf value reached in every tree.

use serde::{Deserialize, Serialize};

use super::regressor::Regressor;
use crate::encoding::FeatureSchema;
use crate::error::{InferenceError, ModelError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        leaf: f64,
    },
}

impl Node {
    pub fn split(feature: usize, threshold: f64, left: usize, right: usize) -> Self {
        Node::Split {
            feature,
            threshold,
            left,
            right,
        }
    }

    pub fn leaf(value: f64) -> Self {
        Node::Leaf { leaf: value }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    pub target: String,
    #[serde(default)]
    pub base_score: f64,
    pub feature_names: Vec<String>,
    pub trees: Vec<Tree>,
}

impl TreeEnsemble {
    /// Checks the ensemble against the fitted schema and its own structure.
    pub fn validate(&self, schema: &FeatureSchema) -> Result<(), ModelError> {
        if self.feature_names.as_slice() != schema.columns() {
            return Err(ModelError::SchemaMismatch {
                model: self.target.clone(),
                expected: schema.columns().to_vec(),
                found: self.feature_names.clone(),
            });
        }

        if self.trees.is_empty() {
            return Err(ModelError::Empty {
                model: self.target.clone(),
            });
        }

        let width = self.feature_names.len();
        for (t, tree) in self.trees.iter().enumerate() {
            let invalid = |node: usize, reason: String| ModelError::InvalidNode {
                model: self.target.clone(),
                tree: t,
                node,
                reason,
            };

            if tree.nodes.is_empty() {
                return Err(invalid(0, "tree has no nodes".to_string()));
            }

            for (i, node) in tree.nodes.iter().enumerate() {
                if let Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } = node
                {
                    if *feature >= width {
                        return Err(invalid(i, format!("feature index {feature} out of range")));
                    }
                    if !threshold.is_finite() {
                        return Err(invalid(i, "threshold is not finite".to_string()));
                    }
                    for child in [*left, *right] {
                        if child >= tree.nodes.len() || child == i {
                            return Err(invalid(i, format!("child index {child} is invalid")));
                        }
                    }
                }
            }
        }

        Ok(())
    }

    fn tree_value(&self, t: usize, tree: &Tree, features: &[f64]) -> Result<f64, InferenceError> {
        let malformed = |reason: String| InferenceError::MalformedTree {
            model: self.target.clone(),
            tree: t,
            reason,
        };

        let mut i = 0;
        // A well-formed tree reaches a leaf in fewer steps than it has nodes.
        for _ in 0..tree.nodes.len() {
            match tree
                .nodes
                .get(i)
                .ok_or_else(|| malformed(format!("node {i} does not exist")))?
            {
                Node::Leaf { leaf } => return Ok(*leaf),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let x = features
                        .get(*feature)
                        .ok_or_else(|| malformed(format!("feature {feature} out of range")))?;
                    i = if *x < *threshold { *left } else { *right };
                }
            }
        }

        Err(malformed("traversal did not reach a leaf".to_string()))
    }
}

impl Regressor for TreeEnsemble {
    fn name(&self) -> &str {
        &self.target
    }

    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict(&self, features: &[f64]) -> Result<f64, InferenceError> {
        if features.len() != self.feature_names.len() {
            return Err(InferenceError::FeatureWidth {
                model: self.target.clone(),
                expected: self.feature_names.len(),
                found: features.len(),
            });
        }

        let mut total = self.base_score;
        for (t, tree) in self.trees.iter().enumerate() {
            total += self.tree_value(t, tree, features)?;
        }

        if total.is_finite() {
            Ok(total)
        } else {
            Err(InferenceError::NonFinite {
                model: self.target.clone(),
            })
        }
    }
}
