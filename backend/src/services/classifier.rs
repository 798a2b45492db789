//! Crop classifier and ranked prediction
//!
//! The trained model is a random forest exported to JSON as flattened node
//! arrays, one set per tree:
//!
//! ```json
//! {
//!   "classes": ["apple", "banana", ...],
//!   "n_features": 5,
//!   "feature_names": ["N", "temperature", "humidity", "ph", "rainfall"],
//!   "trees": [{
//!     "feature": [3, -2, -2],
//!     "threshold": [6.2, -2.0, -2.0],
//!     "children_left": [1, -1, -1],
//!     "children_right": [2, -1, -1],
//!     "value": [[10, 12], [10, 0], [0, 12]]
//!   }]
//! }
//! ```
//!
//! A sample goes left when `x[feature] <= threshold`. A leaf's class
//! distribution is its value row normalised to 1, and the forest's
//! distribution is the mean over its trees.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use shared::{FeatureVector, RankedPrediction, FEATURE_COUNT, FEATURE_NAMES};
use thiserror::Error;

use crate::error::AppResult;

/// Pretrained crop classifier
pub trait Classifier: Send + Sync {
    /// Every label the classifier can produce, in its internal order
    fn labels(&self) -> &[String];

    /// Probability of each label in [`Classifier::labels`] order
    fn predict_proba(&self, features: &FeatureVector) -> Vec<f64>;
}

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("failed to read model artifact {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse model artifact: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid model artifact: {0}")]
    Invalid(String),

    #[error("classifier produced invalid probability {probability} for {label}")]
    InvalidOutput { label: String, probability: f64 },
}

/// Ranks the full label distribution for a feature vector
#[derive(Clone)]
pub struct RankedPredictor {
    classifier: Arc<dyn Classifier>,
}

impl RankedPredictor {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self { classifier }
    }

    pub fn labels(&self) -> &[String] {
        self.classifier.labels()
    }

    /// Every known label with its probability, most likely first
    pub fn predict(&self, features: &FeatureVector) -> AppResult<RankedPrediction> {
        let probabilities = self.classifier.predict_proba(features);
        if let Some((label, &probability)) = self
            .classifier
            .labels()
            .iter()
            .zip(&probabilities)
            .find(|(_, p)| !p.is_finite() || **p < 0.0)
        {
            return Err(ModelError::InvalidOutput {
                label: label.clone(),
                probability,
            }
            .into());
        }
        Ok(RankedPrediction::from_distribution(
            self.classifier.labels(),
            &probabilities,
        )?)
    }
}

#[derive(Debug, Deserialize)]
struct ForestArtifact {
    classes: Vec<String>,
    n_features: usize,
    #[serde(default)]
    feature_names: Option<Vec<String>>,
    trees: Vec<TreeArtifact>,
}

#[derive(Debug, Deserialize)]
struct TreeArtifact {
    feature: Vec<i64>,
    threshold: Vec<f64>,
    children_left: Vec<i64>,
    children_right: Vec<i64>,
    value: Vec<Vec<f64>>,
}

#[derive(Debug, Clone)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        distribution: Vec<f64>,
    },
}

#[derive(Debug, Clone)]
struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    fn leaf_distribution(&self, x: &[f64]) -> &[f64] {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if x[*feature] <= *threshold { *left } else { *right };
                }
                Node::Leaf { distribution } => return distribution,
            }
        }
    }
}

/// Random forest loaded from a JSON artifact
#[derive(Debug, Clone)]
pub struct ForestClassifier {
    classes: Vec<String>,
    trees: Vec<DecisionTree>,
}

impl ForestClassifier {
    /// Load and validate the artifact at `path`
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ModelError> {
        let artifact: ForestArtifact = serde_json::from_str(raw)?;
        Self::from_artifact(artifact)
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    fn from_artifact(artifact: ForestArtifact) -> Result<Self, ModelError> {
        if artifact.classes.is_empty() {
            return Err(ModelError::Invalid("no classes".to_string()));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = artifact.classes.iter().find(|c| !seen.insert(c.as_str())) {
            return Err(ModelError::Invalid(format!("duplicate class {}", dup)));
        }
        if artifact.n_features != FEATURE_COUNT {
            return Err(ModelError::Invalid(format!(
                "model expects {} features, pipeline provides {}",
                artifact.n_features, FEATURE_COUNT
            )));
        }
        if let Some(names) = &artifact.feature_names {
            if names.iter().map(String::as_str).ne(FEATURE_NAMES.iter().copied()) {
                return Err(ModelError::Invalid(format!(
                    "feature order {:?} does not match {:?}",
                    names, FEATURE_NAMES
                )));
            }
        }
        if artifact.trees.is_empty() {
            return Err(ModelError::Invalid("forest has no trees".to_string()));
        }

        let n_classes = artifact.classes.len();
        let trees = artifact
            .trees
            .into_iter()
            .enumerate()
            .map(|(i, tree)| {
                build_tree(tree, n_classes)
                    .map_err(|msg| ModelError::Invalid(format!("tree {}: {}", i, msg)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            classes: artifact.classes,
            trees,
        })
    }
}

fn build_tree(tree: TreeArtifact, n_classes: usize) -> Result<DecisionTree, String> {
    let n_nodes = tree.feature.len();
    if n_nodes == 0 {
        return Err("no nodes".to_string());
    }
    if tree.threshold.len() != n_nodes
        || tree.children_left.len() != n_nodes
        || tree.children_right.len() != n_nodes
        || tree.value.len() != n_nodes
    {
        return Err("node arrays have different lengths".to_string());
    }

    let mut nodes = Vec::with_capacity(n_nodes);
    for idx in 0..n_nodes {
        let (left, right) = (tree.children_left[idx], tree.children_right[idx]);

        if left < 0 || right < 0 {
            if left >= 0 || right >= 0 {
                return Err(format!("node {} has a single child", idx));
            }
            let row = &tree.value[idx];
            if row.len() != n_classes {
                return Err(format!(
                    "leaf {} has {} class weights, expected {}",
                    idx,
                    row.len(),
                    n_classes
                ));
            }
            if row.iter().any(|w| !w.is_finite() || *w < 0.0) {
                return Err(format!("leaf {} has invalid class weights", idx));
            }
            let total: f64 = row.iter().sum();
            if total <= 0.0 {
                return Err(format!("leaf {} has no class weight", idx));
            }
            nodes.push(Node::Leaf {
                distribution: row.iter().map(|w| w / total).collect(),
            });
            continue;
        }

        let feature = usize::try_from(tree.feature[idx])
            .ok()
            .filter(|f| *f < FEATURE_COUNT)
            .ok_or_else(|| format!("node {} splits on unknown feature {}", idx, tree.feature[idx]))?;
        let threshold = tree.threshold[idx];
        if !threshold.is_finite() {
            return Err(format!("node {} has a non-finite threshold", idx));
        }
        // Children always follow their parent, which also rules out cycles
        let (left, right) = (left as usize, right as usize);
        if left <= idx || right <= idx || left >= n_nodes || right >= n_nodes {
            return Err(format!("node {} has out-of-order children", idx));
        }

        nodes.push(Node::Split {
            feature,
            threshold,
            left,
            right,
        });
    }

    Ok(DecisionTree { nodes })
}

impl Classifier for ForestClassifier {
    fn labels(&self) -> &[String] {
        &self.classes
    }

    fn predict_proba(&self, features: &FeatureVector) -> Vec<f64> {
        let x = features.as_slice();
        let mut probabilities = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            for (p, w) in probabilities.iter_mut().zip(tree.leaf_distribution(x)) {
                *p += w;
            }
        }

        let n_trees = self.trees.len() as f64;
        probabilities.iter_mut().for_each(|p| *p /= n_trees);
        probabilities
    }
}
