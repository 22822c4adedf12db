use crate::error::{AppError, Result};
use crate::ml::features::{FeatureVector, N_FEATURES};
use crate::ml::predictor::Regressor;
use serde::Deserialize;
use std::path::Path;

/// Objectives whose prediction equals the raw margin (identity link)
const IDENTITY_OBJECTIVES: [&str; 5] = [
    "reg:squarederror",
    "reg:linear",
    "reg:squaredlogerror",
    "reg:pseudohubererror",
    "reg:absoluteerror",
];

/// A single node of a regression tree
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f32,
        left: usize,
        right: usize,
        default_left: bool,
        cover: f64,
    },
    Leaf {
        value: f64,
        cover: f64,
    },
}

impl TreeNode {
    pub fn cover(&self) -> f64 {
        match self {
            TreeNode::Split { cover, .. } | TreeNode::Leaf { cover, .. } => *cover,
        }
    }
}

/// Binary regression tree stored as a flat node array with the root at index 0
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionTree {
    nodes: Vec<TreeNode>,
}

impl RegressionTree {
    /// Build a tree, checking that every child index points forward and in range
    pub fn new(nodes: Vec<TreeNode>) -> Result<Self> {
        if nodes.is_empty() {
            return Err(AppError::Startup("tree has no nodes".to_string()));
        }

        for (idx, node) in nodes.iter().enumerate() {
            if let TreeNode::Split {
                left, right, cover, ..
            } = node
            {
                for child in [*left, *right] {
                    if child <= idx || child >= nodes.len() {
                        return Err(AppError::Startup(format!(
                            "node {} has invalid child index {}",
                            idx, child
                        )));
                    }
                }
                if cover.is_nan() || *cover <= 0.0 {
                    return Err(AppError::Startup(format!(
                        "split node {} has non-positive cover {}",
                        idx, cover
                    )));
                }
            }
        }

        Ok(Self { nodes })
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> &TreeNode {
        &self.nodes[index]
    }

    /// Child an input follows at a split node (the "hot" branch).
    ///
    /// Values are compared in single precision like the training library;
    /// missing and NaN values follow the learned default direction.
    pub fn follow(&self, index: usize, x: &FeatureVector) -> usize {
        match self.nodes[index] {
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
                default_left,
                ..
            } => {
                let goes_left = match x.value(feature) {
                    Some(v) if !v.is_nan() => (v as f32) < threshold,
                    _ => default_left,
                };
                if goes_left {
                    left
                } else {
                    right
                }
            }
            TreeNode::Leaf { .. } => index,
        }
    }

    /// Leaf output for an input
    pub fn predict(&self, x: &FeatureVector) -> f64 {
        let mut index = 0;
        loop {
            match self.nodes[index] {
                TreeNode::Leaf { value, .. } => return value,
                TreeNode::Split { .. } => index = self.follow(index, x),
            }
        }
    }

    /// Cover-weighted mean leaf value, i.e. the tree's output with every feature unknown
    pub fn expected_value(&self) -> f64 {
        self.expected_from(0)
    }

    fn expected_from(&self, index: usize) -> f64 {
        match self.nodes[index] {
            TreeNode::Leaf { value, .. } => value,
            TreeNode::Split {
                left, right, cover, ..
            } => {
                let left_cover = self.nodes[left].cover();
                let right_cover = self.nodes[right].cover();
                (left_cover * self.expected_from(left) + right_cover * self.expected_from(right))
                    / cover
            }
        }
    }

    /// Number of edges on the longest root-to-leaf path
    pub fn max_depth(&self) -> usize {
        fn depth(tree: &RegressionTree, index: usize) -> usize {
            match tree.nodes[index] {
                TreeNode::Leaf { .. } => 0,
                TreeNode::Split { left, right, .. } => 1 + depth(tree, left).max(depth(tree, right)),
            }
        }
        depth(self, 0)
    }

    /// Highest feature index used by any split
    fn max_feature(&self) -> Option<usize> {
        self.nodes
            .iter()
            .filter_map(|n| match n {
                TreeNode::Split { feature, .. } => Some(*feature),
                TreeNode::Leaf { .. } => None,
            })
            .max()
    }
}

/// Immutable gradient-boosted regression tree ensemble.
///
/// Loaded once at startup and shared read-only across request handlers.
/// Evaluation touches no interior mutability, so concurrent calls need no lock.
#[derive(Debug, Clone)]
pub struct TreeEnsemble {
    trees: Vec<RegressionTree>,
    base_score: f64,
    n_features: usize,
    feature_names: Option<Vec<String>>,
}

impl TreeEnsemble {
    /// Create an ensemble from prebuilt trees
    pub fn new(trees: Vec<RegressionTree>, base_score: f64, n_features: usize) -> Result<Self> {
        if trees.is_empty() {
            return Err(AppError::Startup("model contains no trees".to_string()));
        }

        for (idx, tree) in trees.iter().enumerate() {
            if let Some(feature) = tree.max_feature() {
                if feature >= n_features {
                    return Err(AppError::Startup(format!(
                        "tree {} splits on feature {} but the model declares {} features",
                        idx, feature, n_features
                    )));
                }
            }
        }

        Ok(Self {
            trees,
            base_score,
            n_features,
            feature_names: None,
        })
    }

    /// Attach the feature names recorded in the artifact
    pub fn with_feature_names(mut self, names: Vec<String>) -> Self {
        self.feature_names = Some(names);
        self
    }

    /// Load an XGBoost JSON model artifact from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            AppError::Startup(format!("failed to read model '{}': {}", path.display(), e))
        })?;
        Self::from_xgboost_json(&text)
    }

    /// Parse an XGBoost JSON model (`Booster.save_model("*.json")` format)
    pub fn from_xgboost_json(text: &str) -> Result<Self> {
        let document: XgbDocument = serde_json::from_str(text)
            .map_err(|e| AppError::Startup(format!("malformed model artifact: {}", e)))?;
        let learner = document.learner;

        if let Some(objective) = &learner.objective {
            if !IDENTITY_OBJECTIVES.contains(&objective.name.as_str()) {
                return Err(AppError::Startup(format!(
                    "unsupported objective '{}': only identity-link regression models are accepted",
                    objective.name
                )));
            }
        }

        if learner.gradient_booster.name != "gbtree" {
            return Err(AppError::Startup(format!(
                "unsupported booster '{}': expected gbtree",
                learner.gradient_booster.name
            )));
        }

        let params = &learner.learner_model_param;
        let n_features = parse_param::<usize>("num_feature", &params.num_feature)?;
        let base_score = parse_param::<f64>("base_score", &params.base_score)?;
        if let Some(num_target) = &params.num_target {
            let num_target = parse_param::<usize>("num_target", num_target)?;
            if num_target > 1 {
                return Err(AppError::Startup(format!(
                    "multi-output models are not supported (num_target = {})",
                    num_target
                )));
            }
        }

        let model = learner
            .gradient_booster
            .model
            .ok_or_else(|| AppError::Startup("gbtree model section missing".to_string()))?;

        let trees = model
            .trees
            .into_iter()
            .enumerate()
            .map(|(idx, tree)| tree.into_tree(idx))
            .collect::<Result<Vec<_>>>()?;

        let ensemble = Self::new(trees, base_score, n_features)?;
        if learner.feature_names.is_empty() {
            Ok(ensemble)
        } else {
            Ok(ensemble.with_feature_names(learner.feature_names))
        }
    }

    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn base_score(&self) -> f64 {
        self.base_score
    }

    pub fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    pub fn max_depth(&self) -> usize {
        self.trees.iter().map(|t| t.max_depth()).max().unwrap_or(0)
    }

    /// Mean model output over the training distribution encoded in node covers
    pub fn expected_value(&self) -> f64 {
        self.base_score + self.trees.iter().map(|t| t.expected_value()).sum::<f64>()
    }

    /// Reject inference when the intake schema differs from the trained one
    pub fn check_schema(&self) -> Result<()> {
        if self.n_features != N_FEATURES {
            return Err(AppError::ModelInference(format!(
                "feature vector has {} slots but the model expects {}",
                N_FEATURES, self.n_features
            )));
        }
        Ok(())
    }
}

impl Regressor for TreeEnsemble {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, x: &FeatureVector) -> Result<f64> {
        self.check_schema()?;
        let margin = self.trees.iter().map(|t| t.predict(x)).sum::<f64>();
        Ok(self.base_score + margin)
    }
}

fn parse_param<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T> {
    // Newer releases wrap scalar parameters in brackets, e.g. "[5E-1]"
    let trimmed = raw.trim().trim_start_matches('[').trim_end_matches(']');
    let first = trimmed.split(',').next().unwrap_or("").trim();
    first
        .parse::<T>()
        .map_err(|_| AppError::Startup(format!("invalid model parameter {} = '{}'", name, raw)))
}

#[derive(Debug, Deserialize)]
struct XgbDocument {
    learner: XgbLearner,
}

#[derive(Debug, Deserialize)]
struct XgbLearner {
    #[serde(default)]
    feature_names: Vec<String>,
    gradient_booster: XgbBooster,
    learner_model_param: XgbLearnerParam,
    #[serde(default)]
    objective: Option<XgbObjective>,
}

#[derive(Debug, Deserialize)]
struct XgbBooster {
    name: String,
    #[serde(default)]
    model: Option<XgbTreeModel>,
}

#[derive(Debug, Deserialize)]
struct XgbTreeModel {
    trees: Vec<XgbTree>,
}

#[derive(Debug, Deserialize)]
struct XgbLearnerParam {
    base_score: String,
    num_feature: String,
    #[serde(default)]
    num_target: Option<String>,
}

#[derive(Debug, Deserialize)]
struct XgbObjective {
    name: String,
}

/// `default_left` is written as integers by some releases and booleans by others
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum XgbFlag {
    Bool(bool),
    Int(i64),
}

impl XgbFlag {
    fn is_set(&self) -> bool {
        match self {
            XgbFlag::Bool(b) => *b,
            XgbFlag::Int(i) => *i != 0,
        }
    }
}

#[derive(Debug, Deserialize)]
struct XgbTree {
    left_children: Vec<i64>,
    right_children: Vec<i64>,
    split_indices: Vec<i64>,
    split_conditions: Vec<f64>,
    default_left: Vec<XgbFlag>,
    sum_hessian: Vec<f64>,
    #[serde(default)]
    split_type: Vec<i64>,
}

impl XgbTree {
    fn into_tree(self, tree_idx: usize) -> Result<RegressionTree> {
        let n = self.left_children.len();
        let lengths = [
            self.right_children.len(),
            self.split_indices.len(),
            self.split_conditions.len(),
            self.default_left.len(),
            self.sum_hessian.len(),
        ];
        if lengths.iter().any(|&len| len != n) {
            return Err(AppError::Startup(format!(
                "tree {} has inconsistent node arrays",
                tree_idx
            )));
        }
        if self.split_type.iter().any(|&t| t != 0) {
            return Err(AppError::Startup(format!(
                "tree {} uses categorical splits, which are not supported",
                tree_idx
            )));
        }

        let nodes = (0..n)
            .map(|i| {
                if self.left_children[i] < 0 {
                    Ok(TreeNode::Leaf {
                        value: self.split_conditions[i],
                        cover: self.sum_hessian[i],
                    })
                } else {
                    let to_index = |raw: i64| {
                        usize::try_from(raw).map_err(|_| {
                            AppError::Startup(format!("tree {} node {} has a bad index", tree_idx, i))
                        })
                    };
                    Ok(TreeNode::Split {
                        feature: to_index(self.split_indices[i])?,
                        threshold: self.split_conditions[i] as f32,
                        left: to_index(self.left_children[i])?,
                        right: to_index(self.right_children[i])?,
                        default_left: self.default_left[i].is_set(),
                        cover: self.sum_hessian[i],
                    })
                }
            })
            .collect::<Result<Vec<_>>>()?;

        RegressionTree::new(nodes)
            .map_err(|e| AppError::Startup(format!("tree {}: {}", tree_idx, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump(feature: usize, threshold: f32, left: f64, right: f64) -> RegressionTree {
        RegressionTree::new(vec![
            TreeNode::Split {
                feature,
                threshold,
                left: 1,
                right: 2,
                default_left: true,
                cover: 10.0,
            },
            TreeNode::Leaf {
                value: left,
                cover: 6.0,
            },
            TreeNode::Leaf {
                value: right,
                cover: 4.0,
            },
        ])
        .unwrap()
    }

    fn vector_with(index: usize, value: f64) -> FeatureVector {
        let mut values = [Some(0.0); N_FEATURES];
        values[index] = Some(value);
        FeatureVector::new(values)
    }

    #[test]
    fn test_split_direction() {
        let tree = stump(0, 65.0, 2.0, 5.0);

        assert_eq!(tree.predict(&vector_with(0, 40.0)), 2.0);
        assert_eq!(tree.predict(&vector_with(0, 65.0)), 5.0);
        assert_eq!(tree.predict(&vector_with(0, 80.0)), 5.0);
    }

    #[test]
    fn test_missing_follows_default() {
        let tree = stump(4, 3.5, 1.0, -1.0);
        let mut values = [Some(0.0); N_FEATURES];
        values[4] = None;

        assert_eq!(tree.predict(&FeatureVector::new(values)), 1.0);
    }

    #[test]
    fn test_expected_value_is_cover_weighted() {
        let tree = stump(0, 65.0, 2.0, 5.0);
        assert!((tree.expected_value() - (0.6 * 2.0 + 0.4 * 5.0)).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_backward_child() {
        let result = RegressionTree::new(vec![TreeNode::Split {
            feature: 0,
            threshold: 1.0,
            left: 0,
            right: 0,
            default_left: false,
            cover: 1.0,
        }]);
        assert!(matches!(result, Err(AppError::Startup(_))));
    }

    #[test]
    fn test_ensemble_prediction_adds_base_score() {
        let ensemble =
            TreeEnsemble::new(vec![stump(0, 65.0, 2.0, 5.0), stump(6, 0.5, 0.0, 3.0)], 0.5, 15)
                .unwrap();

        let mut values = [Some(0.0); N_FEATURES];
        values[0] = Some(70.0);
        values[6] = Some(1.0);
        let prediction = ensemble.predict(&FeatureVector::new(values)).unwrap();

        assert!((prediction - 8.5).abs() < 1e-12);
        assert_eq!(ensemble.max_depth(), 1);
    }

    #[test]
    fn test_cardinality_mismatch_is_inference_error() {
        let ensemble = TreeEnsemble::new(vec![stump(0, 65.0, 2.0, 5.0)], 0.0, 12).unwrap();
        let result = ensemble.predict(&vector_with(0, 1.0));

        assert!(matches!(result, Err(AppError::ModelInference(_))));
    }

    #[test]
    fn test_split_feature_out_of_range_rejected() {
        let result = TreeEnsemble::new(vec![stump(20, 1.0, 0.0, 1.0)], 0.0, 15);
        assert!(matches!(result, Err(AppError::Startup(_))));
    }

    #[test]
    fn test_parse_bracketed_base_score() {
        assert_eq!(parse_param::<f64>("base_score", "[5E-1]").unwrap(), 0.5);
        assert_eq!(parse_param::<f64>("base_score", "6.25E0").unwrap(), 6.25);
        assert!(parse_param::<usize>("num_feature", "abc").is_err());
    }

    #[test]
    fn test_from_xgboost_json() {
        let json = r#"{
            "learner": {
                "feature_names": [],
                "gradient_booster": {
                    "name": "gbtree",
                    "model": {
                        "trees": [{
                            "left_children": [1, -1, -1],
                            "right_children": [2, -1, -1],
                            "split_indices": [0, 0, 0],
                            "split_conditions": [65.0, 2.0, 5.0],
                            "default_left": [1, 0, 0],
                            "sum_hessian": [10.0, 6.0, 4.0],
                            "split_type": [0, 0, 0]
                        }]
                    }
                },
                "learner_model_param": {
                    "base_score": "5E-1",
                    "num_feature": "15",
                    "num_target": "1"
                },
                "objective": { "name": "reg:squarederror" }
            },
            "version": [2, 0, 3]
        }"#;

        let ensemble = TreeEnsemble::from_xgboost_json(json).unwrap();
        assert_eq!(ensemble.n_trees(), 1);
        assert_eq!(ensemble.n_features(), 15);
        assert_eq!(ensemble.base_score(), 0.5);
        assert!(ensemble.feature_names().is_none());

        let prediction = ensemble.predict(&vector_with(0, 30.0)).unwrap();
        assert!((prediction - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_non_identity_objective() {
        let json = r#"{
            "learner": {
                "gradient_booster": { "name": "gbtree", "model": { "trees": [] } },
                "learner_model_param": { "base_score": "0", "num_feature": "15" },
                "objective": { "name": "count:poisson" }
            }
        }"#;

        let err = TreeEnsemble::from_xgboost_json(json).unwrap_err();
        assert!(err.to_string().contains("count:poisson"));
    }

    #[test]
    fn test_rejects_multi_output() {
        let json = r#"{
            "learner": {
                "gradient_booster": { "name": "gbtree", "model": { "trees": [] } },
                "learner_model_param": { "base_score": "0", "num_feature": "15", "num_target": "2" }
            }
        }"#;

        let err = TreeEnsemble::from_xgboost_json(json).unwrap_err();
        assert!(matches!(err, AppError::Startup(_)));
        assert!(err.to_string().contains("multi-output"));
    }

    #[test]
    fn test_load_missing_file_is_startup_error() {
        let result = TreeEnsemble::load("/nonexistent/xgboost_model.json");
        assert!(matches!(result, Err(AppError::Startup(_))));
    }
}
