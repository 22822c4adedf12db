/// Length-of-stay risk prediction and explanation
///
/// This module provides:
/// - Normalization of untyped intake payloads into a fixed-order feature vector
/// - Gradient-boosted tree ensemble inference (XGBoost JSON artifacts)
/// - Exact TreeSHAP attributions reconciling with each prediction
/// - Risk score and risk level categorization

pub mod ensemble;
pub mod explainer;
pub mod features;
pub mod models;
pub mod predictor;
pub mod risk;
pub mod service;

pub use ensemble::{RegressionTree, TreeEnsemble, TreeNode};
pub use explainer::{AttributionExplainer, Attributor, TreeShap};
pub use features::{FeatureVector, FEATURE_NAMES, N_FEATURES};
pub use models::{Attributions, Explanation, PredictionResult};
pub use predictor::{RegressionPredictor, Regressor};
pub use risk::{categorize, RiskLevel};
pub use service::{ModelSummary, RiskEngine};
