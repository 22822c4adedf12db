use crate::config::ModelConfig;
use crate::error::{AppError, Result};
use crate::ml::ensemble::TreeEnsemble;
use crate::ml::explainer::{AttributionExplainer, TreeShap};
use crate::ml::features::{FeatureVector, FEATURE_NAMES, N_FEATURES};
use crate::ml::models::{round2, Attributions, Explanation, PredictionResult};
use crate::ml::predictor::{Regressor, RegressionPredictor};
use crate::ml::risk;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Relative tolerance for `baseline + Σ attributions` against the raw prediction
const ADDITIVITY_TOLERANCE: f64 = 1e-3;

/// Risk prediction and explanation engine.
///
/// Built once before the server accepts requests and then shared behind an
/// `Arc`; every method takes `&self` and nothing inside is ever mutated.
#[derive(Debug, Clone)]
pub struct RiskEngine {
    predictor: RegressionPredictor,
    explainer: AttributionExplainer,
    summary: ModelSummary,
}

/// Startup description of the loaded model
#[derive(Debug, Clone, Serialize)]
pub struct ModelSummary {
    pub n_features: usize,
    pub base_value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n_trees: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
}

impl RiskEngine {
    /// Assemble an engine from arbitrary inference and attribution strategies
    pub fn new(predictor: RegressionPredictor, explainer: AttributionExplainer) -> Self {
        let summary = ModelSummary {
            n_features: predictor.n_features(),
            base_value: explainer.base_value(),
            n_trees: None,
            max_depth: None,
        };
        Self {
            predictor,
            explainer,
            summary,
        }
    }

    /// Wrap a loaded tree ensemble with a predictor and a TreeSHAP explainer
    pub fn from_ensemble(ensemble: TreeEnsemble) -> Result<Self> {
        if let Some(names) = ensemble.feature_names() {
            if !names.iter().map(String::as_str).eq(FEATURE_NAMES.iter().copied()) {
                return Err(AppError::Startup(format!(
                    "model feature names {:?} do not match the intake schema {:?}",
                    names, FEATURE_NAMES
                )));
            }
        }
        if ensemble.n_features() != N_FEATURES {
            warn!(
                model_features = ensemble.n_features(),
                intake_features = N_FEATURES,
                "Model feature count differs from the intake schema; predictions will fail"
            );
        }

        let n_trees = ensemble.n_trees();
        let max_depth = ensemble.max_depth();
        let ensemble = Arc::new(ensemble);

        let predictor = RegressionPredictor::new(ensemble.clone());
        let explainer = AttributionExplainer::new(Arc::new(TreeShap::new(ensemble)))?;

        let mut engine = Self::new(predictor, explainer);
        engine.summary.n_trees = Some(n_trees);
        engine.summary.max_depth = Some(max_depth);
        Ok(engine)
    }

    /// Load the model artifact named in configuration. Any failure is fatal.
    pub fn from_config(config: &ModelConfig) -> Result<Self> {
        info!(path = %config.path.display(), "Loading XGBoost model");
        let ensemble = TreeEnsemble::load(&config.path)?;
        let engine = Self::from_ensemble(ensemble)?;

        info!(
            trees = ?engine.summary.n_trees,
            max_depth = ?engine.summary.max_depth,
            base_value = engine.summary.base_value,
            "Model and explainer ready"
        );
        Ok(engine)
    }

    pub fn summary(&self) -> &ModelSummary {
        &self.summary
    }

    pub fn base_value(&self) -> f64 {
        self.explainer.base_value()
    }

    /// Raw, unrounded length-of-stay estimate
    pub fn predict(&self, x: &FeatureVector) -> Result<f64> {
        self.predictor.predict(x)
    }

    /// Unrounded baseline and attributions
    pub fn explain(&self, x: &FeatureVector) -> Result<Explanation> {
        self.explainer.explain(x)
    }

    /// Normalize, predict, explain and categorize one intake payload
    pub fn compute_prediction(&self, raw: &Map<String, Value>) -> Result<PredictionResult> {
        self.assess(raw).map(|(_, result)| result)
    }

    /// Like [`compute_prediction`](Self::compute_prediction), also handing back
    /// the normalized vector so callers can persist it without normalizing twice
    pub fn assess(&self, raw: &Map<String, Value>) -> Result<(FeatureVector, PredictionResult)> {
        let features = FeatureVector::from_raw(raw)?;
        let result = self.predict_features(&features)?;
        Ok((features, result))
    }

    /// Predict, explain and categorize an already-normalized vector
    pub fn predict_features(&self, features: &FeatureVector) -> Result<PredictionResult> {
        let prediction = self.predictor.predict(features)?;
        let explanation = self.explainer.explain(features)?;

        let reconstructed = explanation.reconstructed();
        let tolerance = ADDITIVITY_TOLERANCE * prediction.abs().max(1.0);
        if (reconstructed - prediction).abs() > tolerance {
            return Err(AppError::ModelInference(format!(
                "attributions do not reconcile with the prediction ({} vs {})",
                reconstructed, prediction
            )));
        }

        // Length of stay cannot be negative; ties round to even
        let predicted_los = prediction.round_ties_even().max(0.0) as i64;
        let (risk_score, risk_level) = risk::categorize(predicted_los, explanation.base_value);

        debug!(
            raw_prediction = prediction,
            predicted_los,
            risk_score,
            risk_level = %risk_level,
            missing_features = features.missing_count(),
            "Computed prediction"
        );

        Ok(PredictionResult {
            predicted_los,
            risk_score,
            risk_level,
            base_value: round2(explanation.base_value),
            shap_values: Attributions::rounded(&explanation.contributions),
        })
    }
}
