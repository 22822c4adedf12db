use crate::error::{AppError, Result};
use crate::ml::features::{FeatureVector, N_FEATURES};
use std::sync::Arc;

/// Inference strategy: ordered features in, one continuous estimate out.
///
/// Implementations must be safe for concurrent read-only calls.
pub trait Regressor: Send + Sync {
    /// Number of input features the model was trained on
    fn n_features(&self) -> usize;

    /// Predict the raw, unrounded length of stay
    fn predict(&self, x: &FeatureVector) -> Result<f64>;
}

/// Stateless wrapper around an immutable, pre-trained regression model
#[derive(Clone)]
pub struct RegressionPredictor {
    model: Arc<dyn Regressor>,
}

impl RegressionPredictor {
    pub fn new(model: Arc<dyn Regressor>) -> Self {
        Self { model }
    }

    /// Deterministic prediction; fails if the model was trained on a different schema
    pub fn predict(&self, x: &FeatureVector) -> Result<f64> {
        if self.model.n_features() != N_FEATURES {
            return Err(AppError::ModelInference(format!(
                "model expects {} features, intake schema has {}",
                self.model.n_features(),
                N_FEATURES
            )));
        }

        let value = self.model.predict(x)?;
        if !value.is_finite() {
            return Err(AppError::ModelInference(format!(
                "model produced a non-finite prediction ({})",
                value
            )));
        }
        Ok(value)
    }

    pub fn n_features(&self) -> usize {
        self.model.n_features()
    }
}

impl std::fmt::Debug for RegressionPredictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegressionPredictor")
            .field("n_features", &self.model.n_features())
            .finish()
    }
}
