use crate::ml::features::{FeatureVector, FEATURE_NAMES, N_FEATURES};
use crate::ml::risk::RiskLevel;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Unrounded explainer output for one input
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Explanation {
    /// Expected model output (the explainer baseline)
    pub base_value: f64,

    /// Per-feature contributions in canonical order
    pub contributions: [f64; N_FEATURES],
}

impl Explanation {
    /// Baseline plus all contributions; equals the raw prediction
    pub fn reconstructed(&self) -> f64 {
        self.base_value + self.contributions.iter().sum::<f64>()
    }

    /// Contribution of a named feature
    pub fn contribution(&self, name: &str) -> Option<f64> {
        FeatureVector::index_of(name).map(|idx| self.contributions[idx])
    }
}

/// Per-feature attribution values keyed by feature name.
///
/// Serialized as a JSON object whose keys follow the canonical feature order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attributions([f64; N_FEATURES]);

impl Attributions {
    pub fn new(values: [f64; N_FEATURES]) -> Self {
        Self(values)
    }

    /// Attributions rounded to two decimals for display
    pub fn rounded(values: &[f64; N_FEATURES]) -> Self {
        let mut out = [0.0; N_FEATURES];
        for (dst, src) in out.iter_mut().zip(values.iter()) {
            *dst = round2(*src);
        }
        Self(out)
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        FeatureVector::index_of(name).map(|idx| self.0[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_NAMES.iter().copied().zip(self.0.iter().copied())
    }

    pub fn sum(&self) -> f64 {
        self.0.iter().sum()
    }

    /// Features ordered by absolute contribution, largest first
    pub fn ranked(&self) -> Vec<(&'static str, f64)> {
        let mut ranked: Vec<_> = self.iter().collect();
        ranked.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()));
        ranked
    }
}

impl Serialize for Attributions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(N_FEATURES))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}

/// Structured outcome of one risk assessment
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    /// Predicted length of stay in days
    #[serde(rename = "predicted_los")]
    pub predicted_los: i64,

    /// Bounded risk score (upper bound 100)
    pub risk_score: i64,

    pub risk_level: RiskLevel,

    /// Explainer baseline, two decimals
    pub base_value: f64,

    /// Per-feature attributions, two decimals each
    pub shap_values: Attributions,
}

/// Round half away from zero to two decimals
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
