use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Predicted length of stay at or above which risk is High
pub const HIGH_RISK_LOS: i64 = 10;

/// Predicted length of stay at or above which risk is Moderate
pub const MODERATE_RISK_LOS: i64 = 6;

/// Upper bound of the risk score
pub const MAX_RISK_SCORE: i64 = 100;

/// Coarse three-band risk classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    /// Band for a rounded length of stay; each band includes its lower bound
    pub fn from_los(predicted_los: i64) -> Self {
        if predicted_los >= HIGH_RISK_LOS {
            RiskLevel::High
        } else if predicted_los >= MODERATE_RISK_LOS {
            RiskLevel::Moderate
        } else {
            RiskLevel::Low
        }
    }
}

/// Risk score and level from a rounded length of stay and the explainer baseline.
///
/// `score = min(round(los * 7.5 + |2 * base_value|), 100)`, rounding ties to even.
/// Only the upper bound is clamped.
pub fn categorize(predicted_los: i64, base_value: f64) -> (i64, RiskLevel) {
    let raw = predicted_los as f64 * 7.5 + (base_value * 2.0).abs();
    let score = (raw.round_ties_even() as i64).min(MAX_RISK_SCORE);
    (score, RiskLevel::from_los(predicted_los))
}
