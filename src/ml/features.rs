use crate::error::{AppError, Result};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// Number of model input slots
pub const N_FEATURES: usize = 15;

/// Canonical slot order. Must match the column order the model was trained on.
pub const FEATURE_NAMES: [&str; N_FEATURES] = [
    "age",
    "admissionType",
    "priorAdmissions",
    "surgeryMethod",
    "albumin",
    "hemoglobin",
    "hasSepsis",
    "hasDelirium",
    "hasMalignancy",
    "hasDiabetes",
    "hasCHF",
    "hasCKD",
    "hasCOPD",
    "hasStroke",
    "hasLiverDisease",
];

/// Fixed-order clinical feature vector.
///
/// `None` marks a slot whose key was absent (or explicitly `null`) in the
/// intake payload. Missing values are never defaulted here; the model decides
/// how to route them.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FeatureVector {
    values: [Option<f64>; N_FEATURES],
}

impl FeatureVector {
    /// Create a vector from already-ordered slot values
    pub fn new(values: [Option<f64>; N_FEATURES]) -> Self {
        Self { values }
    }

    /// Normalize an untyped intake map into the canonical vector.
    ///
    /// Only the 15 recognized keys are read; identification fields and any
    /// other extraneous keys are ignored. Booleans become `1.0`/`0.0`,
    /// numbers pass through, `null` and absent keys become `None`.
    pub fn from_raw(raw: &Map<String, Value>) -> Result<Self> {
        let mut values = [None; N_FEATURES];

        for (slot, name) in values.iter_mut().zip(FEATURE_NAMES.iter()) {
            *slot = match raw.get(*name) {
                None => None,
                Some(value) => coerce_value(name, value)?,
            };
        }

        Ok(Self { values })
    }

    /// Position of a feature name in the canonical order
    pub fn index_of(name: &str) -> Option<usize> {
        FEATURE_NAMES.iter().position(|n| *n == name)
    }

    /// Value of a named slot (`None` for missing values and unknown names)
    pub fn get(&self, name: &str) -> Option<f64> {
        Self::index_of(name).and_then(|idx| self.values[idx])
    }

    /// Value at a canonical position
    pub fn value(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().flatten()
    }

    /// Number of slots holding `None`
    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_none()).count()
    }

    /// Iterate `(name, value)` pairs in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Option<f64>)> + '_ {
        FEATURE_NAMES.iter().copied().zip(self.values.iter().copied())
    }
}

fn coerce_value(name: &str, value: &Value) -> Result<Option<f64>> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(flag) => Ok(Some(if *flag { 1.0 } else { 0.0 })),
        Value::Number(number) => number.as_f64().map(Some).ok_or_else(|| {
            AppError::Validation(format!("feature '{}' is not representable as f64", name))
        }),
        Value::String(_) => Err(AppError::Validation(format!(
            "feature '{}' must be numeric or boolean, got a string",
            name
        ))),
        Value::Array(_) | Value::Object(_) => Err(AppError::Validation(format!(
            "feature '{}' must be numeric or boolean, got a nested value",
            name
        ))),
    }
}

/// Serializes as a JSON object keyed by feature name in canonical order.
/// Integral values are written as integers so that coerced flags read as `0`/`1`.
impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(N_FEATURES))?;
        for (name, value) in self.iter() {
            match value {
                Some(v) if v.fract() == 0.0 && v.abs() < 9.0e15 => {
                    map.serialize_entry(name, &(v as i64))?
                }
                other => map.serialize_entry(name, &other)?,
            }
        }
        map.end()
    }
}
