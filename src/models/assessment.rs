use crate::error::{AppError, Result};
use crate::ml::{FeatureVector, PredictionResult, RiskLevel};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

/// Patient identification carried alongside the clinical features
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientInfo {
    pub patient_id: Option<String>,
    pub patient_name: Option<String>,
    pub admission_date: Option<NaiveDate>,
}

impl PatientInfo {
    /// Extract identification fields from an intake payload.
    ///
    /// `patientId` may be a string or a number. `admissionDate` must be an
    /// ISO `YYYY-MM-DD` date. Empty strings and nulls count as absent.
    pub fn from_raw(raw: &Map<String, Value>) -> Result<Self> {
        let patient_id = match raw.get("patientId") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => non_empty(s),
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(other) => {
                return Err(AppError::Validation(format!(
                    "patientId must be a string or number, got {}",
                    other
                )))
            }
        };

        let patient_name = match raw.get("patientName") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => non_empty(s),
            Some(other) => {
                return Err(AppError::Validation(format!(
                    "patientName must be a string, got {}",
                    other
                )))
            }
        };

        let admission_date = match raw.get("admissionDate") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.trim().is_empty() => None,
            Some(Value::String(s)) => Some(NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(
                |e| AppError::Validation(format!("admissionDate '{}' is not a valid date: {}", s, e)),
            )?),
            Some(other) => {
                return Err(AppError::Validation(format!(
                    "admissionDate must be a YYYY-MM-DD string, got {}",
                    other
                )))
            }
        };

        Ok(Self {
            patient_id,
            patient_name,
            admission_date,
        })
    }
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// A stored risk assessment: patient details, normalized features and outcome.
///
/// Serialized flat, one key per column, in the same shape the dashboard reads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentRecord {
    /// Time-ordered identifier
    pub id: Uuid,

    /// When the assessment was stored
    pub timestamp: DateTime<Utc>,

    #[serde(flatten)]
    pub patient: PatientInfo,

    #[serde(flatten)]
    pub features: FeatureVector,

    #[serde(flatten)]
    pub prediction: PredictionResult,
}

impl AssessmentRecord {
    pub fn new(patient: PatientInfo, features: FeatureVector, prediction: PredictionResult) -> Self {
        Self {
            id: Uuid::now_v7(),
            timestamp: Utc::now(),
            patient,
            features,
            prediction,
        }
    }

    pub fn risk_level(&self) -> RiskLevel {
        self.prediction.risk_level
    }

    pub fn risk_score(&self) -> i64 {
        self.prediction.risk_score
    }
}

/// Dashboard header figures
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_patients: u64,

    /// Mean risk score rounded half to even; 0 when nothing is stored
    pub avg_risk: i64,

    pub high_risk_count: u64,
}

impl DashboardStats {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a AssessmentRecord>,
    {
        let mut stats = Self::default();
        let mut score_sum = 0i64;
        for record in records {
            stats.total_patients += 1;
            score_sum += record.risk_score();
            if record.risk_level() == RiskLevel::High {
                stats.high_risk_count += 1;
            }
        }
        if stats.total_patients > 0 {
            let mean = score_sum as f64 / stats.total_patients as f64;
            stats.avg_risk = mean.round_ties_even() as i64;
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::{Attributions, N_FEATURES};
    use serde_json::json;

    fn raw(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn prediction(los: i64, score: i64) -> PredictionResult {
        PredictionResult {
            predicted_los: los,
            risk_score: score,
            risk_level: RiskLevel::from_los(los),
            base_value: 5.3,
            shap_values: Attributions::new([0.0; N_FEATURES]),
        }
    }

    #[test]
    fn test_patient_info_parsing() {
        let info = PatientInfo::from_raw(&raw(json!({
            "patientId": "P-100",
            "patientName": " Jane Doe ",
            "admissionDate": "2024-03-15",
            "age": 70
        })))
        .unwrap();

        assert_eq!(info.patient_id.as_deref(), Some("P-100"));
        assert_eq!(info.patient_name.as_deref(), Some("Jane Doe"));
        assert_eq!(info.admission_date, NaiveDate::from_ymd_opt(2024, 3, 15));
    }

    #[test]
    fn test_patient_info_optional() {
        let info = PatientInfo::from_raw(&raw(json!({
            "patientId": 42,
            "patientName": "",
            "admissionDate": null
        })))
        .unwrap();

        assert_eq!(info.patient_id.as_deref(), Some("42"));
        assert_eq!(info.patient_name, None);
        assert_eq!(info.admission_date, None);
        assert_eq!(PatientInfo::from_raw(&Map::new()).unwrap(), PatientInfo::default());
    }

    #[test]
    fn test_invalid_admission_date() {
        let result = PatientInfo::from_raw(&raw(json!({ "admissionDate": "15/03/2024" })));
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_record_serializes_flat() {
        let features = FeatureVector::from_raw(&raw(json!({ "age": 70, "hasSepsis": true }))).unwrap();
        let info = PatientInfo {
            patient_id: Some("P-1".into()),
            patient_name: None,
            admission_date: NaiveDate::from_ymd_opt(2024, 1, 2),
        };
        let record = AssessmentRecord::new(info, features, prediction(10, 86));
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["patientId"], "P-1");
        assert_eq!(value["admissionDate"], "2024-01-02");
        assert_eq!(value["age"], 70);
        assert_eq!(value["hasSepsis"], 1);
        assert!(value["albumin"].is_null());
        assert_eq!(value["predicted_los"], 10);
        assert_eq!(value["riskLevel"], "High");
        assert!(value["id"].is_string());
    }

    #[test]
    fn test_dashboard_stats() {
        let records: Vec<_> = [(10, 86), (3, 33), (7, 63)]
            .into_iter()
            .map(|(los, score)| {
                AssessmentRecord::new(PatientInfo::default(), FeatureVector::default(), prediction(los, score))
            })
            .collect();
        let stats = DashboardStats::from_records(&records);

        assert_eq!(stats.total_patients, 3);
        // (86 + 33 + 63) / 3 = 60.67
        assert_eq!(stats.avg_risk, 61);
        assert_eq!(stats.high_risk_count, 1);
    }

    #[test]
    fn test_dashboard_stats_empty() {
        assert_eq!(DashboardStats::from_records(&[]), DashboardStats::default());

        let value = serde_json::to_value(DashboardStats::default()).unwrap();
        assert_eq!(value, json!({ "totalPatients": 0, "avgRisk": 0, "highRiskCount": 0 }));
    }
}
