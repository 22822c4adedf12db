use crate::feedback::{FeedbackAnalysis, SentimentLabel};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Feedback submission body
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FeedbackSubmission {
    #[validate(length(min = 1, max = 255, message = "patient_id is required"))]
    #[serde(default)]
    pub patient_id: String,

    #[validate(length(min = 1, message = "feedback_text is required"))]
    #[serde(default)]
    pub feedback_text: String,
}

/// A stored, analyzed piece of patient feedback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub id: Uuid,
    pub patient_id: String,
    pub feedback_text: String,
    pub sentiment_score: f64,
    pub sentiment_label: SentimentLabel,
    pub category: String,
    pub timestamp: DateTime<Utc>,
}

impl FeedbackRecord {
    pub fn new(patient_id: String, feedback_text: String, analysis: FeedbackAnalysis) -> Self {
        Self {
            id: Uuid::now_v7(),
            patient_id,
            feedback_text,
            sentiment_score: analysis.sentiment_score,
            sentiment_label: analysis.sentiment_label,
            category: analysis.category,
            timestamp: Utc::now(),
        }
    }
}
