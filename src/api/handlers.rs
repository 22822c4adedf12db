use crate::api::AppState;
use crate::error::{AppError, Result};
use crate::feedback::SentimentLabel;
use crate::ml::{ModelSummary, PredictionResult};
use crate::models::*;
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use serde_json::Value;
use validator::Validate;

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        model: state.engine.summary().clone(),
    }))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub model: ModelSummary,
}

/// Run a risk assessment for one patient and store it
pub async fn run_assessment(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<AssessmentResponse>)> {
    let raw = match body {
        Value::Object(map) => map,
        other => {
            return Err(AppError::Validation(format!(
                "assessment body must be a JSON object, got {}",
                json_kind(&other)
            )))
        }
    };

    let patient = PatientInfo::from_raw(&raw)?;

    // TreeSHAP is CPU-bound; keep it off the async workers
    let engine = state.engine.clone();
    let (features, prediction) = tokio::task::spawn_blocking(move || engine.assess(&raw))
        .await
        .map_err(|e| AppError::Internal(format!("prediction task failed: {}", e)))??;

    let record = AssessmentRecord::new(patient, features, prediction.clone());
    state.store.save_assessment(&record).await?;

    tracing::info!(
        assessment_id = %record.id,
        predicted_los = prediction.predicted_los,
        risk_level = %prediction.risk_level,
        "Assessment stored"
    );

    Ok((
        StatusCode::CREATED,
        Json(AssessmentResponse {
            status: "success".to_string(),
            message: "Assessment stored successfully.".to_string(),
            prediction,
        }),
    ))
}

#[derive(Debug, Serialize)]
pub struct AssessmentResponse {
    pub status: String,
    pub message: String,
    pub prediction: PredictionResult,
}

/// List stored assessments
pub async fn list_patients(State(state): State<AppState>) -> Result<Json<Vec<AssessmentRecord>>> {
    Ok(Json(state.store.list_assessments().await?))
}

/// Dashboard header statistics
pub async fn dashboard_stats(State(state): State<AppState>) -> Result<Json<DashboardStats>> {
    Ok(Json(state.store.dashboard_stats().await?))
}

/// Analyze and store patient feedback
pub async fn submit_feedback(
    State(state): State<AppState>,
    Json(request): Json<FeedbackSubmission>,
) -> Result<(StatusCode, Json<FeedbackResponse>)> {
    request.validate()?;

    let analysis = state.analyzer.compute_feedback_analysis(&request.feedback_text);
    let record = FeedbackRecord::new(request.patient_id, request.feedback_text, analysis);
    state.store.save_feedback(&record).await?;

    Ok((
        StatusCode::CREATED,
        Json(FeedbackResponse {
            message: "Feedback submitted successfully!".to_string(),
            analysis: FeedbackSummary {
                sentiment_label: record.sentiment_label,
                category: record.category,
                sentiment_score: record.sentiment_score,
            },
        }),
    ))
}

#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub message: String,
    pub analysis: FeedbackSummary,
}

#[derive(Debug, Serialize)]
pub struct FeedbackSummary {
    pub sentiment_label: SentimentLabel,
    pub category: String,
    pub sentiment_score: f64,
}

/// List stored feedback
pub async fn list_feedback(State(state): State<AppState>) -> Result<Json<Vec<FeedbackRecord>>> {
    Ok(Json(state.store.list_feedback().await?))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
