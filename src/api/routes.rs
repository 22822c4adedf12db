use crate::api::{handlers, AppState};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

/// Build the main API router
pub fn build_router(state: AppState) -> Router {
    let request_timeout = state.request_timeout;

    Router::new()
        // Health
        .route("/health", get(handlers::health_check))
        // Risk assessments
        .route("/api/assessment", post(handlers::run_assessment))
        .route("/api/patients", get(handlers::list_patients))
        .route("/api/dashboard-stats", get(handlers::dashboard_stats))
        // Feedback
        .route("/submit_feedback", post(handlers::submit_feedback))
        .route("/api/feedback", get(handlers::list_feedback))
        // Add state
        .with_state(state)
        // Add middleware
        .layer(TimeoutLayer::new(request_timeout))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
}
