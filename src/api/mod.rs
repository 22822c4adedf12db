pub mod handlers;
pub mod routes;

pub use routes::*;

use crate::feedback::FeedbackAnalyzer;
use crate::ml::RiskEngine;
use crate::state::AssessmentStore;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RiskEngine>,
    pub analyzer: Arc<FeedbackAnalyzer>,
    pub store: Arc<dyn AssessmentStore>,
    pub request_timeout: Duration,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        engine: Arc<RiskEngine>,
        analyzer: Arc<FeedbackAnalyzer>,
        store: Arc<dyn AssessmentStore>,
    ) -> Self {
        Self {
            engine,
            analyzer,
            store,
            request_timeout: Duration::from_secs(30),
            started_at: Instant::now(),
        }
    }

    /// Set the per-request deadline applied by the router
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
