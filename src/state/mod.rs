pub mod store;

pub use store::*;

use crate::error::Result;
use crate::models::{AssessmentRecord, DashboardStats, FeedbackRecord};
use async_trait::async_trait;

/// Trait for assessment and feedback storage operations
#[async_trait]
pub trait AssessmentStore: Send + Sync {
    /// Save a completed assessment
    async fn save_assessment(&self, record: &AssessmentRecord) -> Result<()>;

    /// All assessments, newest admission date first (undated last), then newest id
    async fn list_assessments(&self) -> Result<Vec<AssessmentRecord>>;

    /// Aggregate figures over all stored assessments
    async fn dashboard_stats(&self) -> Result<DashboardStats>;

    /// Save analyzed feedback
    async fn save_feedback(&self, record: &FeedbackRecord) -> Result<()>;

    /// All feedback, newest first
    async fn list_feedback(&self) -> Result<Vec<FeedbackRecord>>;
}
