use crate::error::Result;
use crate::models::{AssessmentRecord, DashboardStats, FeedbackRecord};
use crate::state::AssessmentStore;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

/// In-memory assessment and feedback store
#[derive(Clone)]
pub struct InMemoryStore {
    assessments: Arc<DashMap<Uuid, AssessmentRecord>>,
    feedback: Arc<DashMap<Uuid, FeedbackRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            assessments: Arc::new(DashMap::new()),
            feedback: Arc::new(DashMap::new()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AssessmentStore for InMemoryStore {
    async fn save_assessment(&self, record: &AssessmentRecord) -> Result<()> {
        self.assessments.insert(record.id, record.clone());
        tracing::debug!(assessment_id = %record.id, "Assessment saved");
        Ok(())
    }

    async fn list_assessments(&self) -> Result<Vec<AssessmentRecord>> {
        let mut records: Vec<AssessmentRecord> = self
            .assessments
            .iter()
            .map(|entry| entry.value().clone())
            .collect();

        // None sorts below any date, so undated records land last
        records.sort_by(|a, b| {
            b.patient
                .admission_date
                .cmp(&a.patient.admission_date)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(records)
    }

    async fn dashboard_stats(&self) -> Result<DashboardStats> {
        let records: Vec<AssessmentRecord> = self
            .assessments
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        Ok(DashboardStats::from_records(&records))
    }

    async fn save_feedback(&self, record: &FeedbackRecord) -> Result<()> {
        self.feedback.insert(record.id, record.clone());
        tracing::debug!(feedback_id = %record.id, category = %record.category, "Feedback saved");
        Ok(())
    }

    async fn list_feedback(&self) -> Result<Vec<FeedbackRecord>> {
        let mut records: Vec<FeedbackRecord> = self
            .feedback
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| b.id.cmp(&a.id)));
        Ok(records)
    }
}
