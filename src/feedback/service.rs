use crate::feedback::categorizer::Taxonomy;
use crate::feedback::sentiment::{SentimentAnalyzer, SentimentLabel};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Sentiment and topic of one feedback text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackAnalysis {
    pub sentiment_score: f64,
    pub sentiment_label: SentimentLabel,
    pub category: String,
}

/// Feedback analyzer combining sentiment scoring with keyword categorization.
///
/// Stateless after construction; safe to share across request tasks.
#[derive(Debug, Clone, Default)]
pub struct FeedbackAnalyzer {
    sentiment: SentimentAnalyzer,
    taxonomy: Taxonomy,
}

impl FeedbackAnalyzer {
    pub fn new(sentiment: SentimentAnalyzer, taxonomy: Taxonomy) -> Self {
        Self {
            sentiment,
            taxonomy,
        }
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    pub fn compute_feedback_analysis(&self, text: &str) -> FeedbackAnalysis {
        let (sentiment_score, sentiment_label) = self.sentiment.analyze(text);
        let category = self.taxonomy.categorize(text).to_string();

        debug!(
            sentiment_score,
            sentiment_label = %sentiment_label,
            category = %category,
            "Analyzed feedback"
        );

        FeedbackAnalysis {
            sentiment_score,
            sentiment_label,
            category,
        }
    }
}
