/// Patient feedback analysis
///
/// This module provides:
/// - Lexicon-based sentiment scoring with intensifiers and negation
/// - Ordered keyword taxonomy for topic categorization
/// - A combined analyzer producing score, label and category

pub mod categorizer;
pub mod lexicon;
pub mod sentiment;
pub mod service;

pub use categorizer::{Taxonomy, DEFAULT_CATEGORY};
pub use sentiment::{LexiconScorer, PolarityScorer, SentimentAnalyzer, SentimentLabel};
pub use service::{FeedbackAnalysis, FeedbackAnalyzer};
