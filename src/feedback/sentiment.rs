use crate::feedback::lexicon::{INTENSIFIERS, NEGATION_FACTOR, NEGATION_WINDOW, NEGATORS, POLARITY};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use strum::{Display, EnumString};

/// Scores above this are Positive
pub const POSITIVE_THRESHOLD: f64 = 0.1;

/// Scores below this are Negative
pub const NEGATIVE_THRESHOLD: f64 = -0.1;

static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z]+").expect("Invalid token pattern"));

/// Maps free text to a polarity in [-1, 1]
pub trait PolarityScorer: Send + Sync {
    fn polarity(&self, text: &str) -> f64;
}

/// Three-way sentiment label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub fn from_score(score: f64) -> Self {
        if score > POSITIVE_THRESHOLD {
            SentimentLabel::Positive
        } else if score < NEGATIVE_THRESHOLD {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }
}

/// Averaging lexicon scorer.
///
/// Every word found in the polarity lexicon contributes one assessment. An
/// intensifier directly before a scored word multiplies it; a negator up to
/// [`NEGATION_WINDOW`] tokens earlier flips and dampens it. The text score is
/// the mean of all assessments, or 0.0 when nothing was scored.
#[derive(Debug, Default, Clone, Copy)]
pub struct LexiconScorer;

impl LexiconScorer {
    pub fn new() -> Self {
        Self
    }

    fn tokenize(text: &str) -> Vec<String> {
        let lowered = text
            .to_lowercase()
            .replace(&['\u{2019}', '\u{2018}'][..], "'")
            .replace("n't", " not");
        TOKEN
            .find_iter(&lowered)
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

impl PolarityScorer for LexiconScorer {
    fn polarity(&self, text: &str) -> f64 {
        let tokens = Self::tokenize(text);

        let mut assessments = Vec::new();
        let mut intensity: Option<f64> = None;
        let mut last_negator: Option<usize> = None;

        for (i, token) in tokens.iter().enumerate() {
            let token = token.as_str();
            if NEGATORS.contains(token) {
                last_negator = Some(i);
                continue;
            }
            if let Some(factor) = INTENSIFIERS.get(token) {
                intensity = Some(intensity.unwrap_or(1.0) * factor);
                continue;
            }

            if let Some(polarity) = POLARITY.get(token) {
                let mut score = polarity * intensity.unwrap_or(1.0);
                if let Some(at) = last_negator.take() {
                    if i - at <= NEGATION_WINDOW {
                        score *= NEGATION_FACTOR;
                    }
                }
                assessments.push(score.clamp(-1.0, 1.0));
            }
            // intensifiers only bind to the next word
            intensity = None;
        }

        if assessments.is_empty() {
            return 0.0;
        }
        let mean = assessments.iter().sum::<f64>() / assessments.len() as f64;
        mean.clamp(-1.0, 1.0)
    }
}

/// Sentiment analysis over a pluggable polarity scorer
#[derive(Clone)]
pub struct SentimentAnalyzer {
    scorer: Arc<dyn PolarityScorer>,
}

impl fmt::Debug for SentimentAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SentimentAnalyzer").finish_non_exhaustive()
    }
}

impl Default for SentimentAnalyzer {
    fn default() -> Self {
        Self::new(Arc::new(LexiconScorer::new()))
    }
}

impl SentimentAnalyzer {
    pub fn new(scorer: Arc<dyn PolarityScorer>) -> Self {
        Self { scorer }
    }

    /// Polarity score and label for `text`. Blank text is neutral.
    pub fn analyze(&self, text: &str) -> (f64, SentimentLabel) {
        if text.trim().is_empty() {
            return (0.0, SentimentLabel::Neutral);
        }
        let score = self.scorer.polarity(text);
        let score = if score.is_finite() {
            score.clamp(-1.0, 1.0)
        } else {
            0.0
        };
        (score, SentimentLabel::from_score(score))
    }
}
