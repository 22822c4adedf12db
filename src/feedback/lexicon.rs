//! Static English polarity resources for patient feedback.
//!
//! Polarities lie in [-1, 1]. Values for common adjectives follow the
//! widely used adjective-polarity lexicons; hospital-specific terms
//! (understaffed, overcharged, ...) are added with conservative weights.
//! Words whose usual sense in hospital feedback is neutral (the noun
//! "patient", "kind of", "waiting room", "long-term") are left out.

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

pub static POLARITY: Lazy<HashMap<&'static str, f64>> =
    Lazy::new(|| POLARITY_ENTRIES.iter().copied().collect());

pub static INTENSIFIERS: Lazy<HashMap<&'static str, f64>> =
    Lazy::new(|| INTENSIFIER_ENTRIES.iter().copied().collect());

pub static NEGATORS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| NEGATOR_ENTRIES.iter().copied().collect());

/// Multiplier applied to a scored word preceded by a negator
pub const NEGATION_FACTOR: f64 = -0.5;

/// How many tokens back a negator still applies
pub const NEGATION_WINDOW: usize = 2;

const POLARITY_ENTRIES: &[(&str, f64)] = &[
    // positive
    ("excellent", 1.0),
    ("outstanding", 0.5),
    ("perfect", 1.0),
    ("wonderful", 1.0),
    ("best", 1.0),
    ("superb", 1.0),
    ("fantastic", 0.4),
    ("amazing", 0.6),
    ("awesome", 1.0),
    ("great", 0.8),
    ("happy", 0.8),
    ("pleased", 0.5),
    ("delighted", 0.7),
    ("good", 0.7),
    ("nice", 0.6),
    ("lovely", 0.5),
    ("pleasant", 0.733),
    ("impressive", 1.0),
    ("beautiful", 0.85),
    ("satisfied", 0.5),
    ("grateful", 0.6),
    ("thankful", 0.5),
    ("helpful", 0.5),
    ("caring", 0.5),
    ("compassionate", 0.6),
    ("gentle", 0.4),
    ("polite", 0.5),
    ("courteous", 0.5),
    ("respectful", 0.5),
    ("attentive", 0.4),
    ("supportive", 0.5),
    ("friendly", 0.375),
    ("welcoming", 0.4),
    ("comfortable", 0.4),
    ("clean", 0.367),
    ("spotless", 0.6),
    ("tidy", 0.4),
    ("fresh", 0.3),
    ("tasty", 0.6),
    ("delicious", 1.0),
    ("quick", 0.333),
    ("fast", 0.2),
    ("prompt", 0.3),
    ("efficient", 0.4),
    ("professional", 0.1),
    ("skilled", 0.5),
    ("knowledgeable", 0.4),
    ("thorough", 0.3),
    ("smooth", 0.4),
    ("easy", 0.433),
    ("better", 0.5),
    ("fine", 0.417),
    ("ok", 0.5),
    ("okay", 0.5),
    ("recommend", 0.4),
    ("love", 0.5),
    ("loved", 0.7),
    ("thanks", 0.2),
    ("reassuring", 0.4),
    ("affordable", 0.3),
    ("reasonable", 0.2),
    ("quiet", 0.1),
    ("spacious", 0.3),
    ("modern", 0.2),
    // negative
    ("terrible", -1.0),
    ("horrible", -1.0),
    ("awful", -1.0),
    ("worst", -1.0),
    ("disgusting", -1.0),
    ("pathetic", -1.0),
    ("bad", -0.7),
    ("poor", -0.4),
    ("worse", -0.4),
    ("disappointed", -0.75),
    ("disappointing", -0.6),
    ("unacceptable", -0.8),
    ("unhappy", -0.6),
    ("sad", -0.5),
    ("angry", -0.5),
    ("upset", -0.4),
    ("frustrated", -0.5),
    ("frustrating", -0.5),
    ("rude", -0.3),
    ("arrogant", -0.5),
    ("careless", -0.5),
    ("negligent", -0.6),
    ("unprofessional", -0.5),
    ("unhelpful", -0.5),
    ("unfriendly", -0.4),
    ("ignored", -0.4),
    ("dirty", -0.6),
    ("filthy", -0.8),
    ("messy", -0.3),
    ("smelly", -0.5),
    ("unclean", -0.5),
    ("unhygienic", -0.6),
    ("uncomfortable", -0.5),
    ("noisy", -0.3),
    ("crowded", -0.2),
    ("cold", -0.6),
    ("bland", -0.3),
    ("tasteless", -0.5),
    ("slow", -0.3),
    ("late", -0.3),
    ("delayed", -0.3),
    ("confusing", -0.4),
    ("confused", -0.3),
    ("expensive", -0.5),
    ("overpriced", -0.6),
    ("overcharged", -0.6),
    ("broken", -0.4),
    ("painful", -0.7),
    ("worried", -0.3),
    ("scared", -0.5),
    ("understaffed", -0.4),
    ("chaotic", -0.5),
    ("hate", -0.8),
    ("hated", -0.8),
];

const INTENSIFIER_ENTRIES: &[(&str, f64)] = &[
    ("very", 1.3),
    ("really", 1.3),
    ("so", 1.3),
    ("too", 1.3),
    ("quite", 1.1),
    ("extremely", 1.5),
    ("incredibly", 1.5),
    ("absolutely", 1.5),
    ("highly", 1.3),
    ("super", 1.4),
    ("truly", 1.2),
    ("totally", 1.4),
    ("most", 1.3),
    ("somewhat", 0.7),
    ("slightly", 0.6),
    ("fairly", 0.8),
];

const NEGATOR_ENTRIES: &[&str] = &[
    "not", "no", "never", "hardly", "barely", "without", "nor", "neither",
];
