use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fixed emotion label set reported by the expression model
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Happy,
    Sad,
    Angry,
    Neutral,
    Surprised,
    Fearful,
    Disgusted,
}

impl Emotion {
    /// Capitalized display label ("Happy", "Sad", ...)
    pub fn label(&self) -> &'static str {
        match self {
            Emotion::Happy => "Happy",
            Emotion::Sad => "Sad",
            Emotion::Angry => "Angry",
            Emotion::Neutral => "Neutral",
            Emotion::Surprised => "Surprised",
            Emotion::Fearful => "Fearful",
            Emotion::Disgusted => "Disgusted",
        }
    }
}

/// One emotion-probability distribution from a detection.
///
/// Probabilities are each in [0, 1] but need not sum to exactly 1 (model
/// rounding). Samples are replaced wholesale on each publishing tick; no
/// history is retained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionSample {
    pub probabilities: BTreeMap<Emotion, f32>,
}

impl EmotionSample {
    pub fn new(probabilities: BTreeMap<Emotion, f32>) -> Self {
        Self { probabilities }
    }

    /// Check every probability is finite and within [0, 1].
    ///
    /// A sample failing this is never published; the previously published
    /// sample is retained instead.
    pub fn is_valid(&self) -> bool {
        !self.probabilities.is_empty()
            && self
                .probabilities
                .values()
                .all(|p| p.is_finite() && (0.0..=1.0).contains(p))
    }
}
