//! Volume-band classification from frequency-bin magnitudes.

use serde::{Deserialize, Serialize};

/// Discrete classification of the average audio energy.
///
/// Republished on every poll with no smoothing or hysteresis; rapid
/// oscillation across the thresholds is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolumeBand {
    Low,
    Good,
    High,
}

impl VolumeBand {
    /// Feedback line shown to the user for this band
    pub fn feedback(&self) -> &'static str {
        match self {
            VolumeBand::Low => "The voice is too low. Speak up!",
            VolumeBand::Good => "Voice level is good.",
            VolumeBand::High => "The voice is too loud. Please lower your volume.",
        }
    }
}

/// Mean magnitude across the frequency bins (0 for an empty snapshot).
pub fn mean_magnitude(bins: &[u8]) -> f64 {
    if bins.is_empty() {
        return 0.0;
    }
    bins.iter().map(|&b| b as u64).sum::<u64>() as f64 / bins.len() as f64
}

/// Classify an average magnitude: below 50 is Low, 50 through 150 inclusive
/// is Good, above 150 is High.
pub fn classify(average: f64) -> VolumeBand {
    if average < 50.0 {
        VolumeBand::Low
    } else if average <= 150.0 {
        VolumeBand::Good
    } else {
        VolumeBand::High
    }
}

/// Classify one tap snapshot.
pub fn classify_bins(bins: &[u8]) -> VolumeBand {
    classify(mean_magnitude(bins))
}
