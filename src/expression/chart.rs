use serde::Serialize;

use super::sample::EmotionSample;

/// One slice of the emotion distribution chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSlice {
    /// Display label with the embedded percentage, e.g. "Happy: 12.34%"
    pub label: String,
    /// Percentage value with two-decimal precision
    pub value: f64,
}

/// Chart payload for a proportional (pie/doughnut) renderer
#[derive(Debug, Clone, Serialize)]
pub struct EmotionChart {
    pub slices: Vec<ChartSlice>,
}

impl EmotionChart {
    /// Build the chart payload from the latest sample.
    ///
    /// An absent sample (no face seen yet) yields an empty chart.
    pub fn from_sample(sample: Option<&EmotionSample>) -> Self {
        let slices = sample
            .map(|sample| {
                sample
                    .probabilities
                    .iter()
                    .map(|(emotion, probability)| {
                        let percent = (*probability as f64 * 10000.0).round() / 100.0;
                        ChartSlice {
                            label: format!("{}: {:.2}%", emotion.label(), percent),
                            value: percent,
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self { slices }
    }
}
