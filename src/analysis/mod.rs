//! Speech and volume feedback analysis

pub mod speech;
pub mod volume;

pub use speech::{analyze_segment, count_fillers, pacing_wpm, tokenize, SegmentAnalysis};
pub use volume::{classify, classify_bins, mean_magnitude, VolumeBand};
