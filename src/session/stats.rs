use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::VolumeBand;

/// A single finalized transcript segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Transcribed text
    pub text: String,

    /// Whether this segment is settled (segments in the cumulative
    /// transcript always are; unsettled text lives in the current line)
    pub is_final: bool,

    /// When this segment was received
    pub timestamp: DateTime<Utc>,

    /// Confidence score (0.0 to 1.0), if available
    pub confidence: Option<f32>,
}

/// Live speaking feedback derived during recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackReport {
    /// Words per minute from the most recent finalized segment
    pub pacing_wpm: f64,

    /// Filler tokens in the most recent finalized segment
    pub filler_words: usize,

    /// Latest volume classification; `None` until the monitor's first poll
    pub volume: Option<VolumeBand>,

    /// Feedback line for the current volume band
    pub volume_feedback: Option<String>,
}

impl Default for FeedbackReport {
    fn default() -> Self {
        Self {
            pacing_wpm: 0.0,
            filler_words: 0,
            volume: None,
            volume_feedback: None,
        }
    }
}

/// Statistics about a recording session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    /// Session identifier
    pub session_id: String,

    /// Whether recording is currently active
    pub is_recording: bool,

    /// When the session was created
    pub started_at: DateTime<Utc>,

    /// Elapsed recording time in whole seconds
    pub elapsed_seconds: u64,

    /// Number of chunks recorded in the current take
    pub chunks_count: usize,

    /// Total bytes recorded in the current take
    pub recorded_bytes: u64,

    /// Number of finalized transcript segments
    pub transcript_segments_count: usize,

    /// Current (interim) display line
    pub current_line: String,

    /// Whether speech features are available this session
    pub speech_enabled: bool,

    /// Live feedback report
    pub report: FeedbackReport,

    /// Last surfaced error, if any
    pub last_error: Option<String>,
}
