//! Explicit session state container.
//!
//! All session-visible state lives in one immutable snapshot. Every async
//! callback (timer tick, recognition event, recorder chunk, volume poll,
//! expression sample) is expressed as a typed event, and `SessionState::apply`
//! is the single pure transition function producing the next snapshot. Events
//! that arrive for a state that no longer wants them (a chunk after stop, a
//! tick after an error) are ignored by the transition guards rather than
//! patched around at each call site.

use serde::Serialize;

use super::stats::{FeedbackReport, TranscriptSegment};
use crate::analysis::{self, VolumeBand};
use crate::expression::EmotionSample;

/// Recording lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RecordingState {
    /// No take yet (or the last take was discarded by a failed start)
    Idle,
    /// A take is in progress
    Recording,
    /// The last take is frozen and exportable; behaves like Idle for start
    Stopped,
}

/// Playback state of the recorded take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlaybackState {
    Playing,
    Paused,
}

/// Everything a session knows, as one immutable snapshot
#[derive(Debug, Clone, Serialize)]
pub struct SessionState {
    pub recording: RecordingState,
    pub playback: PlaybackState,

    /// Whole seconds recorded in the current take
    pub elapsed_seconds: u64,

    /// Whether the capture stream has been acquired and is live
    pub capture_live: bool,

    /// Whether speech features are available this session
    pub speech_enabled: bool,

    /// Interim display line, replaced on every recognition event
    pub current_line: String,

    /// Cumulative transcript: finalized segments in arrival order, append-only
    pub transcript: Vec<TranscriptSegment>,

    /// Chunks recorded in the current take
    pub chunk_count: usize,

    /// Bytes recorded in the current take
    pub recorded_bytes: u64,

    /// Latest emotion distribution; `None` until a face was seen
    pub emotions: Option<EmotionSample>,

    /// Live feedback report
    pub report: FeedbackReport,

    /// Last surfaced error, if any
    pub last_error: Option<String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            recording: RecordingState::Idle,
            playback: PlaybackState::Paused,
            elapsed_seconds: 0,
            capture_live: false,
            speech_enabled: true,
            current_line: String::new(),
            transcript: Vec::new(),
            chunk_count: 0,
            recorded_bytes: 0,
            emotions: None,
            report: FeedbackReport::default(),
            last_error: None,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recording == RecordingState::Recording
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

/// Typed session events, one per async callback source
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Capture acquisition completed; the stream is live
    CaptureAcquired,

    /// A take started: elapsed time and take counters reset
    RecordingStarted,

    /// One second of recording elapsed
    TimerTick,

    /// The recorder accepted a chunk
    RecorderChunk { bytes: usize },

    /// A recognition event was partitioned into the interim line and zero or
    /// more newly finalized segments
    RecognitionResult {
        interim_line: String,
        finalized: Vec<TranscriptSegment>,
    },

    /// The recognition service reported a terminal error
    RecognitionError { message: String },

    /// The recognition service ended on its own while recording
    RecognitionEnded,

    /// Speech features are unavailable for this session
    SpeechDisabled { message: String },

    /// The volume monitor classified the latest tap snapshot
    VolumeSample { band: VolumeBand },

    /// The expression sampler published a new distribution
    EmotionSampled { sample: EmotionSample },

    /// The take was stopped by the user
    RecordingStopped,

    /// Play/pause was toggled on the recorded take
    PlaybackToggled,
}

impl SessionState {
    /// Apply one event, producing the next snapshot.
    pub fn apply(&self, event: &SessionEvent) -> SessionState {
        let mut next = self.clone();

        match event {
            SessionEvent::CaptureAcquired => {
                next.capture_live = true;
            }

            SessionEvent::RecordingStarted => {
                next.recording = RecordingState::Recording;
                next.elapsed_seconds = 0;
                next.chunk_count = 0;
                next.recorded_bytes = 0;
                next.last_error = None;
            }

            SessionEvent::TimerTick => {
                if next.is_recording() {
                    next.elapsed_seconds += 1;
                }
            }

            SessionEvent::RecorderChunk { bytes } => {
                // A chunk landing after stop belongs to no take
                if next.is_recording() {
                    next.chunk_count += 1;
                    next.recorded_bytes += *bytes as u64;
                }
            }

            SessionEvent::RecognitionResult {
                interim_line,
                finalized,
            } => {
                if next.is_recording() {
                    next.current_line = interim_line.clone();
                    for segment in finalized {
                        let analysis =
                            analysis::analyze_segment(&segment.text, next.elapsed_seconds);
                        next.report.pacing_wpm = analysis.pacing_wpm;
                        next.report.filler_words = analysis.filler_count;
                        next.transcript.push(segment.clone());
                    }
                }
            }

            SessionEvent::RecognitionError { message } => {
                // Joint stop: a recognition error halts the whole take
                if next.is_recording() {
                    next.recording = RecordingState::Stopped;
                }
                next.last_error = Some(message.clone());
            }

            SessionEvent::RecognitionEnded => {
                if next.is_recording() {
                    next.recording = RecordingState::Stopped;
                    next.last_error =
                        Some("Speech recognition ended; recording was stopped".to_string());
                }
            }

            SessionEvent::SpeechDisabled { message } => {
                next.speech_enabled = false;
                next.last_error = Some(message.clone());
            }

            SessionEvent::VolumeSample { band } => {
                if next.is_recording() {
                    next.report.volume = Some(*band);
                    next.report.volume_feedback = Some(band.feedback().to_string());
                }
            }

            SessionEvent::EmotionSampled { sample } => {
                // Sampling runs whenever the stream is live, recording or not
                if next.capture_live {
                    next.emotions = Some(sample.clone());
                }
            }

            SessionEvent::RecordingStopped => {
                if next.is_recording() {
                    next.recording = RecordingState::Stopped;
                }
            }

            SessionEvent::PlaybackToggled => {
                next.playback = match next.playback {
                    PlaybackState::Playing => PlaybackState::Paused,
                    PlaybackState::Paused => PlaybackState::Playing,
                };
            }
        }

        next
    }
}
