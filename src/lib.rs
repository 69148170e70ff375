pub mod analysis;
pub mod capture;
pub mod config;
pub mod error;
pub mod expression;
pub mod http;
pub mod recognition;
pub mod recording;
pub mod session;

pub use analysis::{SegmentAnalysis, VolumeBand};
pub use capture::{
    AudioTap, AudioTapSource, CaptureBackend, CaptureBackendFactory, CaptureConfig, CaptureSource,
    FileCaptureBackend, MediaChunk, MediaStream, VideoFrame, WavFileTap, WavTapSource,
};
pub use config::Config;
pub use error::SessionError;
pub use expression::{
    Emotion, EmotionChart, EmotionSample, ExpressionSampler, ExpressionService, FaceDetection,
    NatsExpressionService,
};
pub use http::{create_router, AppState};
pub use recognition::{
    RecognitionConfig, RecognitionEventMessage, RecognitionService, NatsRecognitionService,
};
pub use recording::{ChunkRecorder, ExportInfo};
pub use session::{
    FeedbackReport, PlaybackState, RecordingState, SessionConfig, SessionController, SessionEvent,
    SessionState, SessionStats, TranscriptSegment,
};
