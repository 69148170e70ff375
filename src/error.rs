//! Error types for interview-studio.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    /// Camera/microphone acquisition failed (permission denied, no device).
    /// Non-fatal: the session stays idle and the user may retry.
    #[error("Media capture acquisition failed: {message}")]
    Acquisition { message: String },

    /// The recognition service is unreachable or not configured.
    /// Speech features are disabled; the rest of the session remains usable.
    #[error("Speech recognition unavailable: {message}")]
    RecognitionUnsupported { message: String },

    /// The recognition service reported a runtime error mid-session.
    #[error("Speech recognition error: {message}")]
    RecognitionRuntime { message: String },

    /// Exporting recorded media or the transcript failed.
    #[error("Export failed: {message}")]
    Export { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
