//! Recording session management
//!
//! This module provides the session abstraction that manages:
//! - Capture acquisition and the recorded chunk sequence
//! - The recognition subscription and transcript accumulation
//! - Volume monitoring and expression sampling
//! - The elapsed timer and the session state machine
//! - Session statistics and exports

mod config;
mod controller;
mod state;
mod stats;

pub use config::SessionConfig;
pub use controller::SessionController;
pub use state::{PlaybackState, RecordingState, SessionEvent, SessionState};
pub use stats::{FeedbackReport, SessionStats, TranscriptSegment};
