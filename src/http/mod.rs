//! HTTP API server for external control (the interview UI)
//!
//! This module provides a REST API for driving sessions:
//! - POST /sessions - Create a session
//! - POST /sessions/:id/record/start - Start recording a take
//! - POST /sessions/:id/record/stop - Stop the take
//! - POST /sessions/:id/playback/toggle - Toggle playback
//! - GET /sessions/:id/status - Query session status
//! - GET /sessions/:id/transcript - Accumulated transcript
//! - GET /sessions/:id/feedback - Live feedback report
//! - GET /sessions/:id/emotions - Emotion chart data
//! - GET /sessions/:id/export/recording - Download the recorded media
//! - GET /sessions/:id/export/transcript - Download the transcript
//! - DELETE /sessions/:id - Tear the session down
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
