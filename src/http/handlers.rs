use super::state::AppState;
use crate::capture::{
    AudioTapSource, CaptureBackendFactory, CaptureConfig, CaptureSource, WavTapSource,
};
use crate::error::SessionError;
use crate::expression::{EmotionChart, ExpressionService, NatsExpressionService};
use crate::recognition::{NatsRecognitionService, RecognitionService};
use crate::session::{SessionConfig, SessionController, SessionStats};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    /// Optional session ID (if not provided, generate UUID)
    pub session_id: Option<String>,

    /// Media file replayed as the capture stream (defaults to the configured
    /// path; without one the session expects a live capture pipeline)
    pub media_path: Option<String>,

    /// WAV fixture backing the volume tap (defaults to the configured path)
    pub tap_path: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct StartRecordingResponse {
    pub session_id: String,
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct StopRecordingResponse {
    pub session_id: String,
    pub status: String,
    pub stats: SessionStats,
}

#[derive(Debug, Serialize)]
pub struct PlaybackResponse {
    pub session_id: String,
    pub playback: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn session_not_found(session_id: &str) -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("Session {} not found", session_id),
        }),
    )
        .into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /sessions
/// Create a new session (capture is acquired on the first recording start)
pub async fn create_session(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> impl IntoResponse {
    let session_id = req
        .session_id
        .unwrap_or_else(|| format!("interview-{}", uuid::Uuid::new_v4()));

    info!("Creating session: {}", session_id);

    // Check for an existing session with this id
    {
        let sessions = state.sessions.read().await;
        if sessions.contains_key(&session_id) {
            return (
                StatusCode::CONFLICT,
                Json(ErrorResponse {
                    error: format!("Session {} already exists", session_id),
                }),
            )
                .into_response();
        }
    }

    // Build the capture backend
    let capture_config = CaptureConfig {
        chunk_interval_ms: state.config.capture.chunk_interval_ms,
        ..Default::default()
    };
    let media_path = req.media_path.or_else(|| state.config.capture.media_path.clone());
    let source = match media_path {
        Some(path) => CaptureSource::File(path.into()),
        None => CaptureSource::Device,
    };
    let backend = match CaptureBackendFactory::create(source, capture_config) {
        Ok(b) => b,
        Err(e) => {
            error!("Failed to create capture backend: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to create capture backend: {}", e),
                }),
            )
                .into_response();
        }
    };

    // Connect the external recognition and expression services. Connection
    // failure disables speech and expression features but keeps the session
    // usable (recording and volume still work).
    let (recognition, expression): (
        Option<Arc<dyn RecognitionService>>,
        Option<Arc<dyn ExpressionService>>,
    ) = match async_nats::connect(&state.config.nats.url).await {
        Ok(client) => (
            Some(Arc::new(NatsRecognitionService::new(client.clone()))),
            Some(Arc::new(NatsExpressionService::new(client))),
        ),
        Err(e) => {
            warn!(
                "NATS unavailable at {}; speech and expression features disabled: {}",
                state.config.nats.url, e
            );
            (None, None)
        }
    };

    // Volume tap: configured WAV fixture, or the live microphone when built
    // with the `microphone` feature
    let tap_path = req.tap_path.or_else(|| state.config.capture.tap_path.clone());
    let tap_source: Option<Arc<dyn AudioTapSource>> = match tap_path {
        Some(path) => Some(Arc::new(WavTapSource::new(path))),
        None => default_tap_source(),
    };

    let session_config = SessionConfig {
        session_id: session_id.clone(),
        ..Default::default()
    };
    let controller = Arc::new(SessionController::new(
        session_config,
        backend,
        recognition,
        expression,
        tap_source,
    ));

    {
        let mut sessions = state.sessions.write().await;
        sessions.insert(session_id.clone(), controller);
    }

    info!("Session created: {}", session_id);

    (
        StatusCode::OK,
        Json(CreateSessionResponse {
            session_id,
            status: "created".to_string(),
        }),
    )
        .into_response()
}

#[cfg(feature = "microphone")]
fn default_tap_source() -> Option<Arc<dyn AudioTapSource>> {
    Some(Arc::new(crate::capture::MicrophoneTapSource))
}

#[cfg(not(feature = "microphone"))]
fn default_tap_source() -> Option<Arc<dyn AudioTapSource>> {
    None
}

/// POST /sessions/:session_id/record/start
/// Start recording a take
pub async fn start_recording(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let session = {
        let sessions = state.sessions.read().await;
        sessions.get(&session_id).cloned()
    };

    let Some(session) = session else {
        return session_not_found(&session_id);
    };

    match session.start_recording().await {
        Ok(()) => (
            StatusCode::OK,
            Json(StartRecordingResponse {
                session_id: session_id.clone(),
                status: "recording".to_string(),
                message: format!("Recording started for session {}", session_id),
            }),
        )
            .into_response(),
        Err(e @ SessionError::Acquisition { .. }) => {
            // Reported, non-fatal: the session stays idle and may retry
            error!("Failed to start recording: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            error!("Failed to start recording: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to start recording: {}", e),
                }),
            )
                .into_response()
        }
    }
}

/// POST /sessions/:session_id/record/stop
/// Stop the current take
pub async fn stop_recording(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let session = {
        let sessions = state.sessions.read().await;
        sessions.get(&session_id).cloned()
    };

    let Some(session) = session else {
        return session_not_found(&session_id);
    };

    let stats = session.stop_recording().await;

    (
        StatusCode::OK,
        Json(StopRecordingResponse {
            session_id,
            status: "stopped".to_string(),
            stats,
        }),
    )
        .into_response()
}

/// POST /sessions/:session_id/playback/toggle
/// Toggle play/pause on the recorded take
pub async fn toggle_playback(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let session = {
        let sessions = state.sessions.read().await;
        sessions.get(&session_id).cloned()
    };

    let Some(session) = session else {
        return session_not_found(&session_id);
    };

    let playback = session.toggle_playback();

    (
        StatusCode::OK,
        Json(PlaybackResponse {
            session_id,
            playback: format!("{:?}", playback).to_lowercase(),
        }),
    )
        .into_response()
}

/// GET /sessions/:session_id/status
/// Get status of a session
pub async fn get_session_status(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let sessions = state.sessions.read().await;

    match sessions.get(&session_id) {
        Some(session) => (StatusCode::OK, Json(session.get_stats())).into_response(),
        None => session_not_found(&session_id),
    }
}

/// GET /sessions/:session_id/transcript
/// Get the accumulated transcript (finalized segments so far)
pub async fn get_session_transcript(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let sessions = state.sessions.read().await;

    match sessions.get(&session_id) {
        Some(session) => (StatusCode::OK, Json(session.get_transcript())).into_response(),
        None => session_not_found(&session_id),
    }
}

/// GET /sessions/:session_id/feedback
/// Get the live feedback report
pub async fn get_session_feedback(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let sessions = state.sessions.read().await;

    match sessions.get(&session_id) {
        Some(session) => {
            (StatusCode::OK, Json(session.state_snapshot().report)).into_response()
        }
        None => session_not_found(&session_id),
    }
}

/// GET /sessions/:session_id/emotions
/// Get the emotion distribution as chart data (two-decimal percentages)
pub async fn get_session_emotions(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let sessions = state.sessions.read().await;

    match sessions.get(&session_id) {
        Some(session) => {
            let snapshot = session.state_snapshot();
            let chart = EmotionChart::from_sample(snapshot.emotions.as_ref());
            (StatusCode::OK, Json(chart)).into_response()
        }
        None => session_not_found(&session_id),
    }
}

/// GET /sessions/:session_id/export/recording
/// Download the recorded take as one media file
pub async fn export_recording(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let session = {
        let sessions = state.sessions.read().await;
        sessions.get(&session_id).cloned()
    };

    let Some(session) = session else {
        return session_not_found(&session_id);
    };

    let blob = session.export_recording().await;
    if blob.is_empty() {
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "No recorded media to export".to_string(),
            }),
        )
            .into_response();
    }

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "video/webm"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"interview-recording.webm\"",
            ),
        ],
        blob,
    )
        .into_response()
}

/// GET /sessions/:session_id/export/transcript
/// Download the cumulative transcript as plain text
pub async fn export_transcript(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let sessions = state.sessions.read().await;

    match sessions.get(&session_id) {
        Some(session) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"transcript.txt\"",
                ),
            ],
            session.transcript_text(),
        )
            .into_response(),
        None => session_not_found(&session_id),
    }
}

/// DELETE /sessions/:session_id
/// Tear the session down and release its capture stream
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    let session = {
        let mut sessions = state.sessions.write().await;
        sessions.remove(&session_id)
    };

    match session {
        Some(session) => {
            session.shutdown().await;
            info!("Session deleted: {}", session_id);
            (
                StatusCode::OK,
                Json(CreateSessionResponse {
                    session_id,
                    status: "deleted".to_string(),
                }),
            )
                .into_response()
        }
        None => session_not_found(&session_id),
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
