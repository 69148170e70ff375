use super::handlers;
use super::state::AppState;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Session lifecycle
        .route("/sessions", post(handlers::create_session))
        .route("/sessions/:session_id", delete(handlers::delete_session))
        // Recording control
        .route(
            "/sessions/:session_id/record/start",
            post(handlers::start_recording),
        )
        .route(
            "/sessions/:session_id/record/stop",
            post(handlers::stop_recording),
        )
        .route(
            "/sessions/:session_id/playback/toggle",
            post(handlers::toggle_playback),
        )
        // Session queries
        .route(
            "/sessions/:session_id/status",
            get(handlers::get_session_status),
        )
        .route(
            "/sessions/:session_id/transcript",
            get(handlers::get_session_transcript),
        )
        .route(
            "/sessions/:session_id/feedback",
            get(handlers::get_session_feedback),
        )
        .route(
            "/sessions/:session_id/emotions",
            get(handlers::get_session_emotions),
        )
        // Exports
        .route(
            "/sessions/:session_id/export/recording",
            get(handlers::export_recording),
        )
        .route(
            "/sessions/:session_id/export/transcript",
            get(handlers::export_transcript),
        )
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
