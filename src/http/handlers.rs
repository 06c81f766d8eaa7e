use super::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;
use tracing::info;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct StopStreamResponse {
    pub meeting_uuid: String,
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn not_found(meeting_uuid: &str) -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("No active stream for meeting {}", meeting_uuid),
        }),
    )
        .into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /streams
/// List snapshots of all active chains
pub async fn list_streams(State(state): State<AppState>) -> impl IntoResponse {
    let snapshots = state.orchestrator.snapshots().await;
    (StatusCode::OK, Json(snapshots))
}

/// GET /streams/:meeting_uuid
/// Get the snapshot of one chain
pub async fn get_stream(
    State(state): State<AppState>,
    Path(meeting_uuid): Path<String>,
) -> impl IntoResponse {
    match state.orchestrator.snapshot(&meeting_uuid).await {
        Some(snapshot) => (StatusCode::OK, Json(snapshot)).into_response(),
        None => not_found(&meeting_uuid),
    }
}

/// POST /streams/:meeting_uuid/stop
/// Cancel the Signaling and Media sessions of a chain
pub async fn stop_stream(
    State(state): State<AppState>,
    Path(meeting_uuid): Path<String>,
) -> impl IntoResponse {
    info!("Stop requested for meeting: {}", meeting_uuid);

    if !state.orchestrator.stop_chain(&meeting_uuid).await {
        return not_found(&meeting_uuid);
    }

    (
        StatusCode::OK,
        Json(StopStreamResponse {
            meeting_uuid: meeting_uuid.clone(),
            status: "stopped".to_string(),
            message: format!("Stream stopped for meeting {}", meeting_uuid),
        }),
    )
        .into_response()
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
