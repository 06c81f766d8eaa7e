use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Chain queries
        .route("/streams", get(handlers::list_streams))
        .route("/streams/:meeting_uuid", get(handlers::get_stream))
        // Chain control
        .route("/streams/:meeting_uuid/stop", post(handlers::stop_stream))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
