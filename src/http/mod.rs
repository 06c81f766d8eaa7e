//! HTTP status API for active chains
//!
//! - GET /health - Health check
//! - GET /streams - Snapshots of every active chain
//! - GET /streams/:meeting_uuid - Snapshot of one chain
//! - POST /streams/:meeting_uuid/stop - Cancel a chain

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
