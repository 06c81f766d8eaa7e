//! Session chain management
//!
//! This module drives the three chained sessions:
//! - `EventSession` listens for `meeting.rtms_started` / `meeting.rtms_stopped`
//! - `SignalingSession` negotiates the media endpoint
//! - `MediaSession` receives payload frames and confirms stream start on Signaling
//! - `SessionOrchestrator` spawns each stage as a detached task and tracks chains

mod config;
mod context;
mod event;
mod media;
mod orchestrator;
mod signaling;
mod stats;

pub use config::SessionOptions;
pub use context::{ClientCredentials, SessionContext};
pub use event::{EventSession, EventState};
pub use media::{MediaSession, MediaState};
pub use orchestrator::{Chain, SessionOrchestrator, StageEvent};
pub use signaling::{SignalingSession, SignalingState};
pub use stats::{ChainSnapshot, ChainStats};
