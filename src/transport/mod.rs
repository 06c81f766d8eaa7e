//! Transport seam for the session chain
//!
//! A `Transport` opens a connection and hands back a `ConnectionHandle` for
//! sending plus a receiver of inbound text frames. The WebSocket implementation
//! lives in `websocket`; tests plug in channel-backed fakes.

mod handle;
mod websocket;

pub use handle::{Connection, ConnectionHandle, Outbound};
pub use websocket::WebSocketTransport;

use crate::error::TransportError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which session of the chain a connection belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Event,
    Signaling,
    Media,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Event => "event",
            Stage::Signaling => "signaling",
            Stage::Media => "media",
        };
        f.write_str(name)
    }
}

/// Opens connections for a session stage
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn connect(&self, stage: Stage, url: &str) -> Result<Connection, TransportError>;
}
