use crate::protocol::MediaParams;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables shared by every session the orchestrator starts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionOptions {
    /// Seconds between Event session heartbeats
    /// Default: 30
    #[serde(default = "default_heartbeat_interval_secs")]
    pub heartbeat_interval_secs: u64,

    /// Capabilities announced in the Media handshake
    #[serde(default)]
    pub media_params: MediaParams,
}

fn default_heartbeat_interval_secs() -> u64 {
    30
}

impl SessionOptions {
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs.max(1))
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            heartbeat_interval_secs: default_heartbeat_interval_secs(),
            media_params: MediaParams::default(),
        }
    }
}
