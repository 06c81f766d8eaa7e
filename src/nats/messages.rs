use crate::protocol::FrameKind;
use serde::{Deserialize, Serialize};

/// Media frame forwarded to NATS
#[derive(Debug, Serialize, Deserialize)]
pub struct MediaFrameMessage {
    pub meeting_uuid: String,
    pub stream_id: String,
    pub kind: FrameKind,
    pub payload: String, // Base64-encoded raw frame
    pub timestamp: String, // RFC3339 timestamp
}
