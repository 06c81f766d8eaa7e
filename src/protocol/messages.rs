use crate::session::SessionContext;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Protocol version announced in both handshakes
pub const PROTOCOL_VERSION: u32 = 1;

/// Media type bitmask requested in the media handshake (audio | video | transcript)
pub const MEDIA_TYPE_ALL: u32 = 32;

/// Message type tag carried by every Signaling and Media frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum MsgType {
    SignalingHandshakeReq,
    SignalingHandshakeResp,
    MediaHandshakeReq,
    MediaHandshakeResp,
    StartStream,
    KeepAliveReq,
    KeepAliveResp,
    Audio,
    Video,
    Transcript,
    /// Any tag this client does not act on
    Other(i64),
}

impl MsgType {
    pub const fn code(self) -> i64 {
        match self {
            MsgType::SignalingHandshakeReq => 1,
            MsgType::SignalingHandshakeResp => 2,
            MsgType::MediaHandshakeReq => 3,
            MsgType::MediaHandshakeResp => 4,
            MsgType::StartStream => 7,
            MsgType::KeepAliveReq => 12,
            MsgType::KeepAliveResp => 13,
            MsgType::Audio => 14,
            MsgType::Video => 15,
            MsgType::Transcript => 17,
            MsgType::Other(code) => code,
        }
    }
}

impl From<i64> for MsgType {
    fn from(code: i64) -> Self {
        match code {
            1 => MsgType::SignalingHandshakeReq,
            2 => MsgType::SignalingHandshakeResp,
            3 => MsgType::MediaHandshakeReq,
            4 => MsgType::MediaHandshakeResp,
            7 => MsgType::StartStream,
            12 => MsgType::KeepAliveReq,
            13 => MsgType::KeepAliveResp,
            14 => MsgType::Audio,
            15 => MsgType::Video,
            17 => MsgType::Transcript,
            other => MsgType::Other(other),
        }
    }
}

impl From<MsgType> for i64 {
    fn from(msg_type: MsgType) -> Self {
        msg_type.code()
    }
}

impl fmt::Display for MsgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Kind of payload frame delivered on the Media session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameKind {
    Audio,
    Video,
    Transcript,
}

impl FrameKind {
    pub fn from_msg_type(msg_type: MsgType) -> Option<Self> {
        match msg_type {
            MsgType::Audio => Some(FrameKind::Audio),
            MsgType::Video => Some(FrameKind::Video),
            MsgType::Transcript => Some(FrameKind::Transcript),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FrameKind::Audio => "audio",
            FrameKind::Video => "video",
            FrameKind::Transcript => "transcript",
        }
    }
}

// ============================================================================
// Outbound
// ============================================================================

/// Event session keep-alive: exactly `{"module":"heartbeat"}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heartbeat {
    pub module: String,
}

impl Default for Heartbeat {
    fn default() -> Self {
        Self {
            module: "heartbeat".to_string(),
        }
    }
}

/// First message on the Signaling session (msg_type 1)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalingHandshake {
    pub msg_type: MsgType,
    pub protocol_version: u32,
    pub meeting_uuid: String,
    pub rtms_stream_id: String,
    /// Random nonce; only required to be present
    pub sequence: u32,
    pub signature: String,
}

impl SignalingHandshake {
    pub fn new(ctx: &SessionContext, sequence: u32) -> Self {
        Self {
            msg_type: MsgType::SignalingHandshakeReq,
            protocol_version: PROTOCOL_VERSION,
            meeting_uuid: ctx.meeting_uuid.clone(),
            rtms_stream_id: ctx.stream_id.clone(),
            sequence,
            signature: ctx.signature(),
        }
    }
}

/// Audio capability announcement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioParams {
    pub content_type: u32,
    pub sample_rate: u32,
    pub channel: u32,
    pub codec: u32,
    pub data_opt: u32,
    pub send_rate: u32,
}

impl Default for AudioParams {
    fn default() -> Self {
        Self {
            content_type: 1, // RTP
            sample_rate: 1,  // 16kHz
            channel: 1,      // mono
            codec: 1,        // L16
            data_opt: 1,     // mixed stream
            send_rate: 100,  // ms
        }
    }
}

/// Video capability announcement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoParams {
    pub codec: u32,
    pub resolution: u32,
    pub fps: u32,
}

impl Default for VideoParams {
    fn default() -> Self {
        Self {
            codec: 7,      // H.264
            resolution: 2, // HD
            fps: 25,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaParams {
    #[serde(default)]
    pub audio: AudioParams,
    #[serde(default)]
    pub video: VideoParams,
}

/// First message on the Media session (msg_type 3)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaHandshake {
    pub msg_type: MsgType,
    pub protocol_version: u32,
    pub meeting_uuid: String,
    pub rtms_stream_id: String,
    pub signature: String,
    pub media_type: u32,
    pub payload_encryption: bool,
    pub media_params: MediaParams,
}

impl MediaHandshake {
    pub fn new(ctx: &SessionContext, media_params: MediaParams) -> Self {
        Self {
            msg_type: MsgType::MediaHandshakeReq,
            protocol_version: PROTOCOL_VERSION,
            meeting_uuid: ctx.meeting_uuid.clone(),
            rtms_stream_id: ctx.stream_id.clone(),
            signature: ctx.signature(),
            media_type: MEDIA_TYPE_ALL,
            payload_encryption: false,
            media_params,
        }
    }
}

/// Sent on the Signaling connection once the Media handshake succeeds (msg_type 7)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartStream {
    pub msg_type: MsgType,
    pub rtms_stream_id: String,
}

impl StartStream {
    pub fn new(stream_id: impl Into<String>) -> Self {
        Self {
            msg_type: MsgType::StartStream,
            rtms_stream_id: stream_id.into(),
        }
    }
}

/// Reply to a keep-alive request (msg_type 13), echoing its timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeepAliveResponse {
    pub msg_type: MsgType,
    pub timestamp: Value,
}

impl KeepAliveResponse {
    pub fn echo(request: &KeepAliveRequest) -> Self {
        Self {
            msg_type: MsgType::KeepAliveResp,
            timestamp: request.timestamp.clone(),
        }
    }
}

// ============================================================================
// Inbound
// ============================================================================

/// Handshake response (msg_type 2 on Signaling, 4 on Media)
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HandshakeResponse {
    #[serde(default)]
    pub status_code: Option<i64>,
    #[serde(default)]
    pub media_server: Option<MediaServer>,
}

impl HandshakeResponse {
    pub fn is_success(&self) -> bool {
        self.status_code == Some(0)
    }

    /// `media_server.server_urls.all`, if present and non-empty
    pub fn media_url(&self) -> Option<&str> {
        self.media_server
            .as_ref()
            .and_then(|server| server.server_urls.all.as_deref())
            .filter(|url| !url.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MediaServer {
    #[serde(default)]
    pub server_urls: ServerUrls,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ServerUrls {
    #[serde(default)]
    pub all: Option<String>,
}

/// Keep-alive request (msg_type 12); the timestamp is passed through untouched
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct KeepAliveRequest {
    pub timestamp: Value,
}
