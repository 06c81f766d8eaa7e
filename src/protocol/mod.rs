//! Wire protocol for the three session stages
//!
//! Every Signaling and Media frame is a JSON object tagged with an integer
//! `msg_type`. Event frames wrap a JSON notification inside a string `content`
//! field instead.

pub mod codec;
pub mod event;
pub mod messages;

pub use codec::{decode, encode, Envelope, Inbound};
pub use event::{parse_event_frame, EventNotification, RtmsStarted, RTMS_STARTED, RTMS_STOPPED};
pub use messages::{
    AudioParams, FrameKind, HandshakeResponse, Heartbeat, KeepAliveRequest, KeepAliveResponse,
    MediaHandshake, MediaParams, MsgType, SignalingHandshake, StartStream, VideoParams,
    PROTOCOL_VERSION,
};
