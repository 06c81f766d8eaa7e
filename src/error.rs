//! Error taxonomy for the session chain
//!
//! - `CodecError`: a single inbound message could not be decoded (dropped, session continues)
//! - `TransportError`: connect/send failure or disconnect (ends the owning session)
//! - `SessionError`: everything a session task can terminate with, plus the
//!   configuration and negotiation failures the orchestrator reports

use crate::protocol::MsgType;
use crate::transport::Stage;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("message is not a JSON object")]
    NotAnObject,

    #[error("message has no integer msg_type")]
    MissingMsgType,

    #[error("invalid fields for msg_type {msg_type}: {source}")]
    InvalidFields {
        msg_type: MsgType,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid payload for event {event}: {source}")]
    InvalidEvent {
        event: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("[{stage}] failed to connect to {url}: {reason}")]
    Connect {
        stage: Stage,
        url: String,
        reason: String,
    },

    #[error("[{stage}] connection is closed")]
    Closed { stage: Stage },
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("[{stage}] configuration error: {reason}")]
    Configuration { stage: Stage, reason: String },

    #[error("[{stage}] negotiation failed for msg_type {msg_type}: status_code {status_code}")]
    Negotiation {
        stage: Stage,
        msg_type: MsgType,
        status_code: i64,
    },
}
