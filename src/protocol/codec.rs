use super::messages::{FrameKind, HandshakeResponse, KeepAliveRequest, MsgType};
use crate::error::CodecError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A decoded Signaling/Media frame: the `msg_type` tag plus every other field as-is
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub msg_type: MsgType,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// An envelope classified by `msg_type`, with the fields each kind needs
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// msg_type 2 or 4
    HandshakeResponse {
        msg_type: MsgType,
        response: HandshakeResponse,
    },
    /// msg_type 12
    KeepAlive(KeepAliveRequest),
    /// msg_type 14, 15 or 17; the payload is left undecoded
    Frame(FrameKind),
    Other(MsgType),
}

/// Decode a raw text frame into an envelope
pub fn decode(raw: &[u8]) -> Result<Envelope, CodecError> {
    let value: Value = serde_json::from_slice(raw)?;
    let Value::Object(mut fields) = value else {
        return Err(CodecError::NotAnObject);
    };

    let msg_type = fields
        .remove("msg_type")
        .and_then(|tag| tag.as_i64())
        .map(MsgType::from)
        .ok_or(CodecError::MissingMsgType)?;

    Ok(Envelope { msg_type, fields })
}

/// Encode an outbound message as a JSON text frame
pub fn encode<T: Serialize>(message: &T) -> Result<String, CodecError> {
    Ok(serde_json::to_string(message)?)
}

impl Envelope {
    pub fn new(msg_type: MsgType) -> Self {
        Self {
            msg_type,
            fields: Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn status_code(&self) -> Option<i64> {
        self.get("status_code").and_then(Value::as_i64)
    }

    pub fn encode(&self) -> Result<String, CodecError> {
        encode(self)
    }

    /// Classify by `msg_type`, extracting typed fields where the session acts on them
    pub fn classify(&self) -> Result<Inbound, CodecError> {
        match self.msg_type {
            MsgType::SignalingHandshakeResp | MsgType::MediaHandshakeResp => {
                Ok(Inbound::HandshakeResponse {
                    msg_type: self.msg_type,
                    response: self.typed()?,
                })
            }
            MsgType::KeepAliveReq => Ok(Inbound::KeepAlive(self.typed()?)),
            other => match FrameKind::from_msg_type(other) {
                Some(kind) => Ok(Inbound::Frame(kind)),
                None => Ok(Inbound::Other(other)),
            },
        }
    }

    fn typed<T: DeserializeOwned>(&self) -> Result<T, CodecError> {
        serde_json::from_value(Value::Object(self.fields.clone())).map_err(|source| {
            CodecError::InvalidFields {
                msg_type: self.msg_type,
                source,
            }
        })
    }
}
