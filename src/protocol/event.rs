use crate::error::CodecError;
use serde::Deserialize;
use serde_json::Value;

pub const RTMS_STARTED: &str = "meeting.rtms_started";
pub const RTMS_STOPPED: &str = "meeting.rtms_stopped";

/// Notification carried in the `content` field of an Event frame
#[derive(Debug, Clone, PartialEq)]
pub enum EventNotification {
    RtmsStarted(RtmsStarted),
    RtmsStopped { meeting_uuid: String },
    Other { event: String },
}

/// Payload of `meeting.rtms_started`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RtmsStarted {
    /// Signaling endpoint; may be empty, which the orchestrator rejects
    #[serde(default)]
    pub server_urls: String,
    pub meeting_uuid: String,
    pub rtms_stream_id: String,
}

#[derive(Debug, Deserialize)]
struct RtmsStopped {
    meeting_uuid: String,
}

#[derive(Debug, Deserialize)]
struct RawNotification {
    #[serde(default)]
    event: Option<String>,
    #[serde(default)]
    payload: Value,
}

/// Parse an Event session frame
///
/// Returns `Ok(None)` for frames that carry no JSON notification: no string
/// `content` field, or `content` that does not start with `{`.
pub fn parse_event_frame(raw: &[u8]) -> Result<Option<EventNotification>, CodecError> {
    let outer: Value = serde_json::from_slice(raw)?;

    let content = match outer.get("content") {
        Some(Value::String(content)) if content.starts_with('{') => content,
        _ => return Ok(None),
    };

    let inner: RawNotification = serde_json::from_str(content)?;
    let event = inner.event.unwrap_or_else(|| "unknown".to_string());

    let notification = match event.as_str() {
        RTMS_STARTED => EventNotification::RtmsStarted(payload(&event, inner.payload)?),
        RTMS_STOPPED => {
            let stopped: RtmsStopped = payload(&event, inner.payload)?;
            EventNotification::RtmsStopped {
                meeting_uuid: stopped.meeting_uuid,
            }
        }
        _ => EventNotification::Other { event },
    };

    Ok(Some(notification))
}

fn payload<T: serde::de::DeserializeOwned>(event: &str, payload: Value) -> Result<T, CodecError> {
    serde_json::from_value(payload).map_err(|source| CodecError::InvalidEvent {
        event: event.to_string(),
        source,
    })
}
