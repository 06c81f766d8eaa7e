use crate::auth::sign;
use std::fmt;

/// App credentials shared by every chain
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl ClientCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

/// Immutable identity of one Event → Signaling → Media chain
///
/// Built once from a start notification and shared read-only by every session
/// of the chain.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub client_id: String,
    pub client_secret: String,
    pub meeting_uuid: String,
    pub stream_id: String,
}

impl SessionContext {
    pub fn new(
        credentials: &ClientCredentials,
        meeting_uuid: impl Into<String>,
        stream_id: impl Into<String>,
    ) -> Self {
        Self {
            client_id: credentials.client_id.clone(),
            client_secret: credentials.client_secret.clone(),
            meeting_uuid: meeting_uuid.into(),
            stream_id: stream_id.into(),
        }
    }

    /// Handshake signature for this stream
    pub fn signature(&self) -> String {
        sign(
            &self.client_id,
            &self.meeting_uuid,
            &self.stream_id,
            &self.client_secret,
        )
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("meeting_uuid", &self.meeting_uuid)
            .field("stream_id", &self.stream_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secret() {
        let ctx = SessionContext::new(&ClientCredentials::new("id", "hunter2"), "m", "s");
        let debug = format!("{:?}", ctx);

        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("hunter2"));
    }
}
