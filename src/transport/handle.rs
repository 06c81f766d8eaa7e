use super::Stage;
use crate::error::{SessionError, TransportError};
use crate::protocol::encode;
use serde::Serialize;
use tokio::sync::mpsc;

/// Frames queued for a connection's writer
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    Text(String),
    Close,
}

/// Cloneable send side of an open connection
///
/// Clones share one channel. When the connection's driver stops (remote close,
/// I/O error, or `close()`), every clone starts returning `TransportError::Closed`.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    stage: Stage,
    tx: mpsc::UnboundedSender<Outbound>,
}

impl ConnectionHandle {
    pub fn new(stage: Stage, tx: mpsc::UnboundedSender<Outbound>) -> Self {
        Self { stage, tx }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn send_text(&self, text: String) -> Result<(), TransportError> {
        self.tx
            .send(Outbound::Text(text))
            .map_err(|_| TransportError::Closed { stage: self.stage })
    }

    /// Encode and queue a message
    pub fn send<T: Serialize>(&self, message: &T) -> Result<(), SessionError> {
        let text = encode(message)?;
        self.send_text(text)?;
        Ok(())
    }

    /// Ask the writer to close the connection; a no-op if it is already gone
    pub fn close(&self) {
        let _ = self.tx.send(Outbound::Close);
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// An open connection: the send handle plus inbound text frames in arrival order
pub struct Connection {
    pub handle: ConnectionHandle,
    pub inbound: mpsc::UnboundedReceiver<String>,
}

impl Connection {
    pub fn new(handle: ConnectionHandle, inbound: mpsc::UnboundedReceiver<String>) -> Self {
        Self { handle, inbound }
    }
}
