use super::{Connection, ConnectionHandle, Outbound, Stage, Transport};
use crate::error::TransportError;
use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

/// Upper bound for the closing handshake once the session is done
const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Secure WebSocket transport (TLS is handled by tokio-tungstenite)
#[derive(Debug, Clone, Default)]
pub struct WebSocketTransport;

impl WebSocketTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl Transport for WebSocketTransport {
    async fn connect(&self, stage: Stage, url: &str) -> Result<Connection, TransportError> {
        info!("[{}] Connecting to {}", stage, url);

        let (ws_stream, _) = connect_async(url)
            .await
            .map_err(|e| TransportError::Connect {
                stage,
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        info!("[{}] WebSocket connected", stage);

        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();

        tokio::spawn(drive(stage, ws_stream, outbound_rx, inbound_tx));

        Ok(Connection::new(
            ConnectionHandle::new(stage, outbound_tx),
            inbound_rx,
        ))
    }
}

/// Pump frames between the socket and the session channels until either side
/// stops, then complete the closing handshake
async fn drive(
    stage: Stage,
    ws_stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    mut outbound_rx: mpsc::UnboundedReceiver<Outbound>,
    inbound_tx: mpsc::UnboundedSender<String>,
) {
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    loop {
        tokio::select! {
            outbound = outbound_rx.recv() => match outbound {
                Some(Outbound::Text(text)) => {
                    if let Err(e) = ws_sender.send(Message::Text(text)).await {
                        warn!("[{}] Send failed: {}", stage, e);
                        break;
                    }
                }
                Some(Outbound::Close) | None => break,
            },
            inbound = ws_receiver.next() => match inbound {
                Some(Ok(Message::Text(text))) => {
                    if inbound_tx.send(text).is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes) {
                    Ok(text) => {
                        if inbound_tx.send(text).is_err() {
                            break;
                        }
                    }
                    Err(_) => debug!("[{}] Dropping non-UTF-8 binary frame", stage),
                },
                Some(Ok(Message::Close(frame))) => {
                    info!("[{}] Socket closed by peer: {:?}", stage, frame);
                    break;
                }
                // Ping/pong are answered by tungstenite
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!("[{}] Socket error: {}", stage, e);
                    break;
                }
                None => break,
            },
        }
    }

    // Handles fail and the session sees end of stream from here on
    drop(outbound_rx);
    drop(inbound_tx);

    // Send our Close (or flush the reply to the peer's) and read until the
    // peer's Close ends the stream
    let finish = async {
        if let Err(e) = ws_sender.close().await {
            debug!("[{}] Close failed: {}", stage, e);
        }
        while let Some(Ok(message)) = ws_receiver.next().await {
            debug!("[{}] Discarding frame while closing: {:?}", stage, message);
        }
    };
    if timeout(CLOSE_TIMEOUT, finish).await.is_err() {
        warn!("[{}] Closing handshake timed out", stage);
    }

    debug!("[{}] Connection driver stopped", stage);
}
