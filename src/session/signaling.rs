use super::orchestrator::{Chain, SessionOrchestrator};
use crate::error::SessionError;
use crate::protocol::{decode, Inbound, KeepAliveResponse, MsgType, SignalingHandshake};
use crate::transport::{Connection, ConnectionHandle, Stage};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Upper bound for the random handshake sequence number
const SEQUENCE_LIMIT: u32 = 1_000_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalingState {
    Connecting,
    HandshakeSent,
    AwaitingResponse,
    Active,
    Closed,
}

/// Second stage: negotiates the media endpoint and spawns the Media session
pub struct SignalingSession {
    url: String,
    chain: Arc<Chain>,
    orchestrator: SessionOrchestrator,
    state: SignalingState,
}

impl SignalingSession {
    pub fn new(url: String, chain: Arc<Chain>, orchestrator: SessionOrchestrator) -> Self {
        Self {
            url,
            chain,
            orchestrator,
            state: SignalingState::Connecting,
        }
    }

    pub async fn run(mut self) -> Result<(), SessionError> {
        let result = self.serve().await;
        self.transition(SignalingState::Closed).await;
        result
    }

    async fn serve(&mut self) -> Result<(), SessionError> {
        let Connection {
            handle,
            mut inbound,
        } = self
            .orchestrator
            .transport()
            .connect(Stage::Signaling, &self.url)
            .await?;

        let result = self.listen(&handle, &mut inbound).await;
        handle.close();
        result
    }

    async fn listen(
        &mut self,
        handle: &ConnectionHandle,
        inbound: &mut mpsc::UnboundedReceiver<String>,
    ) -> Result<(), SessionError> {
        self.send_handshake(handle).await?;

        let cancel = self.chain.cancel.clone();
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("[signaling] Chain cancelled for meeting {}", self.chain.ctx.meeting_uuid);
                    return Ok(());
                }
                frame = inbound.recv() => match frame {
                    Some(text) => self.handle_frame(handle, &text).await?,
                    None => {
                        info!("[signaling] Connection closed");
                        return Ok(());
                    }
                },
            }
        }
    }

    async fn send_handshake(&mut self, handle: &ConnectionHandle) -> Result<(), SessionError> {
        let sequence = rand::thread_rng().gen_range(0..SEQUENCE_LIMIT);
        handle.send(&SignalingHandshake::new(&self.chain.ctx, sequence))?;
        self.transition(SignalingState::HandshakeSent).await;
        info!("[signaling] Sent handshake (sequence {})", sequence);

        self.transition(SignalingState::AwaitingResponse).await;
        Ok(())
    }

    /// Process one inbound frame; only transport failures end the session
    async fn handle_frame(
        &mut self,
        handle: &ConnectionHandle,
        raw: &str,
    ) -> Result<(), SessionError> {
        let inbound = match decode(raw.as_bytes()).and_then(|envelope| envelope.classify()) {
            Ok(inbound) => inbound,
            Err(e) => {
                warn!("[signaling] Dropping undecodable message: {}", e);
                return Ok(());
            }
        };

        match inbound {
            Inbound::KeepAlive(request) => {
                handle.send(&KeepAliveResponse::echo(&request))?;
                self.chain.stats.record_keep_alive();
                debug!("[signaling] Responded to KEEP_ALIVE_REQ");
            }
            Inbound::HandshakeResponse {
                msg_type: MsgType::SignalingHandshakeResp,
                response,
            } => {
                if self.state == SignalingState::Active {
                    warn!("[signaling] Ignoring repeated handshake response (msg_type 2)");
                    return Ok(());
                }

                if !response.is_success() {
                    let failure = SessionError::Negotiation {
                        stage: Stage::Signaling,
                        msg_type: MsgType::SignalingHandshakeResp,
                        status_code: response.status_code.unwrap_or(-1),
                    };
                    error!("{}", failure);
                    return Ok(());
                }

                let Some(media_url) = response.media_url() else {
                    let failure = SessionError::Configuration {
                        stage: Stage::Signaling,
                        reason: "handshake response has no media_server.server_urls.all".into(),
                    };
                    error!("{}", failure);
                    return Ok(());
                };

                info!("[signaling] Media server URL: {}", media_url);
                self.orchestrator
                    .spawn_media(&self.chain, media_url, handle.clone())
                    .await;
                self.transition(SignalingState::Active).await;
            }
            other => debug!("[signaling] Ignoring {:?}", other),
        }

        Ok(())
    }

    async fn transition(&mut self, state: SignalingState) {
        self.state = state;
        self.chain.stats.set_signaling_state(state).await;
    }
}
