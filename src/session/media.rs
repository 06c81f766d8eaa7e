use super::orchestrator::{Chain, SessionOrchestrator};
use crate::error::SessionError;
use crate::protocol::{
    decode, FrameKind, Inbound, KeepAliveResponse, MediaHandshake, MsgType, StartStream,
};
use crate::transport::{Connection, ConnectionHandle, Stage};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaState {
    Connecting,
    HandshakeSent,
    AwaitingResponse,
    Streaming,
    Closed,
}

/// Third stage: receives payload frames and confirms stream start on Signaling
pub struct MediaSession {
    url: String,
    chain: Arc<Chain>,
    /// Clone of the Signaling connection's handle, used only for msg_type 7
    signaling: ConnectionHandle,
    orchestrator: SessionOrchestrator,
    state: MediaState,
}

impl MediaSession {
    pub fn new(
        url: String,
        chain: Arc<Chain>,
        signaling: ConnectionHandle,
        orchestrator: SessionOrchestrator,
    ) -> Self {
        Self {
            url,
            chain,
            signaling,
            orchestrator,
            state: MediaState::Connecting,
        }
    }

    pub async fn run(mut self) -> Result<(), SessionError> {
        self.transition(MediaState::Connecting).await;
        let result = self.serve().await;
        self.transition(MediaState::Closed).await;
        result
    }

    async fn serve(&mut self) -> Result<(), SessionError> {
        let Connection {
            handle,
            mut inbound,
        } = self
            .orchestrator
            .transport()
            .connect(Stage::Media, &self.url)
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
        let handshake = MediaHandshake::new(
            &self.chain.ctx,
            self.orchestrator.options().media_params.clone(),
        );
        handle.send(&handshake)?;
        self.transition(MediaState::HandshakeSent).await;
        info!("[media] Sent handshake");
        self.transition(MediaState::AwaitingResponse).await;

        let cancel = self.chain.cancel.clone();
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("[media] Chain cancelled for meeting {}", self.chain.ctx.meeting_uuid);
                    return Ok(());
                }
                frame = inbound.recv() => match frame {
                    Some(text) => self.handle_frame(handle, text).await?,
                    None => {
                        info!("[media] Connection closed");
                        return Ok(());
                    }
                },
            }
        }
    }

    async fn handle_frame(
        &mut self,
        handle: &ConnectionHandle,
        raw: String,
    ) -> Result<(), SessionError> {
        let inbound = match decode(raw.as_bytes()).and_then(|envelope| envelope.classify()) {
            Ok(inbound) => inbound,
            Err(e) => {
                warn!("[media] Dropping undecodable message: {}", e);
                return Ok(());
            }
        };

        match inbound {
            Inbound::Frame(kind) => self.dispatch(kind, raw.as_bytes()).await,
            Inbound::KeepAlive(request) => {
                handle.send(&KeepAliveResponse::echo(&request))?;
                self.chain.stats.record_keep_alive();
                debug!("[media] Responded to KEEP_ALIVE_REQ");
            }
            Inbound::HandshakeResponse {
                msg_type: MsgType::MediaHandshakeResp,
                response,
            } => {
                if self.state == MediaState::Streaming {
                    warn!("[media] Ignoring repeated handshake response (msg_type 4)");
                    return Ok(());
                }

                if !response.is_success() {
                    let failure = SessionError::Negotiation {
                        stage: Stage::Media,
                        msg_type: MsgType::MediaHandshakeResp,
                        status_code: response.status_code.unwrap_or(-1),
                    };
                    error!("{}", failure);
                    return Ok(());
                }

                info!("[media] Handshake accepted, requesting stream start");
                // Goes out on the Signaling connection; a dead Signaling socket
                // fails this send only
                if let Err(e) = self
                    .signaling
                    .send(&StartStream::new(self.chain.ctx.stream_id.clone()))
                {
                    error!("[media] Failed to send start-stream (msg_type 7): {}", e);
                }
                self.transition(MediaState::Streaming).await;
            }
            other => debug!("[media] Ignoring {:?}", other),
        }

        Ok(())
    }

    async fn dispatch(&self, kind: FrameKind, frame: &[u8]) {
        self.chain.stats.record_frame(kind);

        let consumer = self.orchestrator.consumer();
        let ctx = &self.chain.ctx;
        match kind {
            FrameKind::Audio => consumer.on_audio_frame(ctx, frame).await,
            FrameKind::Video => consumer.on_video_frame(ctx, frame).await,
            FrameKind::Transcript => consumer.on_transcript_frame(ctx, frame).await,
        }
    }

    async fn transition(&mut self, state: MediaState) {
        self.state = state;
        self.chain.stats.set_media_state(state).await;
    }
}
