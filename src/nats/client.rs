use crate::consumer::FrameConsumer;
use crate::protocol::FrameKind;
use crate::session::SessionContext;
use anyhow::{Context, Result};
use async_nats::Client;
use base64::Engine;
use tracing::{debug, error, info};

/// Publishes Media session frames to NATS
pub struct NatsClient {
    client: Client,
    subject_prefix: String,
}

impl NatsClient {
    /// Connect to NATS server
    pub async fn connect(url: &str, subject_prefix: impl Into<String>) -> Result<Self> {
        info!("Connecting to NATS at {}", url);

        let client = async_nats::connect(url)
            .await
            .context("Failed to connect to NATS")?;

        info!("Connected to NATS successfully");

        Ok(Self {
            client,
            subject_prefix: subject_prefix.into(),
        })
    }

    /// Subject a frame is published on: `{prefix}.{kind}.{stream_id}`
    pub fn subject(prefix: &str, kind: FrameKind, stream_id: &str) -> String {
        format!("{}.{}.{}", prefix, kind.as_str(), stream_id)
    }

    /// Publish one raw frame
    pub async fn publish_frame(
        &self,
        ctx: &SessionContext,
        kind: FrameKind,
        frame: &[u8],
    ) -> Result<()> {
        let subject = Self::subject(&self.subject_prefix, kind, &ctx.stream_id);

        let message = super::messages::MediaFrameMessage {
            meeting_uuid: ctx.meeting_uuid.clone(),
            stream_id: ctx.stream_id.clone(),
            kind,
            payload: base64::engine::general_purpose::STANDARD.encode(frame),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        let payload = serde_json::to_vec(&message)?;

        self.client
            .publish(subject.clone(), payload.into())
            .await
            .context("Failed to publish media frame")?;

        debug!("Published {} frame to {} (bytes={})", kind.as_str(), subject, frame.len());

        Ok(())
    }

    async fn forward(&self, ctx: &SessionContext, kind: FrameKind, frame: &[u8]) {
        if let Err(e) = self.publish_frame(ctx, kind, frame).await {
            error!("Failed to forward {} frame to NATS: {}", kind.as_str(), e);
        }
    }
}

#[async_trait::async_trait]
impl FrameConsumer for NatsClient {
    async fn on_audio_frame(&self, ctx: &SessionContext, frame: &[u8]) {
        self.forward(ctx, FrameKind::Audio, frame).await;
    }

    async fn on_video_frame(&self, ctx: &SessionContext, frame: &[u8]) {
        self.forward(ctx, FrameKind::Video, frame).await;
    }

    async fn on_transcript_frame(&self, ctx: &SessionContext, frame: &[u8]) {
        self.forward(ctx, FrameKind::Transcript, frame).await;
    }
}
