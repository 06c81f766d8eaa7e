//! Sinks for Media session payload frames
//!
//! The session chain only classifies frames by `msg_type` and forwards the raw
//! bytes; interpreting them is up to the consumer.

use crate::session::SessionContext;
use tracing::debug;

/// Receives payload frames from a Media session, in arrival order
#[async_trait::async_trait]
pub trait FrameConsumer: Send + Sync {
    async fn on_audio_frame(&self, ctx: &SessionContext, frame: &[u8]);

    async fn on_video_frame(&self, ctx: &SessionContext, frame: &[u8]);

    async fn on_transcript_frame(&self, ctx: &SessionContext, frame: &[u8]);
}

/// Consumer that only logs what arrived
#[derive(Debug, Clone, Default)]
pub struct LoggingFrameConsumer;

#[async_trait::async_trait]
impl FrameConsumer for LoggingFrameConsumer {
    async fn on_audio_frame(&self, ctx: &SessionContext, frame: &[u8]) {
        debug!("[media] Received AUDIO data for stream {} ({} bytes)", ctx.stream_id, frame.len());
    }

    async fn on_video_frame(&self, ctx: &SessionContext, frame: &[u8]) {
        debug!("[media] Received VIDEO data for stream {} ({} bytes)", ctx.stream_id, frame.len());
    }

    async fn on_transcript_frame(&self, ctx: &SessionContext, frame: &[u8]) {
        debug!(
            "[media] Received TRANSCRIPT data for stream {} ({} bytes)",
            ctx.stream_id,
            frame.len()
        );
    }
}
