use super::context::SessionContext;
use super::media::MediaState;
use super::signaling::SignalingState;
use crate::protocol::FrameKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

/// Live counters and stage states for one chain
pub struct ChainStats {
    meeting_uuid: String,
    stream_id: String,
    signaling_url: String,
    started_at: DateTime<Utc>,
    signaling_state: Mutex<SignalingState>,
    media_state: Mutex<Option<MediaState>>,
    media_url: Mutex<Option<String>>,
    audio_frames: AtomicU64,
    video_frames: AtomicU64,
    transcript_frames: AtomicU64,
    keep_alives: AtomicU64,
}

impl ChainStats {
    pub fn new(ctx: &SessionContext, signaling_url: impl Into<String>) -> Self {
        Self {
            meeting_uuid: ctx.meeting_uuid.clone(),
            stream_id: ctx.stream_id.clone(),
            signaling_url: signaling_url.into(),
            started_at: Utc::now(),
            signaling_state: Mutex::new(SignalingState::Connecting),
            media_state: Mutex::new(None),
            media_url: Mutex::new(None),
            audio_frames: AtomicU64::new(0),
            video_frames: AtomicU64::new(0),
            transcript_frames: AtomicU64::new(0),
            keep_alives: AtomicU64::new(0),
        }
    }

    pub async fn set_signaling_state(&self, state: SignalingState) {
        *self.signaling_state.lock().await = state;
    }

    pub async fn set_media_state(&self, state: MediaState) {
        *self.media_state.lock().await = Some(state);
    }

    pub async fn set_media_url(&self, url: impl Into<String>) {
        *self.media_url.lock().await = Some(url.into());
    }

    pub fn record_frame(&self, kind: FrameKind) {
        let counter = match kind {
            FrameKind::Audio => &self.audio_frames,
            FrameKind::Video => &self.video_frames,
            FrameKind::Transcript => &self.transcript_frames,
        };
        counter.fetch_add(1, Ordering::SeqCst);
    }

    /// Count a keep-alive answered on either Signaling or Media
    pub fn record_keep_alive(&self) {
        self.keep_alives.fetch_add(1, Ordering::SeqCst);
    }

    pub async fn snapshot(&self) -> ChainSnapshot {
        let duration = Utc::now().signed_duration_since(self.started_at);

        ChainSnapshot {
            meeting_uuid: self.meeting_uuid.clone(),
            stream_id: self.stream_id.clone(),
            signaling_url: self.signaling_url.clone(),
            media_url: self.media_url.lock().await.clone(),
            signaling_state: *self.signaling_state.lock().await,
            media_state: *self.media_state.lock().await,
            started_at: self.started_at,
            duration_secs: duration.num_milliseconds() as f64 / 1000.0,
            audio_frames: self.audio_frames.load(Ordering::SeqCst),
            video_frames: self.video_frames.load(Ordering::SeqCst),
            transcript_frames: self.transcript_frames.load(Ordering::SeqCst),
            keep_alives: self.keep_alives.load(Ordering::SeqCst),
        }
    }
}

/// Point-in-time view of a chain, served by the status API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainSnapshot {
    pub meeting_uuid: String,
    pub stream_id: String,
    pub signaling_url: String,

    /// Set once Signaling hands out a media endpoint
    pub media_url: Option<String>,

    pub signaling_state: SignalingState,

    /// `None` until a Media session has been spawned
    pub media_state: Option<MediaState>,

    pub started_at: DateTime<Utc>,
    pub duration_secs: f64,
    pub audio_frames: u64,
    pub video_frames: u64,
    pub transcript_frames: u64,
    pub keep_alives: u64,
}
