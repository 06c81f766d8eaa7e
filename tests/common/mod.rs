// Shared test fixtures: an in-memory transport and a recording frame consumer
//
// Every `connect` on the mock transport yields a `MockPeer` to the test, which
// plays the server side of that connection.

#![allow(dead_code)]

use rtms_client::protocol::FrameKind;
use rtms_client::transport::Outbound;
use rtms_client::{
    ClientCredentials, Connection, ConnectionHandle, FrameConsumer, SessionContext,
    SessionOptions, SessionOrchestrator, Stage, StageEvent, Transport, TransportError,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::time::timeout;

pub const CLIENT_ID: &str = "test-client";
pub const CLIENT_SECRET: &str = "test-secret";
pub const MEETING_UUID: &str = "4cKqRrrySX2lu4S7+fWx0g==";
pub const STREAM_ID: &str = "609340fc178c4e9a8a8ab1d5d3fa2e91";
pub const SIGNALING_URL: &str = "wss://signaling.test/rtms";
pub const MEDIA_URL: &str = "wss://media.test/rtms";
pub const EVENT_URL: &str = "wss://events.test/ws?subscriptionId=abc&access_token=t";

/// URLs containing this marker fail to connect
pub const UNREACHABLE: &str = "unreachable";

const WAIT: Duration = Duration::from_secs(2);
const QUIET: Duration = Duration::from_millis(100);

/// Server side of one mock connection
pub struct MockPeer {
    pub stage: Stage,
    pub url: String,
    pub sent: mpsc::UnboundedReceiver<Outbound>,
    pub inbound: mpsc::UnboundedSender<String>,
}

impl MockPeer {
    /// Next text frame the client sent, parsed as JSON
    pub async fn next_json(&mut self) -> Value {
        let frame = timeout(WAIT, self.sent.recv())
            .await
            .unwrap_or_else(|_| panic!("[{}] timed out waiting for a frame", self.stage))
            .unwrap_or_else(|| panic!("[{}] connection dropped", self.stage));

        match frame {
            Outbound::Text(text) => serde_json::from_str(&text).unwrap(),
            Outbound::Close => panic!("[{}] client closed the connection", self.stage),
        }
    }

    /// Assert the client sends nothing for a short while
    pub async fn assert_silent(&mut self) {
        if let Ok(Some(frame)) = timeout(QUIET, self.sent.recv()).await {
            panic!("[{}] unexpected frame: {:?}", self.stage, frame);
        }
    }

    /// Wait until the client closes or drops the connection
    pub async fn wait_closed(&mut self) {
        loop {
            match timeout(WAIT, self.sent.recv()).await {
                Ok(Some(Outbound::Close)) | Ok(None) => return,
                Ok(Some(Outbound::Text(_))) => continue,
                Err(_) => panic!("[{}] connection was not closed", self.stage),
            }
        }
    }

    pub fn push(&self, message: Value) {
        self.push_raw(message.to_string());
    }

    pub fn push_raw(&self, text: impl Into<String>) {
        self.inbound.send(text.into()).unwrap();
    }
}

pub struct MockTransport {
    peers: mpsc::UnboundedSender<MockPeer>,
}

impl MockTransport {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<MockPeer>) {
        let (peers, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { peers }), rx)
    }
}

#[async_trait::async_trait]
impl Transport for MockTransport {
    async fn connect(&self, stage: Stage, url: &str) -> Result<Connection, TransportError> {
        if url.contains(UNREACHABLE) {
            return Err(TransportError::Connect {
                stage,
                url: url.to_string(),
                reason: "connection refused".to_string(),
            });
        }

        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (in_tx, in_rx) = mpsc::unbounded_channel();

        let _ = self.peers.send(MockPeer {
            stage,
            url: url.to_string(),
            sent: out_rx,
            inbound: in_tx,
        });

        Ok(Connection::new(ConnectionHandle::new(stage, out_tx), in_rx))
    }
}

/// Next connection the client opened
pub async fn next_peer(peers: &mut mpsc::UnboundedReceiver<MockPeer>) -> MockPeer {
    timeout(WAIT, peers.recv())
        .await
        .expect("timed out waiting for a connection")
        .expect("transport dropped")
}

/// Assert no connection is opened for a short while
pub async fn assert_no_peer(peers: &mut mpsc::UnboundedReceiver<MockPeer>) {
    if let Ok(Some(peer)) = timeout(QUIET, peers.recv()).await {
        panic!("unexpected {} connection to {}", peer.stage, peer.url);
    }
}

/// Wait for a stage to exit, skipping unrelated lifecycle events
pub async fn wait_exited(events: &mut broadcast::Receiver<StageEvent>, stage: Stage) -> Option<String> {
    let wait = async {
        loop {
            if let StageEvent::Exited { stage: s, error, .. } = events.recv().await.unwrap() {
                if s == stage {
                    return error;
                }
            }
        }
    };
    timeout(WAIT, wait).await.expect("stage did not exit")
}

#[derive(Default)]
pub struct RecordingConsumer {
    pub frames: Mutex<Vec<(FrameKind, String, Vec<u8>)>>,
}

impl RecordingConsumer {
    pub fn kinds(&self) -> Vec<FrameKind> {
        self.frames.lock().unwrap().iter().map(|(kind, _, _)| *kind).collect()
    }

    fn record(&self, kind: FrameKind, ctx: &SessionContext, frame: &[u8]) {
        self.frames
            .lock()
            .unwrap()
            .push((kind, ctx.stream_id.clone(), frame.to_vec()));
    }
}

#[async_trait::async_trait]
impl FrameConsumer for RecordingConsumer {
    async fn on_audio_frame(&self, ctx: &SessionContext, frame: &[u8]) {
        self.record(FrameKind::Audio, ctx, frame);
    }

    async fn on_video_frame(&self, ctx: &SessionContext, frame: &[u8]) {
        self.record(FrameKind::Video, ctx, frame);
    }

    async fn on_transcript_frame(&self, ctx: &SessionContext, frame: &[u8]) {
        self.record(FrameKind::Transcript, ctx, frame);
    }
}

pub struct Harness {
    pub orchestrator: SessionOrchestrator,
    pub peers: mpsc::UnboundedReceiver<MockPeer>,
    pub consumer: Arc<RecordingConsumer>,
    pub events: broadcast::Receiver<StageEvent>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_options(SessionOptions::default())
    }

    pub fn with_options(options: SessionOptions) -> Self {
        let (transport, peers) = MockTransport::new();
        let consumer = Arc::new(RecordingConsumer::default());
        let orchestrator = SessionOrchestrator::new(
            transport,
            consumer.clone(),
            ClientCredentials::new(CLIENT_ID, CLIENT_SECRET),
            options,
        );
        let events = orchestrator.subscribe();

        Self {
            orchestrator,
            peers,
            consumer,
            events,
        }
    }

    /// Start the Event session and consume its initial heartbeat
    pub async fn open_event(&mut self) -> MockPeer {
        self.orchestrator.spawn_event(EVENT_URL);
        let mut event = next_peer(&mut self.peers).await;
        assert_eq!(event.stage, Stage::Event);
        assert_eq!(event.next_json().await, json!({"module": "heartbeat"}));
        event
    }

    /// Drive a chain up to an open Signaling connection with its handshake consumed
    pub async fn open_signaling(&mut self, event: &MockPeer) -> MockPeer {
        event.push(rtms_started(MEETING_UUID, STREAM_ID, SIGNALING_URL));
        let mut signaling = next_peer(&mut self.peers).await;
        assert_eq!(signaling.stage, Stage::Signaling);
        let handshake = signaling.next_json().await;
        assert_eq!(handshake["msg_type"], 1);
        signaling
    }

    /// Drive a chain up to an open Media connection with its handshake consumed
    pub async fn open_media(&mut self, signaling: &MockPeer) -> MockPeer {
        signaling.push(signaling_ready(MEDIA_URL));
        let mut media = next_peer(&mut self.peers).await;
        assert_eq!(media.stage, Stage::Media);
        let handshake = media.next_json().await;
        assert_eq!(handshake["msg_type"], 3);
        media
    }
}

/// Event frame wrapping a notification in its string `content` field
pub fn event_frame(event: &str, payload: Value) -> Value {
    let content = json!({"event": event, "payload": payload}).to_string();
    json!({"module": "message", "content": content})
}

pub fn rtms_started(meeting_uuid: &str, stream_id: &str, server_urls: &str) -> Value {
    event_frame(
        "meeting.rtms_started",
        json!({
            "meeting_uuid": meeting_uuid,
            "rtms_stream_id": stream_id,
            "server_urls": server_urls,
        }),
    )
}

pub fn rtms_stopped(meeting_uuid: &str) -> Value {
    event_frame("meeting.rtms_stopped", json!({"meeting_uuid": meeting_uuid}))
}

pub fn signaling_ready(media_url: &str) -> Value {
    json!({
        "msg_type": 2,
        "status_code": 0,
        "media_server": {"server_urls": {"all": media_url}},
    })
}
