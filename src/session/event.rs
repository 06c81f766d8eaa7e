use super::orchestrator::SessionOrchestrator;
use crate::error::SessionError;
use crate::protocol::{parse_event_frame, EventNotification, Heartbeat};
use crate::transport::{Connection, ConnectionHandle, Stage};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventState {
    Connecting,
    Open,
    Listening,
    Closed,
}

/// First stage: listens for start/stop notifications and launches chains
pub struct EventSession {
    url: String,
    orchestrator: SessionOrchestrator,
    cancel: CancellationToken,
    state: EventState,
}

impl EventSession {
    pub fn new(url: String, orchestrator: SessionOrchestrator, cancel: CancellationToken) -> Self {
        Self {
            url,
            orchestrator,
            cancel,
            state: EventState::Connecting,
        }
    }

    pub async fn run(mut self) -> Result<(), SessionError> {
        let Connection {
            handle,
            mut inbound,
        } = self
            .orchestrator
            .transport()
            .connect(Stage::Event, &self.url)
            .await?;
        self.transition(EventState::Open);

        let heartbeat = start_heartbeat(
            handle.clone(),
            self.orchestrator.options().heartbeat_interval(),
        );

        self.transition(EventState::Listening);
        let cancel = self.cancel.clone();
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                frame = inbound.recv() => match frame {
                    Some(text) => self.handle_frame(&text).await,
                    None => {
                        warn!("[event] Connection closed");
                        break;
                    }
                },
            }
        }

        if let Some(heartbeat) = heartbeat {
            heartbeat.abort();
        }
        handle.close();
        self.transition(EventState::Closed);
        Ok(())
    }

    async fn handle_frame(&mut self, raw: &str) {
        debug!("[event] Raw message: {}", raw);

        let notification = match parse_event_frame(raw.as_bytes()) {
            Ok(Some(notification)) => notification,
            Ok(None) => {
                debug!("[event] Ignoring message without JSON content");
                return;
            }
            Err(e) => {
                warn!("[event] Dropping undecodable message: {}", e);
                return;
            }
        };

        match notification {
            EventNotification::RtmsStarted(started) => {
                info!(
                    "[event] RTMS started for meeting {}: signaling at {}",
                    started.meeting_uuid, started.server_urls
                );
                if let Err(e) = self.orchestrator.start_chain(started).await {
                    error!("{}", e);
                }
            }
            EventNotification::RtmsStopped { meeting_uuid } => {
                info!("[event] RTMS stopped for meeting {}", meeting_uuid);
                self.orchestrator.stop_chain(&meeting_uuid).await;
            }
            EventNotification::Other { event } => {
                info!("[event] Other event received: {}", event);
            }
        }
    }

    fn transition(&mut self, state: EventState) {
        debug!("[event] {:?} -> {:?}", self.state, state);
        self.state = state;
    }
}

/// Send the first heartbeat now and keep sending one every `period`
///
/// If the first send fails no timer is started. A later failure stops the
/// timer but leaves the session running.
fn start_heartbeat(handle: ConnectionHandle, period: Duration) -> Option<JoinHandle<()>> {
    if let Err(e) = handle.send(&Heartbeat::default()) {
        error!("[event] Failed to send initial heartbeat: {}", e);
        return None;
    }
    debug!("[event] Sent initial heartbeat");

    Some(tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        loop {
            ticker.tick().await;
            if let Err(e) = handle.send(&Heartbeat::default()) {
                error!("[event] Heartbeat error: {}", e);
                break;
            }
            debug!("[event] Heartbeat sent");
        }
    }))
}
