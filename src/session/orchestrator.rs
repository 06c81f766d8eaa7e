use super::config::SessionOptions;
use super::context::{ClientCredentials, SessionContext};
use super::event::EventSession;
use super::media::MediaSession;
use super::signaling::SignalingSession;
use super::stats::{ChainSnapshot, ChainStats};
use crate::consumer::FrameConsumer;
use crate::error::SessionError;
use crate::protocol::RtmsStarted;
use crate::transport::{ConnectionHandle, Stage, Transport};
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

const STAGE_EVENT_CAPACITY: usize = 64;

/// Lifecycle notifications for spawned sessions
///
/// Purely observational: nothing in the chain waits on these.
#[derive(Debug, Clone, PartialEq)]
pub enum StageEvent {
    Spawned {
        stage: Stage,
        meeting_uuid: Option<String>,
        url: String,
    },
    Exited {
        stage: Stage,
        meeting_uuid: Option<String>,
        error: Option<String>,
    },
}

/// One Signaling/Media chain started from a `meeting.rtms_started` notification
pub struct Chain {
    pub ctx: Arc<SessionContext>,
    pub stats: Arc<ChainStats>,
    pub cancel: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    /// Sessions of this chain still running
    live: AtomicUsize,
}

impl Chain {
    async fn track(&self, task: JoinHandle<()>) {
        self.tasks.lock().await.push(task);
    }

    async fn join(&self) {
        let tasks: Vec<_> = self.tasks.lock().await.drain(..).collect();
        for task in tasks {
            if let Err(e) = task.await {
                error!("Session task panicked: {}", e);
            }
        }
    }
}

struct Inner {
    transport: Arc<dyn Transport>,
    consumer: Arc<dyn FrameConsumer>,
    credentials: ClientCredentials,
    options: SessionOptions,
    chains: Mutex<HashMap<String, Arc<Chain>>>,
    events: broadcast::Sender<StageEvent>,
    shutdown: CancellationToken,
}

/// Starts each stage of the chain as a detached task and keeps their handles
///
/// Parents never wait on children: a session's exit is logged and published as
/// a `StageEvent`, but it never reaches the session that spawned it.
#[derive(Clone)]
pub struct SessionOrchestrator {
    inner: Arc<Inner>,
}

impl SessionOrchestrator {
    pub fn new(
        transport: Arc<dyn Transport>,
        consumer: Arc<dyn FrameConsumer>,
        credentials: ClientCredentials,
        options: SessionOptions,
    ) -> Self {
        let (events, _) = broadcast::channel(STAGE_EVENT_CAPACITY);

        Self {
            inner: Arc::new(Inner {
                transport,
                consumer,
                credentials,
                options,
                chains: Mutex::new(HashMap::new()),
                events,
                shutdown: CancellationToken::new(),
            }),
        }
    }

    pub fn transport(&self) -> &dyn Transport {
        self.inner.transport.as_ref()
    }

    pub fn consumer(&self) -> &dyn FrameConsumer {
        self.inner.consumer.as_ref()
    }

    pub fn options(&self) -> &SessionOptions {
        &self.inner.options
    }

    /// Observe session spawns and exits
    pub fn subscribe(&self) -> broadcast::Receiver<StageEvent> {
        self.inner.events.subscribe()
    }

    /// Start the Event session; the returned task ends when its connection does
    pub fn spawn_event(&self, url: impl Into<String>) -> JoinHandle<()> {
        let url = url.into();
        let session = EventSession::new(
            url.clone(),
            self.clone(),
            self.inner.shutdown.child_token(),
        );

        self.spawn_stage(Stage::Event, None, url, session.run())
    }

    /// Build a chain for a start notification and spawn its Signaling session
    ///
    /// An empty signaling URL is a configuration error and spawns nothing. A
    /// chain already registered for the same meeting is cancelled and replaced.
    /// The chain stays registered until its last session exits.
    pub async fn start_chain(&self, started: RtmsStarted) -> Result<Arc<Chain>, SessionError> {
        if started.server_urls.is_empty() {
            return Err(SessionError::Configuration {
                stage: Stage::Event,
                reason: format!(
                    "missing 'server_urls' for meeting {}",
                    started.meeting_uuid
                ),
            });
        }

        let ctx = Arc::new(SessionContext::new(
            &self.inner.credentials,
            started.meeting_uuid,
            started.rtms_stream_id,
        ));

        let chain = Arc::new(Chain {
            stats: Arc::new(ChainStats::new(&ctx, started.server_urls.clone())),
            ctx: Arc::clone(&ctx),
            cancel: self.inner.shutdown.child_token(),
            tasks: Mutex::new(Vec::new()),
            live: AtomicUsize::new(0),
        });

        let previous = {
            let mut chains = self.inner.chains.lock().await;
            chains.insert(ctx.meeting_uuid.clone(), Arc::clone(&chain))
        };
        if let Some(previous) = previous {
            warn!(
                "Replacing active chain for meeting {} (stream {})",
                ctx.meeting_uuid, previous.ctx.stream_id
            );
            previous.cancel.cancel();
        }

        info!(
            "Starting chain for meeting {} (stream {})",
            ctx.meeting_uuid, ctx.stream_id
        );

        let session = SignalingSession::new(
            started.server_urls.clone(),
            Arc::clone(&chain),
            self.clone(),
        );
        let task = self.spawn_stage(
            Stage::Signaling,
            Some(Arc::clone(&chain)),
            started.server_urls,
            session.run(),
        );
        chain.track(task).await;

        Ok(chain)
    }

    /// Spawn the Media session for a chain whose Signaling handshake succeeded
    pub async fn spawn_media(
        &self,
        chain: &Arc<Chain>,
        media_url: impl Into<String>,
        signaling: ConnectionHandle,
    ) {
        let media_url = media_url.into();
        chain.stats.set_media_url(media_url.clone()).await;

        let session = MediaSession::new(media_url.clone(), Arc::clone(chain), signaling, self.clone());
        let task = self.spawn_stage(
            Stage::Media,
            Some(Arc::clone(chain)),
            media_url,
            session.run(),
        );
        chain.track(task).await;
    }

    /// Cancel and forget the chain for a meeting; returns false if none was active
    pub async fn stop_chain(&self, meeting_uuid: &str) -> bool {
        let chain = self.inner.chains.lock().await.remove(meeting_uuid);

        match chain {
            Some(chain) => {
                info!("Stopping chain for meeting {}", meeting_uuid);
                chain.cancel.cancel();
                true
            }
            None => {
                warn!("No active chain for meeting {}", meeting_uuid);
                false
            }
        }
    }

    /// Forget a chain whose sessions have all ended, unless it was already replaced
    async fn deregister(&self, chain: &Arc<Chain>) {
        let mut chains = self.inner.chains.lock().await;
        let current = chains
            .get(&chain.ctx.meeting_uuid)
            .is_some_and(|registered| Arc::ptr_eq(registered, chain));

        if current {
            chains.remove(&chain.ctx.meeting_uuid);
            info!("Chain for meeting {} closed", chain.ctx.meeting_uuid);
        }
    }

    pub async fn snapshot(&self, meeting_uuid: &str) -> Option<ChainSnapshot> {
        let chain = self.inner.chains.lock().await.get(meeting_uuid).cloned();
        match chain {
            Some(chain) => Some(chain.stats.snapshot().await),
            None => None,
        }
    }

    pub async fn snapshots(&self) -> Vec<ChainSnapshot> {
        let chains: Vec<_> = self.inner.chains.lock().await.values().cloned().collect();

        let mut snapshots = Vec::with_capacity(chains.len());
        for chain in chains {
            snapshots.push(chain.stats.snapshot().await);
        }
        snapshots
    }

    /// Cancel every session and wait for the chain tasks to finish
    pub async fn shutdown(&self) {
        info!("Shutting down all sessions");
        self.inner.shutdown.cancel();

        let chains: Vec<_> = self.inner.chains.lock().await.drain().map(|(_, c)| c).collect();
        for chain in chains {
            chain.join().await;
        }
    }

    fn spawn_stage<F>(
        &self,
        stage: Stage,
        chain: Option<Arc<Chain>>,
        url: String,
        session: F,
    ) -> JoinHandle<()>
    where
        F: Future<Output = Result<(), SessionError>> + Send + 'static,
    {
        let meeting_uuid = chain.as_ref().map(|chain| chain.ctx.meeting_uuid.clone());
        if let Some(chain) = &chain {
            chain.live.fetch_add(1, Ordering::SeqCst);
        }

        let _ = self.inner.events.send(StageEvent::Spawned {
            stage,
            meeting_uuid: meeting_uuid.clone(),
            url,
        });

        let orchestrator = self.clone();
        tokio::spawn(async move {
            let error = match session.await {
                Ok(()) => {
                    info!("[{}] Session closed", stage);
                    None
                }
                Err(e) => {
                    error!("[{}] Session terminated: {}", stage, e);
                    Some(e.to_string())
                }
            };

            if let Some(chain) = chain {
                if chain.live.fetch_sub(1, Ordering::SeqCst) == 1 {
                    orchestrator.deregister(&chain).await;
                }
            }

            let _ = orchestrator.inner.events.send(StageEvent::Exited {
                stage,
                meeting_uuid,
                error,
            });
        })
    }
}
