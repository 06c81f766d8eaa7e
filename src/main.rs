use anyhow::{bail, Context, Result};
use clap::Parser;
use rtms_client::{
    create_router, AppState, Config, FrameConsumer, LoggingFrameConsumer, NatsClient,
    OAuthTokenProvider, SessionOrchestrator, TokenProvider, WebSocketTransport,
};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(version, about = "Joins Zoom RTMS media streams")]
struct Args {
    /// Config file path (extension optional)
    #[arg(short, long, default_value = "config/rtms-client")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;
    let credentials = cfg.credentials()?;

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));
    info!("Event WebSocket: {}", credentials.event_ws_url);

    let token_provider = OAuthTokenProvider::new(cfg.zoom.oauth_url.clone())?;
    let access_token = token_provider
        .fetch_access_token(&credentials.client_id, &credentials.client_secret)
        .await
        .context("Failed to obtain access token")?;
    if access_token.is_empty() {
        bail!("Access token is empty");
    }

    let consumer: Arc<dyn FrameConsumer> = match &cfg.nats {
        Some(nats) => Arc::new(NatsClient::connect(&nats.url, nats.subject_prefix.clone()).await?),
        None => Arc::new(LoggingFrameConsumer),
    };

    let orchestrator = SessionOrchestrator::new(
        Arc::new(WebSocketTransport::new()),
        consumer,
        credentials.client(),
        cfg.session.clone(),
    );

    if let Some(http) = &cfg.service.http {
        let addr = format!("{}:{}", http.bind, http.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind status API on {}", addr))?;
        let router = create_router(AppState::new(orchestrator.clone()));

        info!("Status API listening on {}", addr);
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                error!("Status API stopped: {}", e);
            }
        });
    }

    let mut event = orchestrator.spawn_event(credentials.event_url(&access_token));

    tokio::select! {
        _ = &mut event => info!("Event session ended"),
        _ = tokio::signal::ctrl_c() => info!("Interrupted"),
    }

    orchestrator.shutdown().await;
    event.abort();

    Ok(())
}
