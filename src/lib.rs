pub mod auth;
pub mod config;
pub mod consumer;
pub mod error;
pub mod http;
pub mod nats;
pub mod protocol;
pub mod session;
pub mod transport;

pub use auth::{sign, OAuthTokenProvider, TokenProvider};
pub use config::{Config, ConfigCredentialSource, CredentialSource, Credentials};
pub use consumer::{FrameConsumer, LoggingFrameConsumer};
pub use error::{CodecError, SessionError, TransportError};
pub use http::{create_router, AppState};
pub use nats::{MediaFrameMessage, NatsClient};
pub use session::{
    ChainSnapshot, ClientCredentials, SessionContext, SessionOptions, SessionOrchestrator,
    StageEvent,
};
pub use transport::{Connection, ConnectionHandle, Stage, Transport, WebSocketTransport};
