//! Authentication helpers
//!
//! - Handshake signatures for the Signaling and Media sessions
//! - OAuth client-credentials tokens for the Event session

pub mod signature;
pub mod token;

pub use signature::sign;
pub use token::{OAuthTokenProvider, TokenProvider, DEFAULT_OAUTH_URL};
