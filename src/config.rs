use crate::auth::DEFAULT_OAUTH_URL;
use crate::session::{ClientCredentials, SessionOptions};
use anyhow::{bail, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub zoom: ZoomConfig,
    #[serde(default)]
    pub session: SessionOptions,
    #[serde(default)]
    pub nats: Option<NatsConfig>,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    /// Status API; disabled when absent
    #[serde(default)]
    pub http: Option<HttpConfig>,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct ZoomConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default)]
    pub event_ws_url: String,
    #[serde(default = "default_oauth_url")]
    pub oauth_url: String,
}

fn default_oauth_url() -> String {
    DEFAULT_OAUTH_URL.to_string()
}

#[derive(Debug, Deserialize)]
pub struct NatsConfig {
    pub url: String,
    #[serde(default = "default_subject_prefix")]
    pub subject_prefix: String,
}

fn default_subject_prefix() -> String {
    "rtms".to_string()
}

impl Config {
    /// Load from a config file, overridden by `RTMS__SECTION__KEY` environment variables
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("RTMS").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Validated app credentials; any missing key is an error
    pub fn credentials(&self) -> Result<Credentials> {
        let zoom = &self.zoom;
        for (key, value) in [
            ("client_id", &zoom.client_id),
            ("client_secret", &zoom.client_secret),
            ("event_ws_url", &zoom.event_ws_url),
        ] {
            if value.trim().is_empty() {
                bail!("Missing required config key 'zoom.{}'", key);
            }
        }

        Ok(Credentials {
            client_id: zoom.client_id.clone(),
            client_secret: zoom.client_secret.clone(),
            event_ws_url: zoom.event_ws_url.clone(),
        })
    }
}

/// Credentials needed to open the Event session
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub event_ws_url: String,
}

impl Credentials {
    pub fn client(&self) -> ClientCredentials {
        ClientCredentials::new(self.client_id.clone(), self.client_secret.clone())
    }

    /// Event session URL with the bearer token appended as `access_token`
    pub fn event_url(&self, access_token: &str) -> String {
        let separator = if self.event_ws_url.contains('?') { '&' } else { '?' };
        format!("{}{}access_token={}", self.event_ws_url, separator, access_token)
    }
}

/// Where app credentials come from
pub trait CredentialSource {
    fn load(&self) -> Result<Credentials>;
}

/// Reads credentials from a config file (plus environment overrides)
pub struct ConfigCredentialSource {
    path: String,
}

impl ConfigCredentialSource {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl CredentialSource for ConfigCredentialSource {
    fn load(&self) -> Result<Credentials> {
        Config::load(&self.path)?.credentials()
    }
}
