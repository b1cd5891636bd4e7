//! Connection settings passed explicitly into the transport.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::error::{GerritError, Result};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Username and HTTP password for Basic authentication.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Where the server lives and how to authenticate against it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GerritConfig {
    pub base_url: String,
    #[serde(default)]
    pub credentials: Option<Credentials>,
    /// Whole seconds on the wire (`timeout_secs`).
    #[serde(
        rename = "timeout_secs",
        default = "default_timeout",
        deserialize_with = "deserialize_timeout_secs"
    )]
    timeout: Duration,
}

fn default_timeout() -> Duration {
    Duration::from_secs(DEFAULT_TIMEOUT_SECS)
}

fn deserialize_timeout_secs<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Duration, D::Error> {
    let secs = u64::deserialize(deserializer)?;
    checked_timeout(Duration::from_secs(secs)).map_err(serde::de::Error::custom)
}

/// A zero timeout would make every request fail before it is sent.
fn checked_timeout(timeout: Duration) -> Result<Duration> {
    if timeout.is_zero() {
        return Err(GerritError::Config("timeout must be greater than zero".into()));
    }
    Ok(timeout)
}

impl GerritConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials: None,
            timeout: default_timeout(),
        }
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Set the per-request timeout. Sub-second values are kept as given.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.timeout = checked_timeout(timeout)?;
        Ok(self)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Load configuration from environment variables.
    ///
    /// `GERRIT_URL` is required. Credentials are used only when both
    /// `GERRIT_USERNAME` and `GERRIT_PASSWORD` are set.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("GERRIT_URL")
            .map_err(|_| GerritError::Config("GERRIT_URL environment variable not set".into()))?;
        let mut config = Self::new(&base_url);

        if let (Ok(username), Ok(password)) = (
            std::env::var("GERRIT_USERNAME"),
            std::env::var("GERRIT_PASSWORD"),
        ) {
            config.credentials = Some(Credentials::new(username, password));
        }

        if let Ok(raw) = std::env::var("GERRIT_TIMEOUT_SECS") {
            let secs: u64 = raw.parse().map_err(|_| {
                GerritError::Config(format!("GERRIT_TIMEOUT_SECS is not a number: {raw}"))
            })?;
            config.timeout = checked_timeout(Duration::from_secs(secs))?;
        }

        Ok(config)
    }

    /// Parse a JSON configuration document.
    pub fn from_json(raw: &str) -> Result<Self> {
        let mut config: GerritConfig =
            serde_json::from_str(raw).map_err(|e| GerritError::Config(e.to_string()))?;
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        Ok(config)
    }
}
