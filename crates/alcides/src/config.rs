use std::fmt;

use crate::{Error, Result};

pub const DEFAULT_SERVER_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_RUNDECK_API_VERSION: &str = "24";
/// Alertmanager batches can be large; axum's own default is 2 MiB.
pub const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub rundeck: RundeckConfig,
    pub relay: RelayConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: String,
    pub max_body_bytes: usize,
}

#[derive(Clone)]
pub struct RundeckConfig {
    pub url: String,
    pub token: String,
    pub api_version: String,
}

impl fmt::Debug for RundeckConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RundeckConfig")
            .field("url", &self.url)
            .field("token", &"<redacted>")
            .field("api_version", &self.api_version)
            .finish()
    }
}

#[derive(Clone)]
pub struct RelayConfig {
    /// Secret that Alertmanager presents as the Basic auth password.
    pub secret: String,
}

impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str, what: &str| -> Result<String> {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| Error::Config(format!("{key} is not set. {what}")))
        };

        let rundeck_token = required("RUNDECK_TOKEN", "Rundeck token required, cannot continue")?;
        let secret = required("ALCIDES_TOKEN", "Alcides token not specified, refusing to continue")?;
        let rundeck_url = required("RUNDECK_URL", "Rundeck URL required, cannot continue")?;

        let max_body_bytes = match lookup("ALCIDES_MAX_BODY_BYTES").filter(|v| !v.trim().is_empty()) {
            Some(raw) => raw.trim().parse::<usize>().map_err(|_| {
                Error::Config(format!("ALCIDES_MAX_BODY_BYTES must be a byte count, got {raw:?}"))
            })?,
            None => DEFAULT_MAX_BODY_BYTES,
        };

        let config = Config {
            server: ServerConfig {
                addr: lookup("SERVER_ADDR")
                    .filter(|v| !v.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_SERVER_ADDR.to_string()),
                max_body_bytes,
            },
            rundeck: RundeckConfig {
                url: rundeck_url,
                token: rundeck_token,
                api_version: lookup("RUNDECK_API_VERSION")
                    .filter(|v| !v.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_RUNDECK_API_VERSION.to_string()),
            },
            relay: RelayConfig { secret },
        };

        if !config.rundeck.api_version.chars().all(|c| c.is_ascii_digit()) {
            return Err(Error::Config(format!(
                "RUNDECK_API_VERSION must be numeric, got {:?}",
                config.rundeck.api_version
            )));
        }

        Ok(config)
    }
}
