//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use sos_engine::TokenConfig;
use store::StoreConfig;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// Data store endpoint and key.
    pub store: StoreConfig,
    /// Token signing settings.
    pub tokens: TokenConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `SOS_API_ADDR` | Server bind address | `127.0.0.1:8080` |
    /// | `STORE_URL` | Data store base URL | (required) |
    /// | `STORE_API_KEY` | Data store API key | (required) |
    /// | `SECRET_KEY` | Token signing secret | (required) |
    /// | `STORE_TIMEOUT_SECS` | Per-request store timeout | `30` |
    /// | `TOKEN_TTL_HOURS` | Token lifetime in hours | `8` |
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr = env::var("SOS_API_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let store_url = required("STORE_URL")?;
        let store_api_key = required("STORE_API_KEY")?;
        let signing_secret = required("SECRET_KEY")?;

        let timeout_secs = positive("STORE_TIMEOUT_SECS", 30)?;
        let ttl_hours = positive("TOKEN_TTL_HOURS", 8)?;

        Ok(Self {
            addr,
            store: StoreConfig::new(store_url, store_api_key)
                .with_timeout(Duration::from_secs(timeout_secs)),
            tokens: TokenConfig::new(signing_secret, Duration::from_secs(ttl_hours * 3600)),
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn positive(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or(ConfigError::Invalid { name, value: raw }),
        Err(_) => Ok(default),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid SOS_API_ADDR format")]
    InvalidAddr,

    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("Invalid {name}: {value}")]
    Invalid { name: &'static str, value: String },
}
