//! Server configuration
//!
//! Settings come from environment variables and can be overridden by
//! command-line flags in `main`.
//!
//! - `CALC_MCP_TOKEN`: optional auth token required on every request
//! - `CALC_MCP_FEED_URL`: RSS/Atom feed searched by the feed tools
//! - `CALC_MCP_FEED_TIMEOUT_SECS`: feed request timeout (default: 15)
//! - `CALC_MCP_HISTORY_CAPACITY`: calculation history size (default: 10)

use crate::error::ConfigError;
use crate::feed::{DEFAULT_FEED_TIMEOUT, DEFAULT_FEED_URL};
use crate::state::DEFAULT_HISTORY_CAPACITY;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;
use tracing::warn;

/// Environment variable holding the optional auth token
pub const TOKEN_ENV_VAR: &str = "CALC_MCP_TOKEN";
/// Environment variable overriding the feed URL
pub const FEED_URL_ENV_VAR: &str = "CALC_MCP_FEED_URL";
/// Environment variable overriding the feed timeout, in seconds
pub const FEED_TIMEOUT_ENV_VAR: &str = "CALC_MCP_FEED_TIMEOUT_SECS";
/// Environment variable overriding the history capacity
pub const HISTORY_CAPACITY_ENV_VAR: &str = "CALC_MCP_HISTORY_CAPACITY";

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 8000;

/// How the server talks to its client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Transport {
    /// Newline-delimited JSON-RPC over stdin/stdout
    #[default]
    Stdio,
    /// JSON-RPC over HTTP POST
    Http,
}

/// Resolved server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Transport to serve on
    pub transport: Transport,
    /// Bind address for the HTTP transport
    pub host: IpAddr,
    /// Port for the HTTP transport
    pub port: u16,
    /// Feed searched by the feed tools
    pub feed_url: String,
    /// Feed request timeout
    pub feed_timeout: Duration,
    /// Number of calculations kept in history
    pub history_capacity: usize,
    /// Token required in every request's params, if set
    pub auth_token: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: Transport::default(),
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            feed_url: DEFAULT_FEED_URL.to_string(),
            feed_timeout: DEFAULT_FEED_TIMEOUT,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            auth_token: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        config.auth_token = lookup(TOKEN_ENV_VAR).filter(|t| !t.is_empty());

        if let Some(url) = lookup(FEED_URL_ENV_VAR).filter(|u| !u.is_empty()) {
            config.feed_url = url;
        }

        if let Some(raw) = lookup(FEED_TIMEOUT_ENV_VAR) {
            let secs = parse_number::<u64>(FEED_TIMEOUT_ENV_VAR, &raw)?;
            config.feed_timeout = Duration::from_secs(secs);
        }

        if let Some(raw) = lookup(HISTORY_CAPACITY_ENV_VAR) {
            config.history_capacity = parse_number::<usize>(HISTORY_CAPACITY_ENV_VAR, &raw)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        let parsed = url::Url::parse(&self.feed_url)
            .map_err(|_| ConfigError::InvalidFeedUrl(self.feed_url.clone()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidFeedUrl(self.feed_url.clone()));
        }

        if self.history_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                key: "history capacity".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        if self.feed_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "feed timeout".to_string(),
                message: "must be at least 1 second".to_string(),
            });
        }

        if self.transport == Transport::Http && !self.host.is_loopback() {
            warn!(host = %self.host, "HTTP transport bound to a non-loopback address");
        }

        Ok(())
    }

    /// Socket address for the HTTP transport
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_number<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        message: e.to_string(),
    })
}
