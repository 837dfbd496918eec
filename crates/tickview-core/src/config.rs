//! Runtime configuration.
//!
//! # Environment Variables
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `TICKVIEW_BIND` | `127.0.0.1:8501` | Web server bind address |
//! | `TICKVIEW_TIMEOUT_MS` | `10000` | Per-request upstream timeout |
//! | `TICKVIEW_LIVE_QUOTE` | `true` | Fetch the live quote after a non-empty history |
//! | `TICKVIEW_LOG` | `info` | Default log filter (`RUST_LOG` wins) |
//! | `TICKVIEW_USER_AGENT` | `tickview/<version>` | Outbound user agent |
//!
//! A `.env` file in the working directory or one of its ancestors is loaded
//! first; variables already set in the process are not overridden.

use std::net::SocketAddr;

use tracing::info;

use crate::error::ConfigError;
use crate::http_client::DEFAULT_TIMEOUT_MS;

pub const ENV_BIND: &str = "TICKVIEW_BIND";
pub const ENV_TIMEOUT_MS: &str = "TICKVIEW_TIMEOUT_MS";
pub const ENV_LIVE_QUOTE: &str = "TICKVIEW_LIVE_QUOTE";
pub const ENV_LOG: &str = "TICKVIEW_LOG";
pub const ENV_USER_AGENT: &str = "TICKVIEW_USER_AGENT";

pub const DEFAULT_BIND: &str = "127.0.0.1:8501";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_USER_AGENT: &str = concat!("tickview/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind: SocketAddr,
    pub timeout_ms: u64,
    pub live_quote: bool,
    pub log_level: String,
    pub user_agent: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8501)),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            live_quote: true,
            log_level: String::from(DEFAULT_LOG_LEVEL),
            user_agent: String::from(DEFAULT_USER_AGENT),
        }
    }
}

impl AppConfig {
    /// Read the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`; unset or blank keys keep defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a value is present but malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };
        let mut config = Self::default();

        if let Some(value) = get(ENV_BIND) {
            config.bind = value.parse().map_err(|_| ConfigError::InvalidBind {
                key: ENV_BIND,
                value,
            })?;
        }
        if let Some(value) = get(ENV_TIMEOUT_MS) {
            config.timeout_ms = parse_positive(ENV_TIMEOUT_MS, value)?;
        }
        if let Some(value) = get(ENV_LIVE_QUOTE) {
            config.live_quote = parse_bool(ENV_LIVE_QUOTE, value)?;
        }
        if let Some(value) = get(ENV_LOG) {
            config.log_level = value;
        }
        if let Some(value) = get(ENV_USER_AGENT) {
            config.user_agent = value;
        }

        Ok(config)
    }

    /// Log the effective configuration.
    pub fn log(&self) {
        info!(
            bind = %self.bind,
            timeout_ms = self.timeout_ms,
            live_quote = self.live_quote,
            log_level = %self.log_level,
            "configuration loaded"
        );
    }
}

/// Load `.env` from the working directory, or the nearest ancestor that has one.
pub fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }
    let Ok(cwd) = std::env::current_dir() else {
        return;
    };
    for dir in cwd.ancestors().skip(1) {
        let env_path = dir.join(".env");
        if env_path.exists() {
            let _ = dotenvy::from_path(&env_path);
            return;
        }
    }
}

fn parse_positive(key: &'static str, value: String) -> Result<u64, ConfigError> {
    match value.parse::<u64>() {
        Ok(parsed) if parsed > 0 => Ok(parsed),
        _ => Err(ConfigError::InvalidInteger { key, value }),
    }
}

fn parse_bool(key: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool { key, value }),
    }
}
