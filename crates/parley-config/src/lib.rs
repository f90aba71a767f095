//! # Parley Configuration
//!
//! Settings for the relay: assistant credentials, listen address and polling
//! bounds.
//!
//! Values come from an optional TOML file and are then overridden by the
//! process environment:
//!
//! | Setting | Environment |
//! |---|---|
//! | `api_key` | `OPENAI_API_KEY` |
//! | `assistant_id` | `ASSISTANT_ID` |
//! | `base_url` | `PARLEY_BASE_URL` |
//! | `host` | `PARLEY_HOST` |
//! | `port` | `PARLEY_PORT`, then `PORT` |
//! | `poll_interval_ms` | `PARLEY_POLL_INTERVAL_MS` |
//! | `max_wait_secs` | `PARLEY_MAX_WAIT_SECS` |
//! | `request_timeout_secs` | `PARLEY_REQUEST_TIMEOUT_SECS` |
//! | `session_idle_secs` | `PARLEY_SESSION_IDLE_SECS` |
//! | `static_dir` | `PARLEY_STATIC_DIR` |
//!
//! ```rust,no_run
//! use parley_config::RelayConfig;
//!
//! let config = RelayConfig::load(None)?;
//! config.validate()?;
//! # Ok::<(), parley_config::ConfigError>(())
//! ```

#![warn(missing_docs)]

mod error;

pub use error::{ConfigError, ConfigResult};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

pub use parley_assistant::DEFAULT_BASE_URL;

/// Default listen host
pub const DEFAULT_HOST: &str = "127.0.0.1";
/// Default listen port
pub const DEFAULT_PORT: u16 = 3000;
/// Default delay between run status checks
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
/// Default upper bound on a run
pub const DEFAULT_MAX_WAIT_SECS: u64 = 120;
/// Default timeout for a single API request
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
/// Default time a session may sit unused before it is forgotten
pub const DEFAULT_SESSION_IDLE_SECS: u64 = 24 * 60 * 60;

/// Relay configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Assistant API credential
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Assistant that runs are started with
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assistant_id: Option<String>,
    /// API root
    pub base_url: String,
    /// Listen host
    pub host: String,
    /// Listen port
    pub port: u16,
    /// Delay between run status checks, in milliseconds
    pub poll_interval_ms: u64,
    /// Upper bound on waiting for a run, in seconds
    pub max_wait_secs: u64,
    /// Timeout for a single API request, in seconds
    pub request_timeout_secs: u64,
    /// Forget sessions unused for this many seconds
    pub session_idle_secs: u64,
    /// Serve client assets from this directory instead of the built-in ones
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_dir: Option<PathBuf>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            assistant_id: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_wait_secs: DEFAULT_MAX_WAIT_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            session_idle_secs: DEFAULT_SESSION_IDLE_SECS,
            static_dir: None,
        }
    }
}

impl RelayConfig {
    /// Load from an optional file, then apply the process environment
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Override settings from environment variables
    ///
    /// `lookup` resolves a variable name to its value; empty values are
    /// treated as unset.
    pub fn apply_env<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(value) = get("OPENAI_API_KEY") {
            self.api_key = Some(value);
        }
        if let Some(value) = get("ASSISTANT_ID") {
            self.assistant_id = Some(value);
        }
        if let Some(value) = get("PARLEY_BASE_URL") {
            self.base_url = value;
        }
        if let Some(value) = get("PARLEY_HOST") {
            self.host = value;
        }
        if let Some(value) = get("PARLEY_PORT") {
            self.port = parse_env("PARLEY_PORT", &value)?;
        } else if let Some(value) = get("PORT") {
            self.port = parse_env("PORT", &value)?;
        }
        if let Some(value) = get("PARLEY_POLL_INTERVAL_MS") {
            self.poll_interval_ms = parse_env("PARLEY_POLL_INTERVAL_MS", &value)?;
        }
        if let Some(value) = get("PARLEY_MAX_WAIT_SECS") {
            self.max_wait_secs = parse_env("PARLEY_MAX_WAIT_SECS", &value)?;
        }
        if let Some(value) = get("PARLEY_REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs = parse_env("PARLEY_REQUEST_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = get("PARLEY_SESSION_IDLE_SECS") {
            self.session_idle_secs = parse_env("PARLEY_SESSION_IDLE_SECS", &value)?;
        }
        if let Some(value) = get("PARLEY_STATIC_DIR") {
            self.static_dir = Some(PathBuf::from(value));
        }
        Ok(())
    }

    /// Check that the relay can start with these settings
    pub fn validate(&self) -> ConfigResult<()> {
        self.api_key()?;
        self.assistant_id()?;
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                setting: "poll_interval_ms".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.max_wait_secs == 0 {
            return Err(ConfigError::Invalid {
                setting: "max_wait_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                setting: "request_timeout_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.session_idle_secs == 0 {
            return Err(ConfigError::Invalid {
                setting: "session_idle_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// The API key, or an error naming the variable to set
    pub fn api_key(&self) -> ConfigResult<&str> {
        self.api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::Missing {
                setting: "api_key",
                env: "OPENAI_API_KEY",
            })
    }

    /// The assistant identifier, or an error naming the variable to set
    pub fn assistant_id(&self) -> ConfigResult<&str> {
        self.assistant_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or(ConfigError::Missing {
                setting: "assistant_id",
                env: "ASSISTANT_ID",
            })
    }

    /// Delay between run status checks
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Upper bound on waiting for a run
    pub fn max_wait(&self) -> Duration {
        Duration::from_secs(self.max_wait_secs)
    }

    /// How long an unused session is kept
    pub fn session_idle(&self) -> Duration {
        Duration::from_secs(self.session_idle_secs)
    }

    /// `host:port` to bind
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> ConfigResult<T>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        setting: key.to_string(),
        reason: format!("`{value}`: {e}"),
    })
}
