//! # Runtime Configuration
//!
//! Every setting has a default; environment variables override them.
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `AL_QUERY_TIMEOUT_MS` | `5000` | Store query timeout |
//! | `AL_UPDATE_BUFFER` | `10000` | Pending updates before producers wait |
//! | `AL_EVENT_BUFFER` | `10000` | Queue length of each hub subscriber |
//! | `AL_REQUEST_BUFFER` | `10` | Pending store queries |
//! | `AL_SESSION_BUFFER` | `1024` | Pending frames per session |
//! | `AL_REFERENCE_DATA` | unset | JSON file with reference tables |

use al_01_session_store::ProviderConfig;
use aether_telemetry::TelemetryConfig;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Frames a session may queue before its reader waits.
pub const DEFAULT_SESSION_BUFFER_SIZE: usize = 1024;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

/// Per-session settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub frame_buffer_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            frame_buffer_size: DEFAULT_SESSION_BUFFER_SIZE,
        }
    }
}

/// Complete runtime configuration.
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    pub provider: ProviderConfig,
    pub telemetry: TelemetryConfig,
    pub session: SessionConfig,
    /// Reference tables to load; empty tables when unset.
    pub reference_data: Option<PathBuf>,
}

impl RuntimeConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`, which maps a variable name
    /// to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut provider = ProviderConfig::default();
        if let Some(ms) = parse::<u64, _>(&lookup, "AL_QUERY_TIMEOUT_MS")? {
            provider = provider.with_query_timeout(Duration::from_millis(ms));
        }
        if let Some(size) = parse::<usize, _>(&lookup, "AL_UPDATE_BUFFER")? {
            provider = provider.with_update_buffer_size(size);
        }
        if let Some(size) = parse::<usize, _>(&lookup, "AL_EVENT_BUFFER")? {
            provider = provider.with_event_buffer_size(size);
        }
        if let Some(size) = parse::<usize, _>(&lookup, "AL_REQUEST_BUFFER")? {
            provider = provider.with_request_buffer_size(size);
        }

        let mut session = SessionConfig::default();
        if let Some(size) = parse::<usize, _>(&lookup, "AL_SESSION_BUFFER")? {
            session.frame_buffer_size = size.max(1);
        }

        Ok(Self {
            provider,
            telemetry: TelemetryConfig::from_env(),
            session,
            reference_data: lookup("AL_REFERENCE_DATA")
                .filter(|path| !path.is_empty())
                .map(PathBuf::from),
        })
    }
}

fn parse<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(key) else {
        return Ok(None);
    };
    value
        .trim()
        .parse()
        .map(Some)
        .map_err(|_| ConfigError::InvalidValue { key, value })
}
