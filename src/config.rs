//! Driver configuration loading.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

use crate::state::{Role, snapshot::DEFAULT_READING_SPEED};

/// Default location on disk where the driver looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/session.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "QUIZ_SESSION_CONFIG_PATH";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Immutable settings for one session driver.
pub struct SessionConfig {
    /// Capacity of the inbound event queue.
    pub event_queue_capacity: usize,
    /// Capacity of the effect broadcast channel.
    pub effect_channel_capacity: usize,
    /// Number of past snapshots retained for inspection.
    pub history_limit: usize,
    /// Period of the timer ticker.
    pub tick_interval: Duration,
    /// Reading pace seeded into a freshly joined snapshot.
    pub reading_speed: u32,
    /// Capacity in which the local viewer joins.
    pub role: Role,
}

impl SessionConfig {
    /// Load the configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        history_limit = config.history_limit,
                        tick_ms = config.tick_interval.as_millis() as u64,
                        "loaded session config"
                    );
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    event_queue_capacity: usize,
    effect_channel_capacity: usize,
    history_limit: usize,
    tick_interval_ms: u64,
    reading_speed: u32,
    role: Role,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            event_queue_capacity: 64,
            effect_channel_capacity: 16,
            history_limit: 32,
            tick_interval_ms: 100,
            reading_speed: DEFAULT_READING_SPEED,
            role: Role::Player,
        }
    }
}

impl From<RawConfig> for SessionConfig {
    fn from(value: RawConfig) -> Self {
        Self {
            // Tokio channels panic on a zero capacity.
            event_queue_capacity: value.event_queue_capacity.max(1),
            effect_channel_capacity: value.effect_channel_capacity.max(1),
            history_limit: value.history_limit,
            tick_interval: Duration::from_millis(value.tick_interval_ms.max(1)),
            reading_speed: value.reading_speed.max(1),
            role: value.role,
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
