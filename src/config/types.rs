//! Core configuration types and loading.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use super::defaults::*;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("environment variable {0} is not set")]
    Missing(&'static str),
    #[error("environment variable {variable} cannot be parsed: {reason}")]
    Invalid {
        variable: &'static str,
        reason: String,
    },
}

/// Bot configuration.
///
/// Built once at startup and shared read-only afterwards.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Chat network connection.
    pub irc: IrcConfig,
    /// Command routing.
    pub commands: CommandConfig,
    /// Entry store.
    pub database: DatabaseConfig,
    /// Codefall notifications and announcements.
    #[serde(default)]
    pub codefall: CodefallConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Chat network connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct IrcConfig {
    /// Server hostname (e.g., "irc.chat.twitch.tv").
    pub host: String,
    /// Server port.
    #[serde(default = "default_irc_port")]
    pub port: u16,
    /// Nickname to register with.
    pub nick: String,
    /// Server password (`oauth:...` on Twitch). Empty means no PASS.
    #[serde(default)]
    pub password: String,
    /// Channels to join after registration.
    pub channels: Vec<String>,
    /// Wrap the connection in TLS.
    #[serde(default = "default_true")]
    pub tls: bool,
    /// Request the `twitch.tv/tags` capability after registration.
    #[serde(default = "default_true")]
    pub request_tags: bool,
}

/// Command router configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandConfig {
    /// Prefixes marking a line as a command (e.g., `["!"]`).
    pub triggers: Vec<String>,
    /// Maximum number of command handlers running at once.
    #[serde(default = "default_command_workers")]
    pub workers: usize,
    /// Documentation link for `help`.
    #[serde(default = "default_help_url")]
    pub help_url: String,
    /// Link for `bingo`.
    #[serde(default = "default_bingo_url")]
    pub bingo_url: String,
}

impl CommandConfig {
    /// Command configuration with default workers and links.
    pub fn with_triggers(triggers: Vec<String>) -> Self {
        Self {
            triggers,
            workers: default_command_workers(),
            help_url: default_help_url(),
            bingo_url: default_bingo_url(),
        }
    }
}

/// Postgres configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Connection string (e.g., "postgres://pump19@localhost/pump19").
    pub dsn: String,
    /// Pool size.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

/// Codefall configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CodefallConfig {
    /// Base URL that entry keys are appended to.
    #[serde(default = "default_codefall_url")]
    pub url: String,
    /// Pub/sub channel to LISTEN on.
    #[serde(default = "default_codefall_channel")]
    pub channel: String,
    /// Idle window before the subscription is pinged (seconds).
    #[serde(default = "default_keepalive_secs")]
    pub keepalive_secs: u64,
    /// Maximum number of notification lookups running at once.
    #[serde(default = "default_resolve_workers")]
    pub workers: usize,
    /// Capacity of the listener to dispatcher queue.
    #[serde(default = "default_announce_queue")]
    pub queue: usize,
}

impl CodefallConfig {
    /// Idle window as a [`Duration`].
    pub fn keepalive(&self) -> Duration {
        Duration::from_secs(self.keepalive_secs)
    }
}

impl Default for CodefallConfig {
    fn default() -> Self {
        Self {
            url: default_codefall_url(),
            channel: default_codefall_channel(),
            keepalive_secs: default_keepalive_secs(),
            workers: default_resolve_workers(),
            queue: default_announce_queue(),
        }
    }
}
