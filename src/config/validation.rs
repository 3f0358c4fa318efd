//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use golem_proto::ChannelExt;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("irc.host is required")]
    MissingHost,
    #[error("irc.port must not be 0")]
    InvalidPort,
    #[error("irc.nick is required")]
    MissingNick,
    #[error("irc.channels must list at least one channel")]
    NoChannels,
    #[error("irc.channels contains an invalid channel name: '{0}'")]
    InvalidChannel(String),
    #[error("commands.triggers must list at least one non-empty trigger")]
    NoTriggers,
    #[error("{0} must be at least 1")]
    ZeroCapacity(&'static str),
    #[error("database.dsn is required")]
    MissingDsn,
    #[error("{0} must be an http(s) URL, got '{1}'")]
    InvalidUrl(&'static str, String),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    // Connection
    if config.irc.host.is_empty() {
        errors.push(ValidationError::MissingHost);
    }
    if config.irc.port == 0 {
        errors.push(ValidationError::InvalidPort);
    }
    if config.irc.nick.is_empty() {
        errors.push(ValidationError::MissingNick);
    }
    if config.irc.channels.is_empty() {
        errors.push(ValidationError::NoChannels);
    }
    for channel in &config.irc.channels {
        if !channel.is_channel_name() {
            errors.push(ValidationError::InvalidChannel(channel.clone()));
        }
    }

    // Commands
    if config.commands.triggers.iter().all(String::is_empty) {
        errors.push(ValidationError::NoTriggers);
    }
    if config.commands.workers == 0 {
        errors.push(ValidationError::ZeroCapacity("commands.workers"));
    }
    check_url(&mut errors, "commands.help_url", &config.commands.help_url);
    check_url(&mut errors, "commands.bingo_url", &config.commands.bingo_url);

    // Store
    if config.database.dsn.is_empty() {
        errors.push(ValidationError::MissingDsn);
    }
    if config.database.max_connections == 0 {
        errors.push(ValidationError::ZeroCapacity("database.max_connections"));
    }

    // Codefall
    check_url(&mut errors, "codefall.url", &config.codefall.url);
    if config.codefall.workers == 0 {
        errors.push(ValidationError::ZeroCapacity("codefall.workers"));
    }
    if config.codefall.queue == 0 {
        errors.push(ValidationError::ZeroCapacity("codefall.queue"));
    }
    if config.codefall.keepalive_secs == 0 {
        errors.push(ValidationError::ZeroCapacity("codefall.keepalive_secs"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &'static str, url: &str) {
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        errors.push(ValidationError::InvalidUrl(field, url.to_string()));
    }
}
