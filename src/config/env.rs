//! Configuration from `PUMP19_*` environment variables.

use std::str::FromStr;

use super::defaults::{default_codefall_url, default_max_connections, default_true};
use super::types::{CodefallConfig, CommandConfig, Config, ConfigError, DatabaseConfig, IrcConfig};

const IRC_HOSTNAME: &str = "PUMP19_IRC_HOSTNAME";
const IRC_PORT: &str = "PUMP19_IRC_PORT";
const IRC_NICKNAME: &str = "PUMP19_IRC_NICKNAME";
const IRC_PASSWORD: &str = "PUMP19_IRC_PASSWORD";
const IRC_CHANNELS: &str = "PUMP19_IRC_CHANNELS";
const IRC_TLS: &str = "PUMP19_IRC_TLS";
const CMD_TRIGGER: &str = "PUMP19_CMD_TRIGGER";
const SQL_DSN: &str = "PUMP19_SQL_DSN";
const CODEFALL_URL: &str = "PUMP19_CODEFALL_URL";

impl Config {
    /// Build configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars { lookup };

        let irc = IrcConfig {
            host: vars.required(IRC_HOSTNAME)?,
            port: vars.parsed(IRC_PORT)?,
            nick: vars.required(IRC_NICKNAME)?,
            password: vars.required(IRC_PASSWORD)?,
            channels: split_list(&vars.required(IRC_CHANNELS)?),
            tls: vars.parsed_or(IRC_TLS, default_true())?,
            request_tags: default_true(),
        };

        // Every character of the trigger variable is its own trigger.
        let triggers = vars
            .required(CMD_TRIGGER)?
            .chars()
            .map(String::from)
            .collect();

        let database = DatabaseConfig {
            dsn: vars.required(SQL_DSN)?,
            max_connections: default_max_connections(),
        };

        let codefall = CodefallConfig {
            url: vars.optional(CODEFALL_URL).unwrap_or_else(default_codefall_url),
            ..CodefallConfig::default()
        };

        Ok(Config {
            irc,
            commands: CommandConfig::with_triggers(triggers),
            database,
            codefall,
        })
    }
}

struct Vars<F> {
    lookup: F,
}

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, variable: &'static str) -> Option<String> {
        (self.lookup)(variable)
    }

    fn required(&self, variable: &'static str) -> Result<String, ConfigError> {
        self.optional(variable).ok_or(ConfigError::Missing(variable))
    }

    fn parsed<T>(&self, variable: &'static str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = self.required(variable)?;
        parse_value(variable, &raw)
    }

    fn parsed_or<T>(&self, variable: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.optional(variable) {
            Some(raw) => parse_value(variable, &raw),
            None => Ok(default),
        }
    }
}

fn parse_value<T>(variable: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        variable,
        reason: e.to_string(),
    })
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            (IRC_HOSTNAME, "irc.chat.twitch.tv"),
            (IRC_PORT, "6697"),
            (IRC_NICKNAME, "pump19"),
            (IRC_PASSWORD, "oauth:secret"),
            (IRC_CHANNELS, "#loadingreadyrun,#pump19"),
            (CMD_TRIGGER, "!?"),
            (SQL_DSN, "postgres://pump19@localhost/pump19"),
        ])
    }

    fn load(env: &HashMap<&'static str, &'static str>) -> Result<Config, ConfigError> {
        Config::from_lookup(|key| env.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn full_environment() {
        let config = load(&base_env()).unwrap();
        assert_eq!(config.irc.host, "irc.chat.twitch.tv");
        assert_eq!(config.irc.port, 6697);
        assert_eq!(config.irc.channels, vec!["#loadingreadyrun", "#pump19"]);
        assert!(config.irc.tls);
        assert_eq!(config.commands.triggers, vec!["!", "?"]);
        assert_eq!(config.database.dsn, "postgres://pump19@localhost/pump19");
        assert_eq!(config.codefall.url, "https://pump19.eu/codefall");
    }

    #[test]
    fn missing_variable_is_named() {
        let mut env = base_env();
        env.remove(IRC_NICKNAME);
        let err = load(&env).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(IRC_NICKNAME)));
        assert_eq!(
            err.to_string(),
            "environment variable PUMP19_IRC_NICKNAME is not set"
        );
    }

    #[test]
    fn unparsable_port() {
        let mut env = base_env();
        env.insert(IRC_PORT, "ircs");
        let err = load(&env).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                variable: IRC_PORT,
                ..
            }
        ));
    }

    #[test]
    fn optional_overrides() {
        let mut env = base_env();
        env.insert(IRC_TLS, "false");
        env.insert(CODEFALL_URL, "https://example.org/codefall");
        let config = load(&env).unwrap();
        assert!(!config.irc.tls);
        assert_eq!(config.codefall.url, "https://example.org/codefall");
    }

    #[test]
    fn blank_channel_entries_are_dropped() {
        assert_eq!(split_list("#a, ,#b,"), vec!["#a", "#b"]);
    }
}
