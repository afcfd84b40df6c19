//! Environment configuration for the bot.

use crate::error::DevError;
use std::time::Duration;

const DEFAULT_SETTLE_MS: u64 = 2_000;

/// Source of environment values. Implemented for the real process
/// environment and for in-memory maps in tests.
pub trait ReadEnv {
    fn var(&self, key: &str) -> Option<String>;
}

pub struct SystemEnv;

impl ReadEnv for SystemEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub token: String,
    pub application_id: Option<u64>,
    pub prefix: String,
    pub dev_mode: bool,
    pub dev_guild_id: Option<u64>,
    /// Lets `sync global` run while the bot is confined to the dev guild.
    pub global_sync_override: bool,
    /// Pause between clearing and re-registering commands.
    pub settle: Duration,
}

impl Config {
    pub fn from_env(env: &impl ReadEnv) -> Result<Self, DevError> {
        let token = env
            .var("DISCORD_TOKEN")
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| DevError::Configuration("DISCORD_TOKEN not set".to_string()))?;

        let application_id = match env.var("APPLICATION_ID") {
            Some(raw) if !raw.trim().is_empty() => Some(parse_id("APPLICATION_ID", &raw)?),
            _ => None,
        };

        let prefix = env
            .var("PREFIX")
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| "!".to_string());

        let dev_mode = env.var("DEV_MODE").map(|v| parse_bool(&v)).unwrap_or(false);

        let dev_guild_id = match env.var("DEV_GUILD_ID") {
            Some(raw) if !raw.trim().is_empty() => Some(parse_id("DEV_GUILD_ID", &raw)?),
            _ => None,
        };

        let global_sync_override = env
            .var("DEV_GLOBAL_SYNC_OVERRIDE")
            .map(|v| parse_bool(&v))
            .unwrap_or(false);

        let settle_ms = match env.var("DEV_SYNC_SETTLE_MS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                DevError::Configuration(format!("DEV_SYNC_SETTLE_MS is not a number: {}", raw))
            })?,
            None => DEFAULT_SETTLE_MS,
        };

        let config = Config {
            token,
            application_id,
            prefix,
            dev_mode,
            dev_guild_id,
            global_sync_override,
            settle: Duration::from_millis(settle_ms),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), DevError> {
        if self.dev_mode && self.dev_guild_id.is_none() {
            return Err(DevError::Configuration(
                "DEV_MODE is enabled but DEV_GUILD_ID is not set".to_string(),
            ));
        }
        Ok(())
    }

    pub fn mode_name(&self) -> &'static str {
        if self.dev_mode { "Development" } else { "Production" }
    }

    /// Whether the bot may stay in `guild_id`. Outside dev mode every guild is allowed.
    pub fn allows_guild(&self, guild_id: u64) -> bool {
        !self.dev_mode || self.dev_guild_id == Some(guild_id)
    }
}

fn parse_bool(raw: &str) -> bool {
    matches!(raw.trim().to_lowercase().as_str(), "true" | "1" | "yes" | "on")
}

fn parse_id(key: &str, raw: &str) -> Result<u64, DevError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| DevError::Configuration(format!("{} is not a valid id: {}", key, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct InMemoryEnv(HashMap<&'static str, &'static str>);

    impl InMemoryEnv {
        fn new(pairs: &[(&'static str, &'static str)]) -> Self {
            Self(pairs.iter().cloned().collect())
        }
    }

    impl ReadEnv for InMemoryEnv {
        fn var(&self, key: &str) -> Option<String> {
            self.0.get(key).map(|v| v.to_string())
        }
    }

    #[test]
    fn defaults_to_production() {
        let env = InMemoryEnv::new(&[("DISCORD_TOKEN", " abc ")]);
        let cfg = Config::from_env(&env).unwrap();
        assert_eq!(cfg.token, "abc");
        assert_eq!(cfg.prefix, "!");
        assert!(!cfg.dev_mode);
        assert_eq!(cfg.dev_guild_id, None);
        assert_eq!(cfg.settle, Duration::from_millis(DEFAULT_SETTLE_MS));
        assert!(cfg.allows_guild(42));
    }

    #[test]
    fn dev_mode_requires_guild() {
        let env = InMemoryEnv::new(&[("DISCORD_TOKEN", "abc"), ("DEV_MODE", "true")]);
        let err = Config::from_env(&env).unwrap_err();
        assert!(matches!(err, DevError::Configuration(_)));
    }

    #[test]
    fn dev_mode_confines_to_dev_guild() {
        let env = InMemoryEnv::new(&[
            ("DISCORD_TOKEN", "abc"),
            ("DEV_MODE", "TRUE"),
            ("DEV_GUILD_ID", "1234"),
            ("DEV_SYNC_SETTLE_MS", "0"),
        ]);
        let cfg = Config::from_env(&env).unwrap();
        assert!(cfg.dev_mode);
        assert_eq!(cfg.dev_guild_id, Some(1234));
        assert!(cfg.allows_guild(1234));
        assert!(!cfg.allows_guild(99));
        assert_eq!(cfg.settle, Duration::ZERO);
    }

    #[test]
    fn rejects_non_numeric_guild() {
        let env = InMemoryEnv::new(&[("DISCORD_TOKEN", "abc"), ("DEV_GUILD_ID", "abc")]);
        assert!(matches!(
            Config::from_env(&env),
            Err(DevError::Configuration(_))
        ));
    }

    #[test]
    fn missing_token_is_a_configuration_error() {
        let env = InMemoryEnv::new(&[]);
        assert!(matches!(
            Config::from_env(&env),
            Err(DevError::Configuration(_))
        ));
    }
}
