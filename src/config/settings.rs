//! Dispatcher settings and Telegram credentials.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::DEFAULT_COMMAND_PREFIXES;

/// Telegram API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Telegram API ID (obtain from <https://my.telegram.org>).
    pub api_id: i32,

    /// Telegram API hash (obtain from <https://my.telegram.org>).
    pub api_hash: String,

    /// Path to the session file.
    #[serde(default = "default_session_path")]
    pub session_path: PathBuf,
}

fn default_session_path() -> PathBuf {
    PathBuf::from("session.db")
}

impl TelegramConfig {
    #[must_use]
    pub fn new(api_id: i32, api_hash: String) -> Self {
        Self {
            api_id,
            api_hash,
            session_path: default_session_path(),
        }
    }

    /// Reads `TG_API_ID`, `TG_API_HASH` and the optional `TG_SESSION_PATH`.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or the ID is not a
    /// positive integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_id: i32 = std::env::var("TG_API_ID")
            .map_err(|_| ConfigError::MissingEnvVar("TG_API_ID"))?
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidApiId)?;
        if api_id <= 0 {
            return Err(ConfigError::InvalidApiId);
        }

        let api_hash =
            std::env::var("TG_API_HASH").map_err(|_| ConfigError::MissingEnvVar("TG_API_HASH"))?;

        let session_path = std::env::var("TG_SESSION_PATH")
            .map_or_else(|_| default_session_path(), PathBuf::from);

        Ok(Self {
            api_id,
            api_hash,
            session_path,
        })
    }
}

/// Settings for the dispatcher and the binary around it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchSettings {
    /// Every character here starts a command (`"/!"` accepts `/ping` and `!ping`).
    #[serde(default = "default_command_prefixes")]
    pub command_prefixes: String,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_command_prefixes() -> String {
    DEFAULT_COMMAND_PREFIXES.to_owned()
}

fn default_log_level() -> String {
    "info".to_owned()
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            command_prefixes: default_command_prefixes(),
            log_level: default_log_level(),
        }
    }
}

impl DispatchSettings {
    /// Reads `COMMAND_PREFIXES` and `RUST_LOG`, falling back to defaults.
    #[must_use]
    pub fn from_env_with_defaults() -> Self {
        Self {
            command_prefixes: std::env::var("COMMAND_PREFIXES")
                .unwrap_or_else(|_| default_command_prefixes()),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| default_log_level()),
        }
    }

    /// Checks that the prefixes can start a command.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPrefixes`] when the set is empty or holds
    /// whitespace or word characters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.command_prefixes.is_empty()
            || self
                .command_prefixes
                .chars()
                .any(|c| c.is_whitespace() || c.is_alphanumeric() || c == '_')
        {
            return Err(ConfigError::InvalidPrefixes(self.command_prefixes.clone()));
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid API ID format (must be a positive integer)")]
    InvalidApiId,

    #[error("Invalid command prefixes {0:?}: expected one or more punctuation characters")]
    InvalidPrefixes(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = DispatchSettings::default();
        assert_eq!(settings.command_prefixes, "/!");
        assert_eq!(settings.log_level, "info");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_invalid_prefixes() {
        for prefixes in ["", "a", "/ ", "_"] {
            let settings = DispatchSettings {
                command_prefixes: prefixes.to_owned(),
                ..DispatchSettings::default()
            };
            assert!(
                matches!(settings.validate(), Err(ConfigError::InvalidPrefixes(_))),
                "{prefixes:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_settings_deserialize_defaults() {
        let settings: DispatchSettings = serde_json::from_str(r#"{"command_prefixes":"."}"#).unwrap();
        assert_eq!(settings.command_prefixes, ".");
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_telegram_config_new() {
        let config = TelegramConfig::new(12345, "abc123".to_owned());
        assert_eq!(config.api_id, 12345);
        assert_eq!(config.api_hash, "abc123");
        assert_eq!(config.session_path, PathBuf::from("session.db"));
    }
}
