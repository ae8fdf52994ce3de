//! Configuration for the dispatcher and the Telegram connection.
//!
//! Values come from environment variables (optionally loaded from `.env` by
//! the binary) with defaults for everything except API credentials.

mod settings;

pub use settings::{ConfigError, DispatchSettings, TelegramConfig};

/// Characters that start a command when nothing else is configured.
pub const DEFAULT_COMMAND_PREFIXES: &str = "/!";
