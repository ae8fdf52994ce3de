//! Telegram client wrapper.
//!
//! Connects a user account through grammers and implements
//! [`PeerActions`](crate::action::PeerActions) for it.

mod client;

pub use client::{TelegramClient, TelegramError};
pub use grammers_client::client::{LoginToken, PasswordToken};
