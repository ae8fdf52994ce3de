//! Update dispatch for Telegram user clients.
//!
//! This crate provides:
//! - Handler registration by update kind with patterns and message filters
//! - Concurrent-safe dispatch that isolates failing or panicking handlers
//! - Shared transfer progress tracking
//! - Cancellable peer actions ("typing…") over a grammers connection
//! - Participant, rights and request option types

pub mod action;
pub mod config;
pub mod dispatch;
pub mod options;
pub mod participant;
pub mod progress;
pub mod telegram;
pub mod types;

pub use action::{ActionResult, PeerActions};
pub use dispatch::{Dispatcher, Filters, Pattern};
pub use progress::Progress;
