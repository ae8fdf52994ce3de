//! tg_dispatch - command line entry point
//!
//! `replay` feeds recorded updates through a dispatcher; `cancel-typing`
//! clears a typing indicator over a live connection.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use tg_dispatch::action::{ActionResult, PeerActions};
use tg_dispatch::config::{DispatchSettings, TelegramConfig};
use tg_dispatch::dispatch::{Dispatcher, Filters, Pattern};
use tg_dispatch::progress::Progress;
use tg_dispatch::telegram::{TelegramClient, TelegramError};
use tg_dispatch::types::{InputPeer, Update, UpdateKind};

/// Update dispatch tooling for Telegram user clients.
#[derive(Parser, Debug)]
#[command(name = "tg_dispatch")]
#[command(about = "Replay Telegram updates through handlers and manage peer actions")]
#[command(version)]
struct Args {
    /// Path to the .env file for environment variables.
    #[arg(long, default_value = ".env", global = true)]
    env_file: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Dispatch updates read from a JSON-lines file.
    Replay {
        /// File with one JSON-encoded update per line.
        #[arg(short, long)]
        file: PathBuf,

        /// Command prefix characters (defaults to COMMAND_PREFIXES or "/!").
        #[arg(long)]
        prefixes: Option<String>,

        /// Only handle messages from private chats.
        #[arg(long)]
        private: bool,

        /// Only handle this command (without prefix).
        #[arg(long)]
        command: Option<String>,

        /// Ignore messages from these chats.
        #[arg(long = "chat")]
        blacklist: Vec<i64>,
    },

    /// Cancel the typing indicator shown to a user.
    CancelTyping {
        #[arg(long)]
        user_id: i64,

        #[arg(long)]
        access_hash: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logging depends on the environment, so report a missing .env afterwards.
    let env_loaded = dotenvy::from_filename(&args.env_file);

    let mut settings = DispatchSettings::from_env_with_defaults();
    if let Some(level) = &args.log_level {
        settings.log_level.clone_from(level);
    }
    init_logging(&settings.log_level);

    if let Err(e) = env_loaded {
        debug!("Could not load .env file ({}): {}", args.env_file, e);
    }

    match args.command {
        Cmd::Replay {
            file,
            prefixes,
            private,
            command,
            blacklist,
        } => {
            if let Some(prefixes) = prefixes {
                settings.command_prefixes = prefixes;
            }
            settings
                .validate()
                .context("Invalid dispatch settings")?;
            replay(&settings, &file, private, command, blacklist).await
        }
        Cmd::CancelTyping {
            user_id,
            access_hash,
        } => cancel_typing(user_id, access_hash).await,
    }
}

/// Initializes the logging subsystem. `RUST_LOG` wins over `level`.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

async fn replay(
    settings: &DispatchSettings,
    path: &Path,
    private: bool,
    command: Option<String>,
    blacklist: Vec<i64>,
) -> Result<()> {
    let file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let size = file
        .metadata()
        .await
        .context("Failed to read file metadata")?
        .len();
    let progress = Arc::new(Progress::new(i64::try_from(size).unwrap_or(i64::MAX)));

    let dispatcher = Arc::new(Dispatcher::from_settings(settings));
    register_handlers(&dispatcher, private, command, blacklist);

    let (tx, rx) = mpsc::channel::<Update>(64);
    let runner = {
        let dispatcher = Arc::clone(&dispatcher);
        tokio::spawn(async move { dispatcher.run(rx).await })
    };

    let stats = feed_updates(BufReader::new(file), &progress, &tx).await?;
    debug!("Read {:.1}% of {}", progress.percentage(), path.display());

    drop(tx);
    runner.await.context("Dispatcher task failed")?;

    let (total, current) = progress.data();
    info!(
        "Replayed {} lines ({} skipped), {}/{} bytes",
        stats.lines, stats.skipped, current, total
    );
    Ok(())
}

/// Line counts from one replay.
#[derive(Debug, Default, PartialEq, Eq)]
struct ReplayStats {
    lines: usize,
    skipped: usize,
}

/// Parses one update per line and sends it on `tx`.
///
/// `progress` advances by the bytes actually read, line endings included.
async fn feed_updates<R>(
    mut reader: R,
    progress: &Progress,
    tx: &mpsc::Sender<Update>,
) -> Result<ReplayStats>
where
    R: AsyncBufRead + Unpin,
{
    let mut stats = ReplayStats::default();
    let mut line = String::new();

    loop {
        line.clear();
        let read = reader
            .read_line(&mut line)
            .await
            .context("Failed to read update")?;
        if read == 0 {
            break;
        }
        stats.lines += 1;
        progress.add(i64::try_from(read).unwrap_or(i64::MAX));

        let text = line.trim();
        if text.is_empty() {
            continue;
        }

        match serde_json::from_str::<Update>(text) {
            Ok(update) => {
                if tx.send(update).await.is_err() {
                    warn!("Dispatcher stopped early");
                    break;
                }
            }
            Err(e) => {
                stats.skipped += 1;
                warn!("Skipping line {}: {}", stats.lines, e);
            }
        }
    }

    Ok(stats)
}

/// Registers handlers that log what they see.
fn register_handlers(
    dispatcher: &Dispatcher,
    private: bool,
    command: Option<String>,
    blacklist: Vec<i64>,
) {
    let mut filters = Filters::new().blacklist_chats(blacklist);
    if private {
        filters = filters.private();
    }
    let pattern = command.map_or(Pattern::Any, Pattern::from);

    dispatcher.on_message(pattern, Some(filters), |ctx, message| async move {
        info!(
            "[{}] message {} in chat {}: {:?}",
            ctx.handler_id(),
            message.id,
            message.chat_id,
            message.text
        );
        Ok(())
    });

    dispatcher.on_edited_message(Pattern::Any, None, |ctx, message| async move {
        info!(
            "[{}] edit of {} in chat {}",
            ctx.handler_id(),
            message.id,
            message.chat_id
        );
        Ok(())
    });

    dispatcher.on_inline_query(Pattern::Any, |ctx, query| async move {
        info!("[{}] inline query {:?}", ctx.handler_id(), query.query);
        Ok(())
    });

    dispatcher.on_callback_query(Pattern::Any, |ctx, query| async move {
        info!("[{}] callback {:?}", ctx.handler_id(), query.data_str());
        Ok(())
    });

    dispatcher.on_chat_action(|ctx, action| async move {
        info!(
            "[{}] chat {} user {}: {:?}",
            ctx.handler_id(),
            action.chat_id,
            action.user_id,
            action.kind
        );
        Ok(())
    });

    dispatcher.on_raw(UpdateKind::Raw("updateUserStatus".to_owned()), |ctx, update| {
        async move {
            debug!("[{}] {}", ctx.handler_id(), update.kind());
            Ok(())
        }
    });
}

async fn cancel_typing(user_id: i64, access_hash: i64) -> Result<()> {
    let config = TelegramConfig::from_env()
        .context("Failed to load Telegram configuration from environment")?;

    let client = TelegramClient::connect(&config)
        .await
        .context("Failed to connect to Telegram")?;

    if !client
        .is_authorized()
        .await
        .context("Failed to check authorization")?
    {
        authenticate(&client, &config).await?;
    }

    let client = Arc::new(client);
    let peer = InputPeer::User {
        user_id,
        access_hash,
    };
    let action = ActionResult::new(
        Some(peer),
        Some(Arc::clone(&client) as Arc<dyn PeerActions>),
    );

    if action.cancel().await {
        info!("Typing cancelled for user {}", user_id);
    } else {
        warn!("Server did not confirm cancelling typing for user {}", user_id);
    }

    client.disconnect();
    Ok(())
}

/// Handles Telegram authentication.
async fn authenticate(client: &TelegramClient, config: &TelegramConfig) -> Result<()> {
    info!("Authentication required");

    let phone: String = Input::new()
        .with_prompt("Enter your phone number (with country code)")
        .interact_text()?;

    let token = client
        .request_login_code(&phone, &config.api_hash)
        .await
        .context("Failed to request login code")?;

    info!("Login code sent to your Telegram app");

    let code: String = Input::new()
        .with_prompt("Enter the login code")
        .interact_text()?;

    match client.sign_in(&token, &code).await {
        Ok(()) => Ok(()),
        Err(TelegramError::PasswordRequired(password_token)) => {
            info!("Two-factor authentication is enabled");

            let hint = password_token.hint().unwrap_or("no hint");
            info!("Password hint: {}", hint);

            let password: String = Password::new()
                .with_prompt("Enter your 2FA password")
                .interact()?;

            client
                .check_password(password_token, &password)
                .await
                .context("2FA authentication failed")?;

            Ok(())
        }
        Err(e) => Err(e).context("Authentication failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_feed_counts_bytes_read() {
        let input = "{\"type\":\"new_message\",\"id\":1,\"chat_id\":1,\"chat_type\":\"private\",\"text\":\"hi\"}\r\n\
                     \r\n\
                     broken\r\n\
                     {\"type\":\"raw\",\"type_name\":\"updateUserStatus\"}";
        let total = i64::try_from(input.len()).unwrap();
        let progress = Progress::new(total);
        let (tx, mut rx) = mpsc::channel(8);

        let stats = feed_updates(input.as_bytes(), &progress, &tx).await.unwrap();
        drop(tx);

        assert_eq!(stats, ReplayStats { lines: 4, skipped: 1 });
        assert_eq!(progress.data(), (total, total));
        assert!((progress.percentage() - 100.0).abs() < f64::EPSILON);

        let mut kinds = Vec::new();
        while let Some(update) = rx.recv().await {
            kinds.push(update.kind().to_string());
        }
        assert_eq!(kinds, vec!["new_message", "raw:updateUserStatus"]);
    }
}
