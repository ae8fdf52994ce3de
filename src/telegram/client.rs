//! Connection to Telegram through grammers.

use std::sync::Arc;

use async_trait::async_trait;
use grammers_client::client::{LoginToken, PasswordToken};
use grammers_client::{Client, InvocationError, SenderPool, SignInError, sender};
use grammers_session::storages::SqliteSession;
use grammers_tl_types as tl;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::action::PeerActions;
use crate::config::TelegramConfig;
use crate::types::{InputPeer, SendMessageAction};

/// Errors that can occur during Telegram operations.
#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("Not authorized. Please sign in first.")]
    NotAuthorized,

    #[error("Sign in failed: {0}")]
    SignInFailed(String),

    #[error("Password required for 2FA")]
    PasswordRequired(PasswordToken),

    #[error("Invalid password")]
    InvalidPassword(PasswordToken),

    #[error("Flood wait required: {0} seconds")]
    FloodWait(u32),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Cannot address an empty peer")]
    InvalidPeer,

    #[error("API invocation error: {0}")]
    Invocation(String),
}

impl From<InvocationError> for TelegramError {
    fn from(err: InvocationError) -> Self {
        let err_str = err.to_string();

        if let Some(seconds) = extract_flood_wait_seconds(&err_str) {
            return Self::FloodWait(seconds);
        }

        Self::Invocation(err_str)
    }
}

/// Pulls the wait time out of `FLOOD_WAIT_<n>` style messages.
fn extract_flood_wait_seconds(err_msg: &str) -> Option<u32> {
    let lower = err_msg.to_lowercase();

    ["flood_wait_", "flood wait "].into_iter().find_map(|pattern| {
        let start = lower.find(pattern)? + pattern.len();
        lower[start..]
            .chars()
            .take_while(char::is_ascii_digit)
            .collect::<String>()
            .parse()
            .ok()
    })
}

/// Converts a peer for a request. [`InputPeer::Empty`] has no wire form here.
fn input_peer(peer: &InputPeer) -> Result<tl::enums::InputPeer, TelegramError> {
    Ok(match *peer {
        InputPeer::Empty => return Err(TelegramError::InvalidPeer),
        InputPeer::SelfPeer => tl::enums::InputPeer::PeerSelf,
        InputPeer::User {
            user_id,
            access_hash,
        } => tl::enums::InputPeer::User(tl::types::InputPeerUser {
            user_id,
            access_hash,
        }),
        InputPeer::Chat { chat_id } => {
            tl::enums::InputPeer::Chat(tl::types::InputPeerChat { chat_id })
        }
        InputPeer::Channel {
            channel_id,
            access_hash,
        } => tl::enums::InputPeer::Channel(tl::types::InputPeerChannel {
            channel_id,
            access_hash,
        }),
    })
}

fn send_message_action(action: SendMessageAction) -> tl::enums::SendMessageAction {
    use tl::enums::SendMessageAction as A;

    match action {
        SendMessageAction::Typing => A::SendMessageTypingAction,
        SendMessageAction::Cancel => A::SendMessageCancelAction,
        SendMessageAction::RecordVideo => A::SendMessageRecordVideoAction,
        SendMessageAction::UploadVideo { progress } => {
            A::SendMessageUploadVideoAction(tl::types::SendMessageUploadVideoAction { progress })
        }
        SendMessageAction::RecordAudio => A::SendMessageRecordAudioAction,
        SendMessageAction::UploadAudio { progress } => {
            A::SendMessageUploadAudioAction(tl::types::SendMessageUploadAudioAction { progress })
        }
        SendMessageAction::UploadPhoto { progress } => {
            A::SendMessageUploadPhotoAction(tl::types::SendMessageUploadPhotoAction { progress })
        }
        SendMessageAction::UploadDocument { progress } => A::SendMessageUploadDocumentAction(
            tl::types::SendMessageUploadDocumentAction { progress },
        ),
        SendMessageAction::GeoLocation => A::SendMessageGeoLocationAction,
        SendMessageAction::ChooseContact => A::SendMessageChooseContactAction,
        SendMessageAction::ChooseSticker => A::SendMessageChooseStickerAction,
        SendMessageAction::GamePlay => A::SendMessageGamePlayAction,
    }
}

/// A logged-in (or logging-in) user account.
pub struct TelegramClient {
    client: Client,

    /// Handle to the sender pool for disconnection.
    handle: sender::SenderPoolHandle,

    /// Background task running the sender pool.
    _pool_task: JoinHandle<()>,
}

impl TelegramClient {
    /// Opens the session file and connects.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be opened or the connection fails.
    pub async fn connect(config: &TelegramConfig) -> Result<Self, TelegramError> {
        info!("Connecting to Telegram...");

        let session = Arc::new(
            SqliteSession::open(&config.session_path)
                .await
                .map_err(|e| TelegramError::Session(e.to_string()))?,
        );

        let SenderPool {
            runner,
            updates: _updates,
            handle,
        } = SenderPool::new(Arc::clone(&session), config.api_id);

        let client = Client::new(handle.clone());

        let pool_task = tokio::spawn(async move {
            runner.run().await;
        });

        let is_authorized = client
            .is_authorized()
            .await
            .map_err(|e| TelegramError::Connection(e.to_string()))?;

        info!("Connected to Telegram. Authorized: {}", is_authorized);

        Ok(Self {
            client,
            handle: handle.thin,
            _pool_task: pool_task,
        })
    }

    /// Checks whether the session is already logged in.
    ///
    /// # Errors
    ///
    /// Returns an error if the check fails.
    pub async fn is_authorized(&self) -> Result<bool, TelegramError> {
        self.client
            .is_authorized()
            .await
            .map_err(|e| TelegramError::Connection(e.to_string()))
    }

    /// Requests a login code to be sent to the phone number.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn request_login_code(
        &self,
        phone: &str,
        api_hash: &str,
    ) -> Result<LoginToken, TelegramError> {
        info!("Requesting login code for phone: {}...", mask_phone(phone));

        self.client
            .request_login_code(phone, api_hash)
            .await
            .map_err(|e| TelegramError::SignInFailed(e.to_string()))
    }

    /// Signs in with the login code.
    ///
    /// # Errors
    ///
    /// Returns [`TelegramError::PasswordRequired`] when 2FA is enabled, or a
    /// sign-in error otherwise.
    pub async fn sign_in(&self, token: &LoginToken, code: &str) -> Result<(), TelegramError> {
        match self.client.sign_in(token, code).await {
            Ok(_user) => {
                info!("Successfully signed in!");
                Ok(())
            }
            Err(SignInError::PasswordRequired(password_token)) => {
                debug!("2FA password required, hint: {:?}", password_token.hint());
                Err(TelegramError::PasswordRequired(password_token))
            }
            Err(SignInError::InvalidCode) => {
                Err(TelegramError::SignInFailed("Invalid code".to_owned()))
            }
            Err(e) => Err(TelegramError::SignInFailed(e.to_string())),
        }
    }

    /// Completes a 2FA sign-in with the account password.
    ///
    /// # Errors
    ///
    /// Returns an error if the password is invalid.
    pub async fn check_password(
        &self,
        password_token: PasswordToken,
        password: &str,
    ) -> Result<(), TelegramError> {
        match self.client.check_password(password_token, password).await {
            Ok(_user) => {
                info!("Successfully authenticated with 2FA!");
                Ok(())
            }
            Err(SignInError::InvalidPassword(token)) => Err(TelegramError::InvalidPassword(token)),
            Err(e) => Err(TelegramError::SignInFailed(e.to_string())),
        }
    }

    /// Stops the sender pool.
    pub fn disconnect(&self) {
        info!("Disconnecting from Telegram...");
        self.handle.quit();
    }
}

#[async_trait]
impl PeerActions for TelegramClient {
    async fn set_typing(
        &self,
        peer: &InputPeer,
        action: SendMessageAction,
    ) -> Result<bool, TelegramError> {
        let request = tl::functions::messages::SetTyping {
            peer: input_peer(peer)?,
            top_msg_id: None,
            action: send_message_action(action),
        };

        debug!("Setting {:?} on {:?}", action, peer);

        match self.client.invoke(&request).await {
            Ok(confirmed) => Ok(confirmed),
            Err(e) => {
                let err: TelegramError = e.into();
                if let TelegramError::FloodWait(seconds) = &err {
                    warn!("Flood wait triggered: {} seconds", seconds);
                }
                Err(err)
            }
        }
    }
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient").finish_non_exhaustive()
    }
}

/// Masks a phone number for logging (shows last 4 digits).
fn mask_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.len() > 4 {
        format!("***{}", &digits[digits.len() - 4..])
    } else {
        "****".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_phone() {
        assert_eq!(mask_phone("+1234567890"), "***7890");
        assert_eq!(mask_phone("123"), "****");
        assert_eq!(mask_phone("+7 (999) 123-45-67"), "***4567");
    }

    #[test]
    fn test_extract_flood_wait() {
        assert_eq!(extract_flood_wait_seconds("FLOOD_WAIT_120"), Some(120));
        assert_eq!(extract_flood_wait_seconds("flood wait 60 seconds"), Some(60));
        assert_eq!(extract_flood_wait_seconds("some other error"), None);
    }

    #[test]
    fn test_empty_peer_rejected() {
        assert!(matches!(
            input_peer(&InputPeer::Empty),
            Err(TelegramError::InvalidPeer)
        ));
    }

    #[test]
    fn test_peer_conversion() {
        let peer = input_peer(&InputPeer::User {
            user_id: 10,
            access_hash: 20,
        })
        .unwrap();
        assert!(matches!(
            peer,
            tl::enums::InputPeer::User(tl::types::InputPeerUser {
                user_id: 10,
                access_hash: 20
            })
        ));
        assert!(matches!(
            input_peer(&InputPeer::SelfPeer).unwrap(),
            tl::enums::InputPeer::PeerSelf
        ));
    }

    #[test]
    fn test_action_conversion() {
        assert!(matches!(
            send_message_action(SendMessageAction::Cancel),
            tl::enums::SendMessageAction::SendMessageCancelAction
        ));
        assert!(matches!(
            send_message_action(SendMessageAction::UploadPhoto { progress: 40 }),
            tl::enums::SendMessageAction::SendMessageUploadPhotoAction(
                tl::types::SendMessageUploadPhotoAction { progress: 40 }
            )
        ));
    }
}
