//! Ephemeral peer actions ("typing…", "uploading photo…").

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::telegram::TelegramError;
use crate::types::{InputPeer, SendMessageAction};

/// The client capability this crate needs: showing or clearing a peer action.
#[async_trait]
pub trait PeerActions: Send + Sync {
    /// Sets `action` on `peer`. Returns the server's confirmation flag.
    async fn set_typing(
        &self,
        peer: &InputPeer,
        action: SendMessageAction,
    ) -> Result<bool, TelegramError>;
}

/// A shown action together with the peer and client that can clear it.
#[derive(Clone, Default)]
pub struct ActionResult {
    pub peer: Option<InputPeer>,
    pub client: Option<Arc<dyn PeerActions>>,
}

impl ActionResult {
    #[must_use]
    pub fn new(peer: Option<InputPeer>, client: Option<Arc<dyn PeerActions>>) -> Self {
        Self { peer, client }
    }

    /// Shows `action` on `peer` and returns a handle that can cancel it.
    ///
    /// # Errors
    ///
    /// Returns the client's error if the request fails.
    pub async fn send(
        client: Arc<dyn PeerActions>,
        peer: InputPeer,
        action: SendMessageAction,
    ) -> Result<Self, TelegramError> {
        client.set_typing(&peer, action).await?;
        Ok(Self::new(Some(peer), Some(client)))
    }

    /// Cancels the action.
    ///
    /// Returns true only when the server confirmed the cancellation. A
    /// missing peer or client, or a failed request, yields false.
    pub async fn cancel(&self) -> bool {
        let (Some(peer), Some(client)) = (&self.peer, &self.client) else {
            return false;
        };

        match client.set_typing(peer, SendMessageAction::Cancel).await {
            Ok(confirmed) => confirmed,
            Err(e) => {
                debug!("Cancelling action on {:?} failed: {}", peer, e);
                false
            }
        }
    }
}

impl std::fmt::Debug for ActionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionResult")
            .field("peer", &self.peer)
            .field("has_client", &self.client.is_some())
            .finish()
    }
}
