//! Peer references and ephemeral chat actions.

use serde::{Deserialize, Serialize};

/// A peer as the API expects it in requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputPeer {
    /// No peer. Requests addressed here are rejected locally.
    #[default]
    Empty,
    /// The logged-in account itself.
    #[serde(rename = "self")]
    SelfPeer,
    User { user_id: i64, access_hash: i64 },
    Chat { chat_id: i64 },
    Channel { channel_id: i64, access_hash: i64 },
}

impl InputPeer {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Loose reference to a dialog: a numeric id, a `@username`, or a resolved peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PeerRef {
    Id(i64),
    Username(String),
    Input(InputPeer),
}

/// Ephemeral peer-visible state such as "typing…".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SendMessageAction {
    #[default]
    Typing,
    /// Clears whatever action is currently shown.
    Cancel,
    RecordVideo,
    UploadVideo { progress: i32 },
    RecordAudio,
    UploadAudio { progress: i32 },
    UploadPhoto { progress: i32 },
    UploadDocument { progress: i32 },
    GeoLocation,
    ChooseContact,
    ChooseSticker,
    GamePlay,
}
