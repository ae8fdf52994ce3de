//! Inbound update types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dispatch::Command;

/// Kind of chat a message was posted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatType {
    /// One-to-one conversation with a user.
    Private,
    /// Basic group or megagroup.
    Group,
    /// Broadcast channel.
    Channel,
}

/// Media attached to a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Photo,
    Document,
    Video,
    Audio,
    Voice,
    Sticker,
    Animation,
    Contact,
    Geo,
    Poll,
    WebPage,
    Other,
}

/// A new or edited chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Message identifier, unique within the chat.
    pub id: i32,

    /// Identifier of the chat the message belongs to.
    pub chat_id: i64,

    /// Kind of that chat.
    pub chat_type: ChatType,

    /// Sender of the message. Absent for anonymous channel posts.
    #[serde(default)]
    pub sender_id: Option<i64>,

    /// Message text or media caption.
    #[serde(default)]
    pub text: String,

    /// Attached media, if any.
    #[serde(default)]
    pub media: Option<MediaKind>,

    /// Whether the message was sent by the logged-in account.
    #[serde(default)]
    pub outgoing: bool,

    /// When the message was sent.
    #[serde(default = "Utc::now")]
    pub date: DateTime<Utc>,

    /// Identifier of the message this one replies to.
    #[serde(default)]
    pub reply_to: Option<i32>,
}

impl Message {
    /// Creates a plain text message with the current timestamp.
    #[must_use]
    pub fn new(id: i32, chat_id: i64, chat_type: ChatType, text: impl Into<String>) -> Self {
        Self {
            id,
            chat_id,
            chat_type,
            sender_id: None,
            text: text.into(),
            media: None,
            outgoing: false,
            date: Utc::now(),
            reply_to: None,
        }
    }

    /// Sets the sender.
    #[must_use]
    pub const fn from_user(mut self, sender_id: i64) -> Self {
        self.sender_id = Some(sender_id);
        self
    }

    /// Attaches media to the message.
    #[must_use]
    pub const fn with_media(mut self, media: MediaKind) -> Self {
        self.media = Some(media);
        self
    }

    /// Marks the message as sent by the logged-in account.
    #[must_use]
    pub const fn as_outgoing(mut self) -> Self {
        self.outgoing = true;
        self
    }

    #[must_use]
    pub fn is_private(&self) -> bool {
        self.chat_type == ChatType::Private
    }

    #[must_use]
    pub fn is_group(&self) -> bool {
        self.chat_type == ChatType::Group
    }

    #[must_use]
    pub fn is_channel(&self) -> bool {
        self.chat_type == ChatType::Channel
    }

    /// A text message carries non-empty text and no media.
    #[must_use]
    pub fn is_text(&self) -> bool {
        self.media.is_none() && !self.text.is_empty()
    }

    #[must_use]
    pub const fn is_media(&self) -> bool {
        self.media.is_some()
    }

    /// Whether the text parses as a command for one of `prefixes`.
    #[must_use]
    pub fn is_command(&self, prefixes: &str) -> bool {
        self.command(prefixes).is_some()
    }

    /// Parses the message text as a command.
    #[must_use]
    pub fn command(&self, prefixes: &str) -> Option<Command> {
        Command::parse(&self.text, prefixes)
    }

    /// Arguments following the command, or the whole text if it is not one.
    #[must_use]
    pub fn args(&self, prefixes: &str) -> String {
        self.command(prefixes)
            .map_or_else(|| self.text.trim().to_owned(), |cmd| cmd.args)
    }
}

/// An inline query typed into `@bot ...`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineQuery {
    pub id: i64,
    pub sender_id: i64,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub offset: String,
}

/// A press on an inline keyboard button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackQuery {
    pub id: i64,
    pub chat_id: i64,
    pub sender_id: i64,
    pub message_id: i32,
    #[serde(default)]
    pub data: Vec<u8>,
}

impl CallbackQuery {
    /// Callback data decoded as UTF-8, with invalid sequences replaced.
    #[must_use]
    pub fn data_str(&self) -> String {
        String::from_utf8_lossy(&self.data).into_owned()
    }
}

/// What happened in a chat-action update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ChatActionKind {
    Joined,
    Left,
    Added { by: i64 },
    Kicked { by: i64 },
    TitleChanged { title: String },
    PhotoChanged,
    Pinned { message_id: i32 },
}

/// Service event in a chat (joins, leaves, title changes, pins).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatAction {
    pub chat_id: i64,
    pub user_id: i64,
    #[serde(flatten)]
    pub kind: ChatActionKind,
}

/// Any update the typed handlers do not model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawUpdate {
    /// Constructor name of the underlying API object, e.g. `updateUserStatus`.
    pub type_name: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// An inbound event delivered by the transport layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Update {
    NewMessage(Message),
    EditedMessage(Message),
    InlineQuery(InlineQuery),
    CallbackQuery(CallbackQuery),
    ChatAction(ChatAction),
    Raw(RawUpdate),
}

impl Update {
    /// The update's type, as used to select raw handlers.
    #[must_use]
    pub fn kind(&self) -> UpdateKind {
        match self {
            Self::NewMessage(_) => UpdateKind::NewMessage,
            Self::EditedMessage(_) => UpdateKind::EditedMessage,
            Self::InlineQuery(_) => UpdateKind::InlineQuery,
            Self::CallbackQuery(_) => UpdateKind::CallbackQuery,
            Self::ChatAction(_) => UpdateKind::ChatAction,
            Self::Raw(raw) => UpdateKind::Raw(raw.type_name.clone()),
        }
    }
}

/// Type-level discriminant of an [`Update`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UpdateKind {
    NewMessage,
    EditedMessage,
    InlineQuery,
    CallbackQuery,
    ChatAction,
    /// A raw update with the given constructor name.
    Raw(String),
}

impl fmt::Display for UpdateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NewMessage => f.write_str("new_message"),
            Self::EditedMessage => f.write_str("edited_message"),
            Self::InlineQuery => f.write_str("inline_query"),
            Self::CallbackQuery => f.write_str("callback_query"),
            Self::ChatAction => f.write_str("chat_action"),
            Self::Raw(name) => write!(f, "raw:{name}"),
        }
    }
}
