//! Request option payloads.
//!
//! These carry no behaviour: the RPC layer reads them field by field. Field
//! names on the wire are fixed, and empty or default fields are omitted.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::participant::{ChatAdminRights, ChatBannedRights};
use crate::progress::Progress;
use crate::types::{InputPeer, PeerRef};

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero_i32(v: &i32) -> bool {
    *v == 0
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero_i64(v: &i64) -> bool {
    *v == 0
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(v: &bool) -> bool {
    !*v
}

fn is_empty_peer(peer: &InputPeer) -> bool {
    peer.is_empty()
}

/// A file to upload or one already uploaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum InputFile {
    Local { path: PathBuf },
    Uploaded { id: i64, parts: i32, name: String },
    Remote { url: String },
}

/// Extra metadata attached to a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "attribute", rename_all = "snake_case")]
pub enum DocumentAttribute {
    Filename {
        file_name: String,
    },
    Video {
        duration: i32,
        w: i32,
        h: i32,
        #[serde(default)]
        round_message: bool,
        #[serde(default)]
        supports_streaming: bool,
    },
    Audio {
        duration: i32,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        performer: Option<String>,
        #[serde(default)]
        voice: bool,
    },
    ImageSize {
        w: i32,
        h: i32,
    },
    Animated,
    Sticker {
        alt: String,
    },
}

/// One inline keyboard button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineButton {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Keyboard attached to an outgoing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "markup", rename_all = "snake_case")]
pub enum ReplyMarkup {
    Inline {
        rows: Vec<Vec<InlineButton>>,
    },
    Keyboard {
        rows: Vec<Vec<String>>,
        #[serde(default)]
        resize: bool,
        #[serde(default)]
        single_use: bool,
    },
    Hide,
    ForceReply,
}

/// Formatting entity inside a text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEntity {
    pub kind: String,
    pub offset: i32,
    pub length: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Remote document used for inline result thumbnails and content.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InputWebDocument {
    pub url: String,
    #[serde(default)]
    pub size: i32,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<DocumentAttribute>,
}

impl InputWebDocument {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.url.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct InputGeoPoint {
    pub lat: f64,
    pub long: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy_radius: Option<i32>,
}

/// Message search filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessagesFilter {
    #[default]
    Empty,
    Photos,
    Video,
    PhotoVideo,
    Document,
    Url,
    Gif,
    Voice,
    Music,
    Pinned,
    Mentions,
}

impl MessagesFilter {
    const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Which participants of a channel to list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChannelParticipantsFilter {
    #[default]
    Recent,
    Admins,
    Bots,
    Kicked { q: String },
    Banned { q: String },
    Search { q: String },
    Contacts { q: String },
}

/// Caption for one media item or one per album item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Caption {
    Text(String),
    Album(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogOptions {
    #[serde(skip_serializing_if = "is_zero_i32")]
    pub offset_id: i32,
    #[serde(skip_serializing_if = "is_zero_i32")]
    pub offset_date: i32,
    #[serde(skip_serializing_if = "is_empty_peer")]
    pub offset_peer: InputPeer,
    #[serde(skip_serializing_if = "is_zero_i32")]
    pub limit: i32,
    #[serde(skip_serializing_if = "is_false")]
    pub exclude_pinned: bool,
    #[serde(skip_serializing_if = "is_zero_i32")]
    pub folder_id: i32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct InlineOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dialog: Option<PeerRef>,
    pub offset: i32,
    pub query: String,
    pub geo_point: InputGeoPoint,
}

#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginOptions {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub password: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub code: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub code_hash: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub first_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub last_name: String,
}

impl std::fmt::Debug for LoginOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginOptions")
            .field("password", &if self.password.is_empty() { "" } else { "***" })
            .field("code", &self.code)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .finish_non_exhaustive()
    }
}

/// Options for downloading media.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadOptions {
    /// Shared tracker updated as chunks arrive.
    #[serde(skip)]
    pub progress: Option<Arc<Progress>>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub file_name: String,
    #[serde(skip_serializing_if = "is_zero_i32")]
    pub dc_id: i32,
    #[serde(skip_serializing_if = "is_zero_i32")]
    pub size: i32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct SendOptions {
    #[serde(skip_serializing_if = "is_zero_i32")]
    pub reply_id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<Caption>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub parse_mode: String,
    #[serde(skip_serializing_if = "is_false")]
    pub silent: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub link_preview: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<ReplyMarkup>,
    #[serde(skip_serializing_if = "is_false")]
    pub clear_draft: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub no_forwards: bool,
    #[serde(skip_serializing_if = "is_zero_i32")]
    pub schedule_date: i32,
    #[serde(skip_serializing_if = "is_empty_peer")]
    pub send_as: InputPeer,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumb: Option<InputFile>,
    #[serde(skip_serializing_if = "is_zero_i32")]
    pub ttl: i32,
    #[serde(skip_serializing_if = "is_false")]
    pub force_document: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub file_name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<DocumentAttribute>,
    /// Media to send instead of plain text; shape defined by the RPC layer.
    #[serde(rename = "Media", skip_serializing_if = "Option::is_none")]
    pub media: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct MediaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<Caption>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub parse_mode: String,
    #[serde(skip_serializing_if = "is_false")]
    pub silent: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub link_preview: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<ReplyMarkup>,
    #[serde(skip_serializing_if = "is_false")]
    pub clear_draft: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub no_forwards: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumb: Option<InputFile>,
    #[serde(skip_serializing_if = "is_false")]
    pub no_sound_video: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub force_document: bool,
    #[serde(skip_serializing_if = "is_zero_i32")]
    pub reply_id: i32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub file_name: String,
    #[serde(skip_serializing_if = "is_zero_i32")]
    pub ttl: i32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<DocumentAttribute>,
    #[serde(skip_serializing_if = "is_zero_i32")]
    pub schedule_date: i32,
    #[serde(skip_serializing_if = "is_empty_peer")]
    pub send_as: InputPeer,
}

/// Per-file overrides inside an album upload.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomAttrs {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub file_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumb: Option<InputFile>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<DocumentAttribute>,
    #[serde(skip_serializing_if = "is_false")]
    pub force_document: bool,
    #[serde(skip_serializing_if = "is_zero_i32")]
    pub ttl: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ForwardOptions {
    #[serde(skip_serializing_if = "is_false")]
    pub hide_caption: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub hide_author: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub silent: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub protected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticipantOptions {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub query: String,
    pub filter: ChannelParticipantsFilter,
    #[serde(skip_serializing_if = "is_zero_i32")]
    pub offset: i32,
    #[serde(skip_serializing_if = "is_zero_i32")]
    pub limit: i32,
}

impl ParticipantOptions {
    /// First page of channel administrators. Each call returns a new value.
    #[must_use]
    pub const fn admins() -> Self {
        Self {
            query: String::new(),
            filter: ChannelParticipantsFilter::Admins,
            offset: 0,
            limit: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminOptions {
    #[serde(skip_serializing_if = "is_false")]
    pub is_admin: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rights: Option<ChatAdminRights>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub rank: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PhotosOptions {
    #[serde(skip_serializing_if = "is_zero_i64")]
    pub max_id: i64,
    #[serde(skip_serializing_if = "is_zero_i32")]
    pub offset: i32,
    #[serde(skip_serializing_if = "is_zero_i32")]
    pub limit: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PinOptions {
    #[serde(skip_serializing_if = "is_false")]
    pub unpin: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub pm_oneside: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub silent: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BannedOptions {
    #[serde(skip_serializing_if = "is_false")]
    pub ban: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub unban: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub mute: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub unmute: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rights: Option<ChatBannedRights>,
}

impl BannedOptions {
    /// Rights to apply: explicit ones win, otherwise derived from the flags.
    #[must_use]
    pub fn effective_rights(&self) -> ChatBannedRights {
        if let Some(rights) = self.rights {
            return rights;
        }
        if self.ban {
            ChatBannedRights::banned()
        } else if self.mute {
            ChatBannedRights::muted()
        } else {
            ChatBannedRights::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InlineSendOptions {
    #[serde(skip_serializing_if = "is_false")]
    pub gallery: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub next_offset: String,
    #[serde(skip_serializing_if = "is_zero_i32")]
    pub cache_time: i32,
    #[serde(skip_serializing_if = "is_false")]
    pub private: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub switch_pm: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub switch_pm_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CallbackOptions {
    #[serde(skip_serializing_if = "is_false")]
    pub alert: bool,
    #[serde(skip_serializing_if = "is_zero_i32")]
    pub cache_time: i32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InlineVenue {
    pub geo: InputGeoPoint,
    pub title: String,
    pub address: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub venue_id: String,
    #[serde(default)]
    pub venue_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InlineGeo {
    pub geo: InputGeoPoint,
    #[serde(default)]
    pub heading: Option<i32>,
    #[serde(default)]
    pub period: Option<i32>,
    #[serde(default)]
    pub proximity_notification_radius: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineContact {
    pub phone_number: String,
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub vcard: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineInvoice {
    pub title: String,
    pub description: String,
    pub currency: String,
    /// Amount in the smallest currency unit.
    pub amount: i64,
    pub payload: String,
    pub provider: String,
}

/// One inline query result article.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ArticleOptions {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "is_false")]
    pub exclude_media: bool,
    #[serde(skip_serializing_if = "InputWebDocument::is_empty")]
    pub thumb: InputWebDocument,
    #[serde(skip_serializing_if = "InputWebDocument::is_empty")]
    pub content: InputWebDocument,
    #[serde(skip_serializing_if = "is_false")]
    pub link_preview: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<ReplyMarkup>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub entities: Vec<MessageEntity>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub parse_mode: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub caption: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venue: Option<InlineVenue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<InlineGeo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<InlineContact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice: Option<InlineInvoice>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOption {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ids: Vec<i32>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub query: String,
    #[serde(skip_serializing_if = "is_zero_i32")]
    pub offset: i32,
    #[serde(skip_serializing_if = "is_zero_i32")]
    pub limit: i32,
    #[serde(skip_serializing_if = "MessagesFilter::is_empty")]
    pub filter: MessagesFilter,
    #[serde(skip_serializing_if = "is_zero_i32")]
    pub top_msg_id: i32,
    #[serde(skip_serializing_if = "is_zero_i32")]
    pub max_id: i32,
    #[serde(skip_serializing_if = "is_zero_i32")]
    pub min_id: i32,
    #[serde(skip_serializing_if = "is_zero_i32")]
    pub max_date: i32,
    #[serde(skip_serializing_if = "is_zero_i32")]
    pub min_date: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TitleOptions {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub last_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub about: String,
}
