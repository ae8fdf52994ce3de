//! Update and peer value types.
//!
//! These are the transport-neutral shapes the dispatcher works on. The
//! transport layer converts whatever it receives into an [`Update`] and
//! hands it to [`crate::dispatch::Dispatcher::dispatch`].

mod peer;
mod update;

pub use peer::{InputPeer, PeerRef, SendMessageAction};
pub use update::{
    CallbackQuery, ChatAction, ChatActionKind, ChatType, InlineQuery, MediaKind, Message,
    RawUpdate, Update, UpdateKind,
};
