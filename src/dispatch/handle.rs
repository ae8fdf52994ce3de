//! Registered handler records.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;

use super::{Filters, HandlerResult, Pattern};
use crate::action::{ActionResult, PeerActions};
use crate::types::{CallbackQuery, ChatAction, InlineQuery, InputPeer, Message, Update, UpdateKind};

/// Identifier assigned to a handler at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(pub(crate) u64);

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a callback gets besides the update itself.
#[derive(Clone)]
pub struct Context {
    handler_id: HandlerId,
    client: Option<Arc<dyn PeerActions>>,
}

impl Context {
    pub(crate) fn new(handler_id: HandlerId, client: Option<Arc<dyn PeerActions>>) -> Self {
        Self { handler_id, client }
    }

    #[must_use]
    pub const fn handler_id(&self) -> HandlerId {
        self.handler_id
    }

    /// The client the dispatcher was built with, if any.
    #[must_use]
    pub fn client(&self) -> Option<&Arc<dyn PeerActions>> {
        self.client.as_ref()
    }

    /// An action handle for `peer` bound to this context's client.
    #[must_use]
    pub fn action(&self, peer: InputPeer) -> ActionResult {
        ActionResult::new(Some(peer), self.client.clone())
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("handler_id", &self.handler_id)
            .field("has_client", &self.client.is_some())
            .finish()
    }
}

/// Type-erased async callback.
pub(crate) type Callback<T> = Arc<dyn Fn(Context, T) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

pub(crate) fn boxed_callback<T, F, Fut>(callback: F) -> Callback<T>
where
    T: Send + 'static,
    F: Fn(Context, T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(move |ctx: Context, value: T| callback(ctx, value).boxed())
}

/// Handler for new messages.
#[derive(Clone)]
pub struct MessageHandle {
    pub(crate) id: HandlerId,
    pub(crate) pattern: Pattern,
    pub(crate) filters: Option<Filters>,
    pub(crate) callback: Callback<Message>,
}

/// Handler for edited messages.
#[derive(Clone)]
pub struct MessageEditHandle {
    pub(crate) id: HandlerId,
    pub(crate) pattern: Pattern,
    pub(crate) filters: Option<Filters>,
    pub(crate) callback: Callback<Message>,
}

#[derive(Clone)]
pub struct InlineHandle {
    pub(crate) id: HandlerId,
    pub(crate) pattern: Pattern,
    pub(crate) callback: Callback<InlineQuery>,
}

#[derive(Clone)]
pub struct CallbackHandle {
    pub(crate) id: HandlerId,
    pub(crate) pattern: Pattern,
    pub(crate) callback: Callback<CallbackQuery>,
}

/// Handler for chat service events; receives every chat action.
#[derive(Clone)]
pub struct ChatActionHandle {
    pub(crate) id: HandlerId,
    pub(crate) callback: Callback<ChatAction>,
}

/// Handler selected by update type rather than content.
#[derive(Clone)]
pub struct RawHandle {
    pub(crate) id: HandlerId,
    pub(crate) update_kind: UpdateKind,
    pub(crate) callback: Callback<Update>,
}

/// Common view over every handler record.
pub(crate) trait Handle {
    fn id(&self) -> HandlerId;
}

/// Handler records that see messages: new and edited ones.
pub(crate) trait MessageHandler: Handle {
    fn pattern(&self) -> &Pattern;
    fn filters(&self) -> Option<&Filters>;
    fn callback(&self) -> &Callback<Message>;
}

macro_rules! impl_message_handler {
    ($($ty:ty),+) => {
        $(
            impl MessageHandler for $ty {
                fn pattern(&self) -> &Pattern {
                    &self.pattern
                }

                fn filters(&self) -> Option<&Filters> {
                    self.filters.as_ref()
                }

                fn callback(&self) -> &Callback<Message> {
                    &self.callback
                }
            }
        )+
    };
}

impl_message_handler!(MessageHandle, MessageEditHandle);

macro_rules! impl_handle {
    ($($ty:ty),+) => {
        $(
            impl Handle for $ty {
                fn id(&self) -> HandlerId {
                    self.id
                }
            }

            impl fmt::Debug for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.debug_struct(stringify!($ty))
                        .field("id", &self.id)
                        .finish_non_exhaustive()
                }
            }
        )+
    };
}

impl_handle!(
    MessageHandle,
    MessageEditHandle,
    InlineHandle,
    CallbackHandle,
    ChatActionHandle,
    RawHandle
);
