//! Update filtering and handler dispatch.
//!
//! Handlers are registered per update kind with a [`Pattern`] and, for
//! message-like updates, optional [`Filters`]. [`Dispatcher::dispatch`]
//! runs every matching handler in registration order.

mod command;
mod dispatcher;
mod error;
mod filters;
mod handle;
mod pattern;

pub use command::Command;
pub use dispatcher::{DispatchReport, Dispatcher};
pub use error::{DispatchError, ErrorSink, HandlerError, HandlerResult, log_sink};
pub use filters::{FilterFunc, FilterOutcome, Filters};
pub use handle::{
    CallbackHandle, ChatActionHandle, Context, HandlerId, InlineHandle, MessageEditHandle,
    MessageHandle, RawHandle,
};
pub use pattern::Pattern;
