//! Dispatch errors and the error sink.

use std::any::Any;
use std::sync::Arc;

use thiserror::Error;
use tracing::error;

use super::HandlerId;
use crate::types::UpdateKind;

/// Error returned by handler callbacks.
pub type HandlerError = anyhow::Error;

/// Result returned by handler callbacks.
pub type HandlerResult = Result<(), HandlerError>;

/// Errors surfaced by registration and dispatch.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },

    #[error("Handler {handler_id} for {kind} failed: {error:#}")]
    Handler {
        kind: UpdateKind,
        handler_id: HandlerId,
        error: HandlerError,
    },

    #[error("Handler {handler_id} for {kind} panicked: {message}")]
    HandlerPanicked {
        kind: UpdateKind,
        handler_id: HandlerId,
        message: String,
    },

    #[error("Filter of handler {handler_id} panicked: {message}")]
    FilterPanicked { handler_id: HandlerId, message: String },
}

/// Receives errors that dispatch isolates instead of propagating.
pub type ErrorSink = Arc<dyn Fn(&DispatchError) + Send + Sync>;

/// The default sink: log through `tracing`.
#[must_use]
pub fn log_sink() -> ErrorSink {
    Arc::new(|err| error!("Client - Error - {}", err))
}

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");

        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");

        let payload: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic payload");
    }

    #[test]
    fn test_handler_error_display() {
        let err = DispatchError::Handler {
            kind: UpdateKind::NewMessage,
            handler_id: HandlerId(3),
            error: anyhow::anyhow!("db down").context("saving message"),
        };
        assert_eq!(
            err.to_string(),
            "Handler #3 for new_message failed: saving message: db down"
        );
    }
}
