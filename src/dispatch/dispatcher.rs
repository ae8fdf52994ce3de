//! Handler registry and update dispatch.
//!
//! Each update kind owns an ordered handler list stored as an
//! `Arc<Vec<_>>`. Registration swaps in a new list under a short write lock
//! (copy-on-write); a dispatch pass clones the `Arc` once and iterates that
//! snapshot, so handlers added mid-pass take effect from the next update.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::FutureExt;
use parking_lot::RwLock;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::error::{ErrorSink, log_sink, panic_message};
use super::filters::{self, FilterOutcome};
use super::handle::{
    CallbackHandle, ChatActionHandle, Context, Handle, InlineHandle, MessageEditHandle,
    MessageHandle, MessageHandler, RawHandle, boxed_callback,
};
use super::{DispatchError, Filters, HandlerId, HandlerResult, Pattern};
use crate::action::PeerActions;
use crate::config::{DEFAULT_COMMAND_PREFIXES, DispatchSettings};
use crate::types::{CallbackQuery, ChatAction, InlineQuery, Message, Update, UpdateKind};

/// Counts from one dispatch pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Handlers whose pattern and filters accepted the update.
    pub matched: usize,
    /// Matched handlers whose callback returned an error or panicked.
    pub failed: usize,
}

struct HandlerList<H> {
    inner: RwLock<Arc<Vec<H>>>,
}

impl<H: Handle + Clone> HandlerList<H> {
    fn new() -> Self {
        Self {
            inner: RwLock::new(Arc::new(Vec::new())),
        }
    }

    fn snapshot(&self) -> Arc<Vec<H>> {
        Arc::clone(&*self.inner.read())
    }

    fn push(&self, handle: H) {
        let mut list = self.inner.write();
        Arc::make_mut(&mut *list).push(handle);
    }

    fn remove(&self, id: HandlerId) -> bool {
        let mut list = self.inner.write();
        let Some(pos) = list.iter().position(|h| h.id() == id) else {
            return false;
        };
        Arc::make_mut(&mut *list).remove(pos);
        true
    }

    fn len(&self) -> usize {
        self.inner.read().len()
    }
}

/// Registry of update handlers.
///
/// Registration and dispatch both take `&self`; share the dispatcher through
/// an `Arc` to register from one task while another dispatches.
pub struct Dispatcher {
    prefixes: String,
    client: Option<Arc<dyn PeerActions>>,
    error_sink: ErrorSink,
    next_id: AtomicU64,
    messages: HandlerList<MessageHandle>,
    edits: HandlerList<MessageEditHandle>,
    inline_queries: HandlerList<InlineHandle>,
    callbacks: HandlerList<CallbackHandle>,
    chat_actions: HandlerList<ChatActionHandle>,
    raw: HandlerList<RawHandle>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(DEFAULT_COMMAND_PREFIXES)
    }
}

impl Dispatcher {
    /// Creates an empty dispatcher accepting the given command prefixes.
    #[must_use]
    pub fn new(prefixes: impl Into<String>) -> Self {
        Self {
            prefixes: prefixes.into(),
            client: None,
            error_sink: log_sink(),
            next_id: AtomicU64::new(1),
            messages: HandlerList::new(),
            edits: HandlerList::new(),
            inline_queries: HandlerList::new(),
            callbacks: HandlerList::new(),
            chat_actions: HandlerList::new(),
            raw: HandlerList::new(),
        }
    }

    /// Creates a dispatcher from settings.
    #[must_use]
    pub fn from_settings(settings: &DispatchSettings) -> Self {
        Self::new(settings.command_prefixes.clone())
    }

    /// Attaches the client handed to callbacks through [`Context`].
    #[must_use]
    pub fn with_client(mut self, client: Arc<dyn PeerActions>) -> Self {
        self.client = Some(client);
        self
    }

    /// Replaces the sink receiving isolated handler and filter failures.
    #[must_use]
    pub fn with_error_sink<F>(mut self, sink: F) -> Self
    where
        F: Fn(&DispatchError) + Send + Sync + 'static,
    {
        self.error_sink = Arc::new(sink);
        self
    }

    #[must_use]
    pub fn prefixes(&self) -> &str {
        &self.prefixes
    }

    fn next_id(&self) -> HandlerId {
        HandlerId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Registers a handler for new messages.
    pub fn on_message<F, Fut>(
        &self,
        pattern: impl Into<Pattern>,
        filters: Option<Filters>,
        callback: F,
    ) -> HandlerId
    where
        F: Fn(Context, Message) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        let id = self.next_id();
        let pattern = pattern.into();
        info!("Registered message handler {} ({:?})", id, pattern);
        self.messages.push(MessageHandle {
            id,
            pattern,
            filters,
            callback: boxed_callback(callback),
        });
        id
    }

    /// Registers a handler for edited messages.
    pub fn on_edited_message<F, Fut>(
        &self,
        pattern: impl Into<Pattern>,
        filters: Option<Filters>,
        callback: F,
    ) -> HandlerId
    where
        F: Fn(Context, Message) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        let id = self.next_id();
        let pattern = pattern.into();
        info!("Registered edited message handler {} ({:?})", id, pattern);
        self.edits.push(MessageEditHandle {
            id,
            pattern,
            filters,
            callback: boxed_callback(callback),
        });
        id
    }

    /// Registers a handler for inline queries.
    pub fn on_inline_query<F, Fut>(&self, pattern: impl Into<Pattern>, callback: F) -> HandlerId
    where
        F: Fn(Context, InlineQuery) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        let id = self.next_id();
        let pattern = pattern.into();
        info!("Registered inline query handler {} ({:?})", id, pattern);
        self.inline_queries.push(InlineHandle {
            id,
            pattern,
            callback: boxed_callback(callback),
        });
        id
    }

    /// Registers a handler for callback queries.
    pub fn on_callback_query<F, Fut>(&self, pattern: impl Into<Pattern>, callback: F) -> HandlerId
    where
        F: Fn(Context, CallbackQuery) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        let id = self.next_id();
        let pattern = pattern.into();
        info!("Registered callback query handler {} ({:?})", id, pattern);
        self.callbacks.push(CallbackHandle {
            id,
            pattern,
            callback: boxed_callback(callback),
        });
        id
    }

    /// Registers a handler for chat actions (joins, leaves, pins...).
    pub fn on_chat_action<F, Fut>(&self, callback: F) -> HandlerId
    where
        F: Fn(Context, ChatAction) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        let id = self.next_id();
        info!("Registered chat action handler {}", id);
        self.chat_actions.push(ChatActionHandle {
            id,
            callback: boxed_callback(callback),
        });
        id
    }

    /// Registers a handler for every update of the given kind.
    pub fn on_raw<F, Fut>(&self, update_kind: UpdateKind, callback: F) -> HandlerId
    where
        F: Fn(Context, Update) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        let id = self.next_id();
        info!("Registered raw handler {} for {}", id, update_kind);
        self.raw.push(RawHandle {
            id,
            update_kind,
            callback: boxed_callback(callback),
        });
        id
    }

    /// Removes a handler. Returns `false` if no handler has that id.
    pub fn remove_handler(&self, id: HandlerId) -> bool {
        let removed = self.messages.remove(id)
            || self.edits.remove(id)
            || self.inline_queries.remove(id)
            || self.callbacks.remove(id)
            || self.chat_actions.remove(id)
            || self.raw.remove(id);
        if removed {
            info!("Removed handler {}", id);
        }
        removed
    }

    /// Number of handlers that would see an update of `kind`, raw ones included.
    #[must_use]
    pub fn handler_count(&self, kind: &UpdateKind) -> usize {
        let typed = match kind {
            UpdateKind::NewMessage => self.messages.len(),
            UpdateKind::EditedMessage => self.edits.len(),
            UpdateKind::InlineQuery => self.inline_queries.len(),
            UpdateKind::CallbackQuery => self.callbacks.len(),
            UpdateKind::ChatAction => self.chat_actions.len(),
            UpdateKind::Raw(_) => 0,
        };
        let raw = self
            .raw
            .snapshot()
            .iter()
            .filter(|h| &h.update_kind == kind)
            .count();
        typed + raw
    }

    /// Runs every matching handler for `update`, in registration order.
    ///
    /// Typed handlers of the update's kind run first, then raw handlers
    /// registered for that kind. Failures are reported to the error sink and
    /// never stop the pass.
    pub async fn dispatch(&self, update: Update) -> DispatchReport {
        let kind = update.kind();
        let mut report = DispatchReport::default();

        match &update {
            Update::NewMessage(message) => {
                self.dispatch_message(&self.messages.snapshot(), message, &kind, &mut report)
                    .await;
            }
            Update::EditedMessage(message) => {
                self.dispatch_message(&self.edits.snapshot(), message, &kind, &mut report)
                    .await;
            }
            Update::InlineQuery(query) => {
                for handle in self.inline_queries.snapshot().iter() {
                    if !handle.pattern.matches_data(&query.query) {
                        continue;
                    }
                    let ctx = self.context(handle.id);
                    let query = query.clone();
                    self.invoke(&mut report, &kind, handle.id, || (handle.callback)(ctx, query))
                        .await;
                }
            }
            Update::CallbackQuery(query) => {
                let data = query.data_str();
                for handle in self.callbacks.snapshot().iter() {
                    if !handle.pattern.matches_data(&data) {
                        continue;
                    }
                    let ctx = self.context(handle.id);
                    let query = query.clone();
                    self.invoke(&mut report, &kind, handle.id, || (handle.callback)(ctx, query))
                        .await;
                }
            }
            Update::ChatAction(action) => {
                for handle in self.chat_actions.snapshot().iter() {
                    let ctx = self.context(handle.id);
                    let action = action.clone();
                    self.invoke(&mut report, &kind, handle.id, || (handle.callback)(ctx, action))
                        .await;
                }
            }
            Update::Raw(_) => {}
        }

        for handle in self.raw.snapshot().iter().filter(|h| h.update_kind == kind) {
            let ctx = self.context(handle.id);
            let update = update.clone();
            self.invoke(&mut report, &kind, handle.id, || (handle.callback)(ctx, update))
                .await;
        }

        debug!(
            "Dispatched {} update: {} matched, {} failed",
            kind, report.matched, report.failed
        );
        report
    }

    /// Dispatches updates from `rx` until the channel closes.
    pub async fn run(&self, mut rx: mpsc::Receiver<Update>) {
        info!("Dispatcher started");

        while let Some(update) = rx.recv().await {
            let report = self.dispatch(update).await;
            if report.failed > 0 {
                warn!("{} of {} handlers failed", report.failed, report.matched);
            }
        }

        info!("Update channel closed, dispatcher stopping");
    }

    /// Runs message-like handlers whose pattern and filters accept `message`.
    async fn dispatch_message<H: MessageHandler>(
        &self,
        handles: &[H],
        message: &Message,
        kind: &UpdateKind,
        report: &mut DispatchReport,
    ) {
        for handle in handles {
            let id = handle.id();
            if !handle.pattern().matches_message(&message.text, &self.prefixes)
                || !self.accepts(handle.filters(), message, id)
            {
                continue;
            }
            let ctx = self.context(id);
            let msg = message.clone();
            self.invoke(report, kind, id, || (handle.callback())(ctx, msg))
                .await;
        }
    }

    fn context(&self, handler_id: HandlerId) -> Context {
        Context::new(handler_id, self.client.clone())
    }

    fn accepts(&self, filters: Option<&Filters>, message: &Message, handler_id: HandlerId) -> bool {
        match filters::evaluate(filters, message, &self.prefixes) {
            FilterOutcome::Matched => true,
            FilterOutcome::Rejected => false,
            FilterOutcome::Failed(reason) => {
                (self.error_sink)(&DispatchError::FilterPanicked {
                    handler_id,
                    message: reason,
                });
                false
            }
        }
    }

    async fn invoke<C, Fut>(
        &self,
        report: &mut DispatchReport,
        kind: &UpdateKind,
        handler_id: HandlerId,
        call: C,
    ) where
        C: FnOnce() -> Fut,
        Fut: Future<Output = HandlerResult>,
    {
        report.matched += 1;
        debug!("Invoking handler {} for {}", handler_id, kind);

        let outcome = AssertUnwindSafe(async move { call().await })
            .catch_unwind()
            .await;

        let err = match outcome {
            Ok(Ok(())) => return,
            Ok(Err(error)) => DispatchError::Handler {
                kind: kind.clone(),
                handler_id,
                error,
            },
            Err(payload) => DispatchError::HandlerPanicked {
                kind: kind.clone(),
                handler_id,
                message: panic_message(payload.as_ref()),
            },
        };

        report.failed += 1;
        (self.error_sink)(&err);
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("prefixes", &self.prefixes)
            .field("messages", &self.messages.len())
            .field("edits", &self.edits.len())
            .field("inline_queries", &self.inline_queries.len())
            .field("callbacks", &self.callbacks.len())
            .field("chat_actions", &self.chat_actions.len())
            .field("raw", &self.raw.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use parking_lot::Mutex;

    use super::*;
    use crate::types::{ChatActionKind, ChatType, RawUpdate};

    fn new_message(chat_id: i64, text: &str) -> Update {
        Update::NewMessage(Message::new(1, chat_id, ChatType::Group, text).from_user(42))
    }

    fn recording_sink() -> (Arc<Mutex<Vec<String>>>, impl Fn(&DispatchError) + Send + Sync) {
        let errors = Arc::new(Mutex::new(Vec::new()));
        let sink_errors = Arc::clone(&errors);
        (errors, move |e: &DispatchError| sink_errors.lock().push(e.to_string()))
    }

    #[tokio::test]
    async fn test_handlers_run_in_registration_order() {
        let dispatcher = Dispatcher::default();
        let order = Arc::new(Mutex::new(Vec::new()));

        for label in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            dispatcher.on_message(Pattern::Any, None, move |_, _| {
                let order = Arc::clone(&order);
                async move {
                    order.lock().push(label);
                    Ok(())
                }
            });
        }

        let report = dispatcher.dispatch(new_message(1, "hi")).await;
        assert_eq!(report, DispatchReport { matched: 3, failed: 0 });
        assert_eq!(*order.lock(), vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_pattern_and_filters_select_handlers() {
        let dispatcher = Dispatcher::default();
        let hits = Arc::new(Mutex::new(Vec::new()));

        let h = Arc::clone(&hits);
        dispatcher.on_message("start", None, move |_, m| {
            let h = Arc::clone(&h);
            async move {
                h.lock().push(format!("start:{}", m.text));
                Ok(())
            }
        });

        let h = Arc::clone(&hits);
        dispatcher.on_message(
            Pattern::Any,
            Some(Filters::new().blacklist_chats([13])),
            move |_, m| {
                let h = Arc::clone(&h);
                async move {
                    h.lock().push(format!("any:{}", m.chat_id));
                    Ok(())
                }
            },
        );

        dispatcher.dispatch(new_message(1, "/start now")).await;
        dispatcher.dispatch(new_message(13, "/start")).await;
        dispatcher.dispatch(new_message(2, "plain")).await;

        assert_eq!(
            *hits.lock(),
            vec!["start:/start now", "any:1", "start:/start", "any:2"]
        );
    }

    async fn failing(_: Context, _: Message) -> HandlerResult {
        Err(anyhow::anyhow!("handler broke"))
    }

    async fn exploding(_: Context, _: Message) -> HandlerResult {
        panic!("handler panicked")
    }

    #[tokio::test]
    async fn test_failure_is_isolated() {
        let (errors, sink) = recording_sink();
        let dispatcher = Dispatcher::default().with_error_sink(sink);
        let ran = Arc::new(AtomicUsize::new(0));

        dispatcher.on_message(Pattern::Any, None, failing);
        dispatcher.on_message(Pattern::Any, None, exploding);
        let r = Arc::clone(&ran);
        dispatcher.on_message(Pattern::Any, None, move |_, _| {
            let r = Arc::clone(&r);
            async move {
                r.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });

        let report = dispatcher.dispatch(new_message(1, "x")).await;
        assert_eq!(report, DispatchReport { matched: 3, failed: 2 });
        assert_eq!(ran.load(Ordering::SeqCst), 1);

        let errors = errors.lock();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("handler broke"));
        assert!(errors[1].contains("handler panicked"));
    }

    #[tokio::test]
    async fn test_filter_panic_reported_as_non_match() {
        let (errors, sink) = recording_sink();
        let dispatcher = Dispatcher::default().with_error_sink(sink);

        dispatcher.on_message(
            Pattern::Any,
            Some(Filters::new().func(|_| panic!("bad predicate"))),
            |_, _| async { Ok(()) },
        );

        let report = dispatcher.dispatch(new_message(1, "x")).await;
        assert_eq!(report.matched, 0);
        assert_eq!(errors.lock().len(), 1);
        assert!(errors.lock()[0].contains("bad predicate"));
    }

    #[tokio::test]
    async fn test_kinds_are_independent() {
        let dispatcher = Dispatcher::default();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let s = Arc::clone(&seen);
        dispatcher.on_message(Pattern::Any, None, move |_, _| {
            let s = Arc::clone(&s);
            async move {
                s.lock().push("message");
                Ok(())
            }
        });
        let s = Arc::clone(&seen);
        dispatcher.on_edited_message(Pattern::Any, None, move |_, _| {
            let s = Arc::clone(&s);
            async move {
                s.lock().push("edit");
                Ok(())
            }
        });
        let s = Arc::clone(&seen);
        dispatcher.on_inline_query("gif ", move |_, _| {
            let s = Arc::clone(&s);
            async move {
                s.lock().push("inline");
                Ok(())
            }
        });
        let s = Arc::clone(&seen);
        dispatcher.on_callback_query("page:", move |_, _| {
            let s = Arc::clone(&s);
            async move {
                s.lock().push("callback");
                Ok(())
            }
        });
        let s = Arc::clone(&seen);
        dispatcher.on_chat_action(move |_, _| {
            let s = Arc::clone(&s);
            async move {
                s.lock().push("action");
                Ok(())
            }
        });

        dispatcher
            .dispatch(Update::InlineQuery(InlineQuery {
                id: 1,
                sender_id: 2,
                query: "gif cats".to_owned(),
                offset: String::new(),
            }))
            .await;
        dispatcher
            .dispatch(Update::CallbackQuery(CallbackQuery {
                id: 1,
                chat_id: 2,
                sender_id: 3,
                message_id: 4,
                data: b"other".to_vec(),
            }))
            .await;
        dispatcher
            .dispatch(Update::ChatAction(ChatAction {
                chat_id: 1,
                user_id: 2,
                kind: ChatActionKind::Joined,
            }))
            .await;
        dispatcher
            .dispatch(Update::EditedMessage(Message::new(1, 1, ChatType::Private, "e")))
            .await;

        assert_eq!(*seen.lock(), vec!["inline", "action", "edit"]);
    }

    #[tokio::test]
    async fn test_raw_handlers_match_by_kind() {
        let dispatcher = Dispatcher::default();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let s = Arc::clone(&seen);
        dispatcher.on_raw(UpdateKind::Raw("updateUserStatus".to_owned()), move |_, u| {
            let s = Arc::clone(&s);
            async move {
                s.lock().push(u.kind().to_string());
                Ok(())
            }
        });
        let s = Arc::clone(&seen);
        dispatcher.on_raw(UpdateKind::NewMessage, move |_, u| {
            let s = Arc::clone(&s);
            async move {
                s.lock().push(u.kind().to_string());
                Ok(())
            }
        });

        dispatcher
            .dispatch(Update::Raw(RawUpdate {
                type_name: "updateUserStatus".to_owned(),
                payload: serde_json::json!({"user_id": 1}),
            }))
            .await;
        dispatcher
            .dispatch(Update::Raw(RawUpdate {
                type_name: "updateReadHistory".to_owned(),
                payload: serde_json::Value::Null,
            }))
            .await;
        dispatcher.dispatch(new_message(1, "x")).await;

        assert_eq!(*seen.lock(), vec!["raw:updateUserStatus", "new_message"]);
    }

    #[tokio::test]
    async fn test_registration_during_dispatch_uses_snapshot() {
        let dispatcher = Arc::new(Dispatcher::default());
        let calls = Arc::new(AtomicUsize::new(0));

        let inner = Arc::clone(&dispatcher);
        let c = Arc::clone(&calls);
        dispatcher.on_message(Pattern::Any, None, move |_, _| {
            let inner = Arc::clone(&inner);
            let c = Arc::clone(&c);
            async move {
                let c2 = Arc::clone(&c);
                inner.on_message(Pattern::Any, None, move |_, _| {
                    let c2 = Arc::clone(&c2);
                    async move {
                        c2.fetch_add(1, Ordering::SeqCst);
                        Ok(())
                    }
                });
                Ok(())
            }
        });

        let first = dispatcher.dispatch(new_message(1, "x")).await;
        assert_eq!(first.matched, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let second = dispatcher.dispatch(new_message(1, "y")).await;
        assert_eq!(second.matched, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_registration_and_dispatch() {
        let dispatcher = Arc::new(Dispatcher::default());

        let registrar = {
            let dispatcher = Arc::clone(&dispatcher);
            tokio::spawn(async move {
                for _ in 0..200 {
                    dispatcher.on_message(Pattern::Any, None, |_, _| async { Ok(()) });
                    tokio::task::yield_now().await;
                }
            })
        };

        let mut last = 0;
        for _ in 0..200 {
            let report = dispatcher.dispatch(new_message(1, "x")).await;
            assert!(report.matched >= last);
            assert_eq!(report.failed, 0);
            last = report.matched;
        }

        registrar.await.unwrap();
        assert_eq!(dispatcher.handler_count(&UpdateKind::NewMessage), 200);
    }

    #[tokio::test]
    async fn test_context_action_uses_client() {
        use crate::action::tests::RecordingClient;
        use crate::types::{InputPeer, SendMessageAction};

        let client = Arc::new(RecordingClient::default());
        let dispatcher = Dispatcher::default().with_client(client.clone());

        dispatcher.on_message("stop", None, |ctx, message| async move {
            let peer = InputPeer::Chat {
                chat_id: message.chat_id,
            };
            anyhow::ensure!(ctx.action(peer).cancel().await, "cancel not confirmed");
            Ok(())
        });

        let report = dispatcher.dispatch(new_message(7, "/stop")).await;
        assert_eq!(report, DispatchReport { matched: 1, failed: 0 });
        assert_eq!(
            *client.calls.lock(),
            vec![(InputPeer::Chat { chat_id: 7 }, SendMessageAction::Cancel)]
        );
    }

    #[tokio::test]
    async fn test_edited_messages_apply_pattern_and_filters() {
        let dispatcher = Dispatcher::default();
        let edits = Arc::new(Mutex::new(Vec::new()));

        let e = Arc::clone(&edits);
        dispatcher.on_edited_message(
            "fix",
            Some(Filters::new().blacklist_chats([13])),
            move |_, m| {
                let e = Arc::clone(&e);
                async move {
                    e.lock().push((m.chat_id, m.text));
                    Ok(())
                }
            },
        );

        let edited = |chat_id: i64, text: &str| {
            Update::EditedMessage(Message::new(1, chat_id, ChatType::Group, text).from_user(42))
        };

        let accepted = dispatcher.dispatch(edited(1, "/fix typo")).await;
        let blacklisted = dispatcher.dispatch(edited(13, "/fix typo")).await;
        let other_command = dispatcher.dispatch(edited(1, "/undo")).await;
        let as_new = dispatcher.dispatch(new_message(1, "/fix typo")).await;

        assert_eq!(accepted.matched, 1);
        assert_eq!(blacklisted.matched, 0);
        assert_eq!(other_command.matched, 0);
        assert_eq!(as_new.matched, 0);
        assert_eq!(*edits.lock(), vec![(1, "/fix typo".to_owned())]);
    }

    #[tokio::test]
    async fn test_remove_handler() {
        let dispatcher = Dispatcher::default();
        let id = dispatcher.on_message(Pattern::Any, None, |_, _| async { Ok(()) });
        dispatcher.on_raw(UpdateKind::NewMessage, |_, _| async { Ok(()) });
        assert_eq!(dispatcher.handler_count(&UpdateKind::NewMessage), 2);

        assert!(dispatcher.remove_handler(id));
        assert!(!dispatcher.remove_handler(id));
        assert_eq!(dispatcher.handler_count(&UpdateKind::NewMessage), 1);
    }

    #[tokio::test]
    async fn test_run_drains_channel() {
        let dispatcher = Arc::new(Dispatcher::default());
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        dispatcher.on_message(Pattern::Any, None, move |_, _| {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });

        let (tx, rx) = mpsc::channel(8);
        let runner = {
            let dispatcher = Arc::clone(&dispatcher);
            tokio::spawn(async move { dispatcher.run(rx).await })
        };

        for i in 0..5 {
            tx.send(new_message(i, "x")).await.unwrap();
        }
        drop(tx);
        runner.await.unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 5);
    }
}
