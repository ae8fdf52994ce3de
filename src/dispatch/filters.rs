//! Message filters.

use std::collections::HashSet;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use super::error::panic_message;
use crate::types::Message;

/// User-supplied message predicate.
pub type FilterFunc = Arc<dyn Fn(&Message) -> bool + Send + Sync>;

/// Result of evaluating [`Filters`] against a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOutcome {
    Matched,
    Rejected,
    /// The predicate panicked; carries the panic message.
    Failed(String),
}

impl FilterOutcome {
    #[must_use]
    pub const fn is_match(&self) -> bool {
        matches!(self, Self::Matched)
    }
}

/// Predicate bundle restricting which messages a handler accepts.
///
/// Every active condition must hold. A flag left `false` and an empty list
/// impose nothing.
#[derive(Clone, Default)]
pub struct Filters {
    pub is_private: bool,
    pub is_group: bool,
    pub is_channel: bool,
    pub is_command: bool,
    pub is_text: bool,
    pub is_media: bool,
    pub outgoing: bool,
    pub incoming: bool,
    pub func: Option<FilterFunc>,
    pub blacklist_chats: HashSet<i64>,
    pub whitelist_chats: HashSet<i64>,
    pub users: HashSet<i64>,
}

impl Filters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn private(mut self) -> Self {
        self.is_private = true;
        self
    }

    #[must_use]
    pub const fn group(mut self) -> Self {
        self.is_group = true;
        self
    }

    #[must_use]
    pub const fn channel(mut self) -> Self {
        self.is_channel = true;
        self
    }

    #[must_use]
    pub const fn command(mut self) -> Self {
        self.is_command = true;
        self
    }

    #[must_use]
    pub const fn text(mut self) -> Self {
        self.is_text = true;
        self
    }

    #[must_use]
    pub const fn media(mut self) -> Self {
        self.is_media = true;
        self
    }

    #[must_use]
    pub const fn outgoing(mut self) -> Self {
        self.outgoing = true;
        self
    }

    #[must_use]
    pub const fn incoming(mut self) -> Self {
        self.incoming = true;
        self
    }

    /// Adds a custom predicate, evaluated after every other condition.
    #[must_use]
    pub fn func<F>(mut self, f: F) -> Self
    where
        F: Fn(&Message) -> bool + Send + Sync + 'static,
    {
        self.func = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn blacklist_chats(mut self, chats: impl IntoIterator<Item = i64>) -> Self {
        self.blacklist_chats.extend(chats);
        self
    }

    #[must_use]
    pub fn whitelist_chats(mut self, chats: impl IntoIterator<Item = i64>) -> Self {
        self.whitelist_chats.extend(chats);
        self
    }

    #[must_use]
    pub fn users(mut self, users: impl IntoIterator<Item = i64>) -> Self {
        self.users.extend(users);
        self
    }

    /// Evaluates the filters against a message.
    ///
    /// Order: blacklist, structural flags, whitelist and users, then `func`.
    #[must_use]
    pub fn evaluate(&self, message: &Message, prefixes: &str) -> FilterOutcome {
        if self.blacklist_chats.contains(&message.chat_id) {
            return FilterOutcome::Rejected;
        }

        if !self.flags_hold(message, prefixes) {
            return FilterOutcome::Rejected;
        }

        if !self.whitelist_chats.is_empty() && !self.whitelist_chats.contains(&message.chat_id) {
            return FilterOutcome::Rejected;
        }

        if !self.users.is_empty()
            && !message
                .sender_id
                .is_some_and(|sender| self.users.contains(&sender))
        {
            return FilterOutcome::Rejected;
        }

        let Some(func) = &self.func else {
            return FilterOutcome::Matched;
        };

        match panic::catch_unwind(AssertUnwindSafe(|| func(message))) {
            Ok(true) => FilterOutcome::Matched,
            Ok(false) => FilterOutcome::Rejected,
            Err(payload) => FilterOutcome::Failed(panic_message(payload.as_ref())),
        }
    }

    /// Boolean view of [`Filters::evaluate`]; a failed predicate is a non-match.
    #[must_use]
    pub fn matches(&self, message: &Message, prefixes: &str) -> bool {
        self.evaluate(message, prefixes).is_match()
    }

    fn flags_hold(&self, m: &Message, prefixes: &str) -> bool {
        (!self.is_private || m.is_private())
            && (!self.is_group || m.is_group())
            && (!self.is_channel || m.is_channel())
            && (!self.is_text || m.is_text())
            && (!self.is_media || m.is_media())
            && (!self.outgoing || m.outgoing)
            && (!self.incoming || !m.outgoing)
            && (!self.is_command || m.is_command(prefixes))
    }
}

/// Evaluates optional filters; a handler without filters accepts everything.
#[must_use]
pub fn evaluate(filters: Option<&Filters>, message: &Message, prefixes: &str) -> FilterOutcome {
    filters.map_or(FilterOutcome::Matched, |f| f.evaluate(message, prefixes))
}

impl fmt::Debug for Filters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filters")
            .field("is_private", &self.is_private)
            .field("is_group", &self.is_group)
            .field("is_channel", &self.is_channel)
            .field("is_command", &self.is_command)
            .field("is_text", &self.is_text)
            .field("is_media", &self.is_media)
            .field("outgoing", &self.outgoing)
            .field("incoming", &self.incoming)
            .field("func", &self.func.as_ref().map(|_| "<fn>"))
            .field("blacklist_chats", &self.blacklist_chats)
            .field("whitelist_chats", &self.whitelist_chats)
            .field("users", &self.users)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::types::{ChatType, MediaKind};

    const PREFIXES: &str = "/!";

    fn sample_messages() -> Vec<Message> {
        vec![
            Message::new(1, 100, ChatType::Private, "hello").from_user(7),
            Message::new(2, -200, ChatType::Group, "/start").from_user(8),
            Message::new(3, -300, ChatType::Channel, "news"),
            Message::new(4, 100, ChatType::Private, "pic")
                .with_media(MediaKind::Photo)
                .as_outgoing(),
            Message::new(5, -200, ChatType::Group, ""),
        ]
    }

    #[test]
    fn test_zero_filters_match_everything() {
        let filters = Filters::default();
        for msg in sample_messages() {
            assert!(filters.matches(&msg, PREFIXES), "message {} rejected", msg.id);
        }
    }

    #[test]
    fn test_missing_filters_match() {
        let msg = Message::new(1, 1, ChatType::Group, "x");
        assert_eq!(evaluate(None, &msg, PREFIXES), FilterOutcome::Matched);
    }

    #[test]
    fn test_blacklist_always_rejects() {
        let filters = Filters::new()
            .blacklist_chats([-200])
            .whitelist_chats([-200])
            .users([8])
            .func(|_| true);
        for msg in sample_messages().iter().filter(|m| m.chat_id == -200) {
            assert!(!filters.matches(msg, PREFIXES));
        }
    }

    #[test]
    fn test_whitelist_excludes_unlisted_chats() {
        let filters = Filters::new().whitelist_chats([100]);
        for msg in sample_messages() {
            assert_eq!(filters.matches(&msg, PREFIXES), msg.chat_id == 100);
        }
    }

    #[test]
    fn test_users_requires_listed_sender() {
        let filters = Filters::new().users([7, 8]);
        let results: Vec<_> = sample_messages()
            .iter()
            .map(|m| filters.matches(m, PREFIXES))
            .collect();
        assert_eq!(results, vec![true, true, false, false, false]);
    }

    #[test]
    fn test_structural_flags() {
        let msgs = sample_messages();
        let ids = |filters: Filters| -> Vec<i32> {
            msgs.iter()
                .filter(|m| filters.matches(m, PREFIXES))
                .map(|m| m.id)
                .collect()
        };

        assert_eq!(ids(Filters::new().private()), vec![1, 4]);
        assert_eq!(ids(Filters::new().group()), vec![2, 5]);
        assert_eq!(ids(Filters::new().channel()), vec![3]);
        assert_eq!(ids(Filters::new().command()), vec![2]);
        assert_eq!(ids(Filters::new().text()), vec![1, 2, 3]);
        assert_eq!(ids(Filters::new().media()), vec![4]);
        assert_eq!(ids(Filters::new().outgoing()), vec![4]);
        assert_eq!(ids(Filters::new().incoming()), vec![1, 2, 3, 5]);
        assert_eq!(ids(Filters::new().private().text()), vec![1]);
    }

    #[test]
    fn test_func_runs_last() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let filters = Filters::new().private().func(move |m| {
            counter.fetch_add(1, Ordering::SeqCst);
            m.text.starts_with('h')
        });

        let results: Vec<_> = sample_messages()
            .iter()
            .map(|m| filters.matches(m, PREFIXES))
            .collect();
        assert_eq!(results, vec![true, false, false, false, false]);
        // Only the two private messages reach the predicate.
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_func_panic_is_failure() {
        let filters = Filters::new().func(|_| panic!("predicate exploded"));
        let msg = Message::new(1, 1, ChatType::Private, "x");
        assert_eq!(
            filters.evaluate(&msg, PREFIXES),
            FilterOutcome::Failed("predicate exploded".to_owned())
        );
        assert!(!filters.matches(&msg, PREFIXES));
    }
}
