//! Handler match patterns.

use regex::Regex;

use super::command::{Command, is_command_name};
use super::DispatchError;

/// What a handler's pattern is compared against.
///
/// Resolved once at registration; dispatch only evaluates it.
#[derive(Debug, Clone, Default)]
pub enum Pattern {
    /// A command name (`"start"`, `"/start"`) or an exact text.
    Literal(String),
    /// A compiled regular expression searched in the text.
    Compiled(Regex),
    /// Matches every update.
    #[default]
    Any,
}

impl Pattern {
    /// Compiles a regular expression pattern.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidPattern`] if `expr` does not compile.
    pub fn regex(expr: &str) -> Result<Self, DispatchError> {
        Regex::new(expr)
            .map(Self::Compiled)
            .map_err(|source| DispatchError::InvalidPattern {
                pattern: expr.to_owned(),
                source,
            })
    }

    /// Matches message text.
    ///
    /// A literal that names a command (optionally with one leading prefix)
    /// matches any command text with that name, case-insensitively.
    /// Other literals must equal the text.
    #[must_use]
    pub fn matches_message(&self, text: &str, prefixes: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Compiled(re) => re.is_match(text),
            Self::Literal(literal) => {
                let name = strip_prefix(literal, prefixes);
                if is_command_name(name)
                    && let Some(cmd) = Command::parse(text, prefixes)
                    && cmd.cmd == name.to_lowercase()
                {
                    return true;
                }
                text == literal
            }
        }
    }

    /// Matches inline query text or callback data.
    ///
    /// Literals match by prefix, so `"page:"` accepts `"page:2"`.
    #[must_use]
    pub fn matches_data(&self, data: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Compiled(re) => re.is_match(data),
            Self::Literal(literal) => data.starts_with(literal.as_str()),
        }
    }
}

impl From<&str> for Pattern {
    fn from(s: &str) -> Self {
        Self::Literal(s.to_owned())
    }
}

impl From<String> for Pattern {
    fn from(s: String) -> Self {
        Self::Literal(s)
    }
}

impl From<Regex> for Pattern {
    fn from(re: Regex) -> Self {
        Self::Compiled(re)
    }
}

fn strip_prefix<'a>(literal: &'a str, prefixes: &str) -> &'a str {
    match literal.chars().next() {
        Some(c) if prefixes.contains(c) => &literal[c.len_utf8()..],
        _ => literal,
    }
}
