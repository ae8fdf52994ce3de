//! Command parsing.

use std::fmt;

/// A command such as `/start@my_bot arg1 arg2`, split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// The prefix character that introduced the command.
    pub prefix: char,

    /// Lowercased command name without prefix or mention.
    pub cmd: String,

    /// Bot username after `@`, if the command was addressed to one.
    pub mention: Option<String>,

    /// Everything after the command, trimmed.
    pub args: String,
}

impl Command {
    /// Parses a command from message text.
    ///
    /// `prefixes` lists every character accepted as a command prefix.
    /// Returns `None` if the text is not a command.
    #[must_use]
    pub fn parse(text: &str, prefixes: &str) -> Option<Self> {
        let text = text.trim_start();

        let prefix = text.chars().next()?;
        if !prefixes.contains(prefix) {
            return None;
        }

        let after_prefix = &text[prefix.len_utf8()..];

        let (head, args) = match after_prefix.split_once(char::is_whitespace) {
            Some((head, args)) => (head, args.trim()),
            None => (after_prefix, ""),
        };

        let (cmd, mention) = match head.split_once('@') {
            Some((cmd, mention)) => (cmd, Some(mention).filter(|m| !m.is_empty())),
            None => (head, None),
        };

        if !is_command_name(cmd) {
            return None;
        }

        Some(Self {
            prefix,
            cmd: cmd.to_lowercase(),
            mention: mention.map(str::to_owned),
            args: args.to_owned(),
        })
    }

    /// Whether this command was addressed to `username` or to nobody in particular.
    #[must_use]
    pub fn is_for(&self, username: &str) -> bool {
        self.mention
            .as_deref()
            .is_none_or(|m| m.eq_ignore_ascii_case(username.trim_start_matches('@')))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.prefix, self.cmd)?;
        if let Some(mention) = &self.mention {
            write!(f, "@{mention}")?;
        }
        if !self.args.is_empty() {
            write!(f, " {}", self.args)?;
        }
        Ok(())
    }
}

/// Command names are non-empty runs of letters, digits and underscores.
pub(crate) fn is_command_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_')
}
