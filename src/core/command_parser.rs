//! Command parser: chat line + sender → authorized command
//!
//! Grammar: `<!token> [number]`, token case-insensitive. The number follows the
//! host's leading-prefix rule: `"10abc"` reads as 10, `"abc"` is no number.

use lazy_static::lazy_static;
use regex::Regex;
use crate::types::{ChatMessage, Command, CommandName, Sender};

lazy_static! {
    /// Leading decimal float: sign, digits with optional fraction, optional exponent
    static ref RE_LEADING_FLOAT: Regex = Regex::new(
        r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?"
    ).unwrap();
}

/// Parser for operator chat commands
#[derive(Debug, Default)]
pub struct CommandParser;

impl CommandParser {
    /// Create new parser
    pub fn new() -> Self {
        Self
    }

    /// Parse a chat message. `None` for unauthorized senders, unknown tokens,
    /// and commands missing a usable argument.
    pub fn parse(&self, message: &ChatMessage) -> Option<Command> {
        self.parse_text(&message.text, &message.sender)
    }

    /// Parse raw text from `sender`
    pub fn parse_text(&self, text: &str, sender: &Sender) -> Option<Command> {
        if !sender.is_authorized() {
            tracing::debug!(sender = %sender.name, "ignoring command from unprivileged sender");
            return None;
        }
        self.parse_unchecked(text)
    }

    /// Parse without the authorization check (local operator console)
    pub fn parse_unchecked(&self, text: &str) -> Option<Command> {
        let mut tokens = text.split_whitespace();
        let token = tokens.next()?.to_lowercase();
        let name = CommandName::from_token(&token)?;

        if !name.requires_arg() {
            return Some(Command::new(name, None));
        }

        match tokens.next().and_then(parse_number) {
            Some(arg) => Some(Command::new(name, Some(arg))),
            None => {
                tracing::debug!(command = %token, "dropping command without numeric argument");
                None
            }
        }
    }
}

/// Leading float of `token`, finite values only
pub fn parse_number(token: &str) -> Option<f64> {
    let matched = RE_LEADING_FLOAT.find(token)?;
    matched
        .as_str()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

// =============================================================================
// TESTS
// =============================================================================
