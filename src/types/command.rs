//! Chat command and sender types

use serde::{Deserialize, Serialize};

/// The five canonical operator operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandName {
    /// `!add <n>` - increment
    Add,
    /// `!subtract <n>` - decrement
    Subtract,
    /// `!set <n>` / `!setprogress <n>` - assign current
    Set,
    /// `!setgoal <n>` - assign target
    SetGoal,
    /// `!resetgoal` - current back to zero
    ResetGoal,
}

impl CommandName {
    /// Does this operation need a numeric argument?
    pub fn requires_arg(&self) -> bool {
        !matches!(self, CommandName::ResetGoal)
    }

    /// Map a lowercased chat token to an operation
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "!add" => Some(CommandName::Add),
            "!subtract" => Some(CommandName::Subtract),
            "!set" | "!setprogress" => Some(CommandName::Set),
            "!setgoal" => Some(CommandName::SetGoal),
            "!resetgoal" => Some(CommandName::ResetGoal),
            _ => None,
        }
    }
}

/// Parsed, authorized command
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub name: CommandName,
    /// Present for every operation except `ResetGoal`
    pub arg: Option<f64>,
}

impl Command {
    pub fn new(name: CommandName, arg: Option<f64>) -> Self {
        Self { name, arg }
    }
}

/// Who sent a chat message
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Sender {
    /// Login of the sender
    pub name: String,
    /// Login of the channel owner (broadcaster)
    pub channel_owner: String,
    /// Moderator badge present
    pub moderator: bool,
}

impl Sender {
    pub fn new(name: impl Into<String>, channel_owner: impl Into<String>, moderator: bool) -> Self {
        Self {
            name: name.into(),
            channel_owner: channel_owner.into(),
            moderator,
        }
    }

    /// Broadcaster or moderator. Logins compare case-insensitively.
    pub fn is_authorized(&self) -> bool {
        self.moderator
            || (!self.name.is_empty() && self.name.eq_ignore_ascii_case(&self.channel_owner))
    }
}

/// Raw chat line plus sender identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
}

impl ChatMessage {
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            sender,
            text: text.into(),
        }
    }
}
