//! Inbound host events
//!
//! The host delivers `{kind, payload}` pairs keyed by listener name. They are
//! decoded once, at the edge, into the closed [`InboundEvent`] union so the
//! engine never compares kind strings.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::types::{ChatMessage, Sender};

/// Listener names used by the host
pub const KIND_FOLLOWER: &str = "follower-latest";
pub const KIND_SUBSCRIBER: &str = "subscriber-latest";
pub const KIND_TIP: &str = "tip-latest";
pub const KIND_CHEER: &str = "cheer-latest";
pub const KIND_MESSAGE: &str = "message";

/// Event as the host sends it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    pub kind: String,
    #[serde(default)]
    pub payload: Value,
}

impl RawEvent {
    pub fn new(kind: impl Into<String>, payload: Value) -> Self {
        Self {
            kind: kind.into(),
            payload,
        }
    }
}

/// Decoded inbound event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    Follower,
    Subscriber,
    Tip { amount: f64 },
    Cheer { amount: f64 },
    Message(ChatMessage),
    /// Any listener the overlay does not handle
    Other { kind: String },
}

impl InboundEvent {
    /// Decode a host event. Missing or malformed amounts become 0.
    pub fn decode(raw: &RawEvent) -> Self {
        match raw.kind.as_str() {
            KIND_FOLLOWER => InboundEvent::Follower,
            KIND_SUBSCRIBER => InboundEvent::Subscriber,
            KIND_TIP => InboundEvent::Tip {
                amount: extract_amount(&raw.payload),
            },
            KIND_CHEER => InboundEvent::Cheer {
                amount: extract_amount(&raw.payload),
            },
            KIND_MESSAGE => match extract_message(&raw.payload) {
                Some(message) => InboundEvent::Message(message),
                None => InboundEvent::Other {
                    kind: raw.kind.clone(),
                },
            },
            other => InboundEvent::Other {
                kind: other.to_string(),
            },
        }
    }

    /// Listener name this event came from
    pub fn kind(&self) -> &str {
        match self {
            InboundEvent::Follower => KIND_FOLLOWER,
            InboundEvent::Subscriber => KIND_SUBSCRIBER,
            InboundEvent::Tip { .. } => KIND_TIP,
            InboundEvent::Cheer { .. } => KIND_CHEER,
            InboundEvent::Message(_) => KIND_MESSAGE,
            InboundEvent::Other { kind } => kind,
        }
    }
}

impl From<RawEvent> for InboundEvent {
    fn from(raw: RawEvent) -> Self {
        InboundEvent::decode(&raw)
    }
}

/// `payload.amount` as a finite number, else 0
fn extract_amount(payload: &Value) -> f64 {
    let amount = match payload.get("amount") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    amount.filter(|a| a.is_finite()).unwrap_or(0.0)
}

/// Chat data lives either directly in the payload or under `data`
fn extract_message(payload: &Value) -> Option<ChatMessage> {
    let data = payload.get("data").unwrap_or(payload);
    let text = data.get("text")?.as_str()?;

    let name = string_field(data, "nick")
        .or_else(|| string_field(data, "displayName"))
        .unwrap_or_default();
    let channel_owner = string_field(data, "channel").unwrap_or_default();
    let moderator = data
        .get("tags")
        .and_then(|tags| tags.get("mod"))
        .map(is_truthy)
        .unwrap_or(false);

    Some(ChatMessage::new(
        Sender::new(name, channel_owner, moderator),
        text,
    ))
}

fn string_field(data: &Value, field: &str) -> Option<String> {
    data.get(field).and_then(Value::as_str).map(str::to_string)
}

/// Tag values arrive as "1", 1 or true
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|v| v != 0.0).unwrap_or(false),
        Value::String(s) => s == "1" || s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}
