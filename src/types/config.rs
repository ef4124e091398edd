//! Goal configuration: typed defaults, host overrides, and resolution

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use crate::core::command_parser::parse_number;
use crate::error::ConfigError;
use crate::types::ArcPreset;
use crate::{DEFAULT_INCREMENT_UNIT, DEFAULT_TARGET, DEFAULT_TITLE};

/// Which inbound event kind drives automatic accumulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Follower,
    #[default]
    Subscriber,
    #[serde(alias = "tip")]
    Donation,
    Cheer,
    /// No automatic handling, commands only
    Custom,
}

/// Resolved goal configuration, immutable for the session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalConfig {
    /// Initial target, always > 0
    pub target: f64,
    /// Initial progress before any persisted value is restored
    pub starting_value: f64,
    /// Amount per follower/subscriber event
    pub increment_unit: f64,
    pub event_type: EventType,
    pub stop_at_goal: bool,
    pub reset_at_goal: bool,
    /// Raise the target by this much when reached; 0 disables
    pub increase_after_goal_by: f64,
    pub enable_chat_commands: bool,
    /// Stable identifier the store key derives from
    pub title: String,
    pub shape: ArcPreset,
    /// Currency symbol or similar shown before label numbers
    pub label_prefix: String,
}

impl Default for GoalConfig {
    fn default() -> Self {
        Self {
            target: DEFAULT_TARGET,
            starting_value: 0.0,
            increment_unit: DEFAULT_INCREMENT_UNIT,
            event_type: EventType::default(),
            stop_at_goal: false,
            reset_at_goal: false,
            increase_after_goal_by: 0.0,
            enable_chat_commands: true,
            title: DEFAULT_TITLE.to_string(),
            shape: ArcPreset::default(),
            label_prefix: String::new(),
        }
    }
}

/// Host field data. Every field optional; unknown fields (colors, fonts) ignored.
///
/// Decoding is per field: a value of the wrong type is logged and treated as
/// absent, so one bad field never discards the rest.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigOverrides {
    pub goal_value: Option<f64>,
    pub starting_value: Option<f64>,
    pub increment_unit: Option<f64>,
    pub event_type: Option<EventType>,
    pub stop_at_goal: Option<bool>,
    pub reset_at_goal: Option<bool>,
    pub increase_after_goal_by: Option<f64>,
    pub enable_chat_commands: Option<bool>,
    pub title: Option<String>,
    pub shape: Option<ArcPreset>,
    pub label_prefix: Option<String>,
}

impl ConfigOverrides {
    /// Parse field data from a JSON string. Only malformed JSON fails.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(json)?;
        Ok(Self::from_value(&value))
    }

    /// Read field data from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Pick known fields out of a field-data object.
    ///
    /// Where the widgets used different names for one field, the first name
    /// listed that holds a usable value wins.
    pub fn from_value(value: &Value) -> Self {
        let Some(fields) = value.as_object() else {
            tracing::warn!("field data is not an object, using defaults");
            return Self::default();
        };

        Self {
            goal_value: number(fields, &["goalValue"]),
            starting_value: number(fields, &["startingProgress", "startingValue"]),
            increment_unit: number(fields, &["incrementUnit", "progressIncrementUnit"]),
            event_type: typed(fields, &["eventType"]),
            stop_at_goal: flag(fields, &["stopAtGoal"]),
            reset_at_goal: flag(fields, &["resetAtGoal"]),
            increase_after_goal_by: number(fields, &["increaseAfterGoalBy"]),
            enable_chat_commands: flag(fields, &["enableChatCommands", "enableCommands"]),
            title: typed(fields, &["title", "titleText"]),
            shape: typed(fields, &["shape", "shapeMode", "styleMode"]),
            label_prefix: typed(fields, &["labelPrefix", "currencySymbol", "currencyPrefix"]),
        }
    }
}

impl<'de> Deserialize<'de> for ConfigOverrides {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

/// First of `names` that decodes as `T`; null counts as absent
fn typed<T: DeserializeOwned>(fields: &Map<String, Value>, names: &[&str]) -> Option<T> {
    names.iter().find_map(|&name| {
        let value = fields.get(name).filter(|v| !v.is_null())?;
        match T::deserialize(value) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                tracing::warn!(field = name, error = %e, "ignoring invalid config field");
                None
            }
        }
    })
}

/// Numbers may arrive as strings; the leading numeric prefix counts
fn number(fields: &Map<String, Value>, names: &[&str]) -> Option<f64> {
    names.iter().find_map(|&name| {
        let parsed = match fields.get(name)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => parse_number(s.trim()),
            Value::Null => return None,
            _ => None,
        };
        if parsed.is_none() {
            tracing::warn!(field = name, "ignoring non-numeric config field");
        }
        parsed
    })
}

/// Booleans may arrive as `"true"`/`"false"`
fn flag(fields: &Map<String, Value>, names: &[&str]) -> Option<bool> {
    names.iter().find_map(|&name| {
        let parsed = match fields.get(name)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
            Value::Null => return None,
            _ => None,
        };
        if parsed.is_none() {
            tracing::warn!(field = name, "ignoring non-boolean config field");
        }
        parsed
    })
}

/// Merge overrides over defaults, coercing anything that would break the engine.
///
/// Never fails: a non-positive or non-finite target becomes 100, a negative
/// starting value or raise step becomes 0, a zero increment becomes 1.
pub fn resolve_config(defaults: &GoalConfig, overrides: &ConfigOverrides) -> GoalConfig {
    let target = overrides.goal_value.unwrap_or(defaults.target);
    let target = if target.is_finite() && target > 0.0 {
        target
    } else {
        tracing::warn!(goal = target, "non-positive goal, using {}", DEFAULT_TARGET);
        DEFAULT_TARGET
    };

    let starting_value = overrides.starting_value.unwrap_or(defaults.starting_value);
    let starting_value = if starting_value.is_finite() && starting_value >= 0.0 {
        starting_value
    } else {
        0.0
    };

    let increment_unit = overrides.increment_unit.unwrap_or(defaults.increment_unit);
    let increment_unit = if increment_unit.is_finite() && increment_unit != 0.0 {
        increment_unit
    } else {
        DEFAULT_INCREMENT_UNIT
    };

    let increase_after_goal_by = overrides
        .increase_after_goal_by
        .unwrap_or(defaults.increase_after_goal_by);
    let increase_after_goal_by = if increase_after_goal_by.is_finite() && increase_after_goal_by > 0.0 {
        increase_after_goal_by
    } else {
        0.0
    };

    let title = overrides
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| defaults.title.clone());

    GoalConfig {
        target,
        starting_value,
        increment_unit,
        event_type: overrides.event_type.unwrap_or(defaults.event_type),
        stop_at_goal: overrides.stop_at_goal.unwrap_or(defaults.stop_at_goal),
        reset_at_goal: overrides.reset_at_goal.unwrap_or(defaults.reset_at_goal),
        increase_after_goal_by,
        enable_chat_commands: overrides
            .enable_chat_commands
            .unwrap_or(defaults.enable_chat_commands),
        title,
        shape: overrides.shape.unwrap_or(defaults.shape),
        label_prefix: overrides
            .label_prefix
            .clone()
            .unwrap_or_else(|| defaults.label_prefix.clone()),
    }
}
