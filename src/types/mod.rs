//! Core types for Goalring

mod state;
mod output;
mod reason;
mod arc;
mod command;
mod event;
mod config;

pub use state::{GoalPhase, ProgressState};
pub use output::ProgressOutput;
pub use reason::ReasonCode;
pub use arc::{ArcPreset, ArcSpec, ArcPath, Point};
pub use command::{Command, CommandName, Sender, ChatMessage};
pub use event::{
    RawEvent, InboundEvent, KIND_FOLLOWER, KIND_SUBSCRIBER, KIND_TIP, KIND_CHEER, KIND_MESSAGE,
};
pub use config::{EventType, GoalConfig, ConfigOverrides, resolve_config};
