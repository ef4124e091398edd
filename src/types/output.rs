//! Output structures for terminal display and live updates

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use crate::types::{GoalPhase, ProgressState, ReasonCode};

/// Output structure for each engine update
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressOutput {
    /// Timestamp
    pub timestamp: DateTime<Utc>,
    /// Current progress
    pub current: f64,
    /// Current target
    pub target: f64,
    /// Rendered fraction, clamped into [0, 1]
    pub fraction: f64,
    /// Phase right after the update
    pub phase: GoalPhase,
    /// Phase once any celebration has ended
    pub settled: GoalPhase,
    /// Reason for this outcome
    pub reason: ReasonCode,
    /// Was a store write issued?
    pub persisted: bool,
    /// Should the renderer animate toward the new value?
    pub animate: bool,
}

impl ProgressOutput {
    /// Create new output
    pub fn new(
        state: ProgressState,
        phase: GoalPhase,
        reason: ReasonCode,
        persisted: bool,
        animate: bool,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            current: state.current,
            target: state.target,
            fraction: state.fraction(),
            phase,
            settled: GoalPhase::settled(state.current, state.target),
            reason,
            persisted,
            animate,
        }
    }

    /// Numbers as a state value
    pub fn state(&self) -> ProgressState {
        ProgressState::new(self.current, self.target)
    }

    /// Format for terminal display (with colors)
    pub fn to_terminal_string(&self) -> String {
        let color = self.phase.color_code();
        let reset = GoalPhase::color_reset();
        let emoji = self.phase.emoji();

        format!(
            "{}{} {} / {} ({}%) | phase={} | {}{}",
            color,
            emoji,
            self.current,
            self.target,
            self.state().percent(),
            self.phase,
            self.reason.code(),
            reset
        )
    }

    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self) -> String {
        format!(
            "current={} | target={} | fraction={:.4} | phase={} | reason={}",
            self.current,
            self.target,
            self.fraction,
            self.phase,
            self.reason.code()
        )
    }
}
