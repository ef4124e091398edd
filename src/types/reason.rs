//! Reason codes for engine outcomes

use serde::{Deserialize, Serialize};

/// Reason codes for every mutation (or refusal) the engine reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum ReasonCode {
    // =========================================================================
    // R101: Deltas
    // =========================================================================
    /// Delta applied, goal not reached
    R101_DELTA_APPLIED,
    /// Delta ignored, stop-at-goal holds the session at goal
    R101_DELTA_IGNORED_AT_GOAL,

    // =========================================================================
    // R102: Goal-reached branches
    // =========================================================================
    /// Goal reached, target raised by the configured step
    R102_TARGET_RAISED,
    /// Goal reached, progress reset to zero
    R102_RESET_AT_GOAL,
    /// Goal reached, flash only
    R102_GOAL_REACHED,

    // =========================================================================
    // R103: Direct assignments
    // =========================================================================
    /// Current progress assigned
    R103_CURRENT_SET,
    /// Target assigned
    R103_TARGET_SET,
    /// Progress reset to zero
    R103_PROGRESS_RESET,

    // =========================================================================
    // R104: Session
    // =========================================================================
    /// Values replaced by persisted state
    R104_RESTORED,
    /// Read without mutation
    R104_STATE_UNCHANGED,
    /// Goal-hit flash over, settled phase restored
    R104_CELEBRATION_ENDED,
}

impl ReasonCode {
    /// Get the code string (for logging)
    pub fn code(&self) -> &'static str {
        match self {
            Self::R101_DELTA_APPLIED => "R101_DELTA_APPLIED",
            Self::R101_DELTA_IGNORED_AT_GOAL => "R101_DELTA_IGNORED_AT_GOAL",
            Self::R102_TARGET_RAISED => "R102_TARGET_RAISED",
            Self::R102_RESET_AT_GOAL => "R102_RESET_AT_GOAL",
            Self::R102_GOAL_REACHED => "R102_GOAL_REACHED",
            Self::R103_CURRENT_SET => "R103_CURRENT_SET",
            Self::R103_TARGET_SET => "R103_TARGET_SET",
            Self::R103_PROGRESS_RESET => "R103_PROGRESS_RESET",
            Self::R104_RESTORED => "R104_RESTORED",
            Self::R104_STATE_UNCHANGED => "R104_STATE_UNCHANGED",
            Self::R104_CELEBRATION_ENDED => "R104_CELEBRATION_ENDED",
        }
    }

    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::R101_DELTA_APPLIED => "Progress updated",
            Self::R101_DELTA_IGNORED_AT_GOAL => "Holding at goal, delta ignored",
            Self::R102_TARGET_RAISED => "Goal reached - target raised",
            Self::R102_RESET_AT_GOAL => "Goal reached - progress reset",
            Self::R102_GOAL_REACHED => "Goal reached",
            Self::R103_CURRENT_SET => "Progress set",
            Self::R103_TARGET_SET => "Goal set",
            Self::R103_PROGRESS_RESET => "Progress reset",
            Self::R104_RESTORED => "Restored from store",
            Self::R104_STATE_UNCHANGED => "State unchanged",
            Self::R104_CELEBRATION_ENDED => "Celebration ended",
        }
    }

    /// Did this outcome hit one of the goal-reached branches?
    pub fn is_goal_reached(&self) -> bool {
        matches!(
            self,
            Self::R102_TARGET_RAISED | Self::R102_RESET_AT_GOAL | Self::R102_GOAL_REACHED
        )
    }
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.description())
    }
}
