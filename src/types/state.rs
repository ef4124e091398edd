//! Goal phase and progress state definitions

use serde::{Deserialize, Serialize};

/// Phases of a goal session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GoalPhase {
    /// Below target, default
    Accumulating,
    /// Current met or exceeded target after the most recent update
    AtGoal,
    /// Goal-hit flash, reverts on its own
    Celebrating,
}

impl GoalPhase {
    /// Phase implied by the numbers alone (never `Celebrating`)
    pub fn settled(current: f64, target: f64) -> Self {
        if current >= target {
            GoalPhase::AtGoal
        } else {
            GoalPhase::Accumulating
        }
    }

    /// Get ANSI color code for terminal display
    pub fn color_code(&self) -> &'static str {
        match self {
            GoalPhase::Accumulating => "\x1b[36m", // Cyan
            GoalPhase::AtGoal => "\x1b[32m",       // Green
            GoalPhase::Celebrating => "\x1b[35m",  // Magenta
        }
    }

    /// Reset ANSI color
    pub fn color_reset() -> &'static str {
        "\x1b[0m"
    }

    /// Get emoji for phase
    pub fn emoji(&self) -> &'static str {
        match self {
            GoalPhase::Accumulating => "⏳",
            GoalPhase::AtGoal => "🏁",
            GoalPhase::Celebrating => "🎉",
        }
    }
}

impl std::fmt::Display for GoalPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            GoalPhase::Accumulating => "ACCUMULATING",
            GoalPhase::AtGoal => "AT_GOAL",
            GoalPhase::Celebrating => "CELEBRATING",
        };
        write!(f, "{}", name)
    }
}

/// Mutable numbers of a session. `target` stays positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressState {
    pub current: f64,
    pub target: f64,
}

impl ProgressState {
    pub fn new(current: f64, target: f64) -> Self {
        Self { current, target }
    }

    /// `current / target` clamped into [0, 1] for drawing
    pub fn fraction(&self) -> f64 {
        crate::core::geometry::render_fraction(self.current, self.target)
    }

    /// Whole percent of target reached, not clamped (shows over-completion)
    pub fn percent(&self) -> i64 {
        ((self.current / self.target) * 100.0).floor() as i64
    }

    pub fn is_at_goal(&self) -> bool {
        self.current >= self.target
    }
}
