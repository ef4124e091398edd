//! Goalring: goal-progress engine for live stream overlays
//!
//! Events and chat commands → GoalEngine → ProgressStore + arc render frame

pub mod core;
pub mod error;
pub mod types;

// =============================================================================
// GOAL DEFAULTS
// =============================================================================

/// Target used when the configured goal is missing or non-positive
pub const DEFAULT_TARGET: f64 = 100.0;

/// Amount added per follower/subscriber event when not configured
pub const DEFAULT_INCREMENT_UNIT: f64 = 1.0;

/// Stable identifier used for the store key when no title is configured
pub const DEFAULT_TITLE: &str = "goal";

/// How long the goal-hit flash lasts (milliseconds)
pub const CELEBRATION_DURATION_MS: u64 = 1000;

// =============================================================================
// CANVAS - 500x500 view box, 50px padding left for stroke and glow
// =============================================================================

/// View box edge length
pub const CANVAS_SIZE: f64 = 500.0;

/// Arc center (both axes)
pub const CANVAS_CENTER: f64 = 250.0;

/// Arc radius
pub const CANVAS_RADIUS: f64 = 200.0;

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "1.0.0";
