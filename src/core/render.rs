//! Render frames: what the overlay needs to draw one state
//!
//! Track path always fully drawn (offset 0). Progress and glow start fully
//! hidden (offset = length) and shrink toward 0 as the fraction grows.

use serde::{Deserialize, Serialize};
use crate::CELEBRATION_DURATION_MS;
use crate::core::geometry::{arc_length, build_arc_path, progress_offset};
use crate::types::{ArcPreset, GoalPhase, ProgressOutput, ProgressState};

/// Text shown next to the arc
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Labels {
    /// Whole units of current progress
    pub current: String,
    /// Whole units of target
    pub goal: String,
    /// Whole percent, may exceed 100
    pub percent: String,
}

impl Labels {
    pub fn new(state: ProgressState, prefix: &str) -> Self {
        Self {
            current: format!("{}{}", prefix, state.current.floor()),
            goal: format!("{}{}", prefix, state.target.floor()),
            percent: format!("{}%", state.percent()),
        }
    }
}

/// Everything the overlay needs for one paint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderFrame {
    pub preset: ArcPreset,
    /// SVG `d` shared by track, progress and glow
    pub path: String,
    /// Rotation applied around the center
    pub rotation_deg: f64,
    pub total_length: f64,
    pub track_offset: f64,
    pub progress_offset: f64,
    pub glow_offset: f64,
    /// Clamped [0, 1]
    pub fraction: f64,
    pub labels: Labels,
    pub celebrating: bool,
    /// Length of the flash when `celebrating`, else 0. A settled frame follows it.
    pub celebration_ms: u64,
    /// Animate toward this frame (false on first paint and restore)
    pub animate: bool,
}

impl RenderFrame {
    /// Frame for `state` on the preset's default canvas
    pub fn compute(preset: ArcPreset, state: ProgressState, prefix: &str) -> Self {
        let spec = preset.spec();
        let total_length = arc_length(&spec);
        let fraction = state.fraction();
        let offset = progress_offset(total_length, fraction);

        Self {
            preset,
            path: build_arc_path(&spec).to_svg(),
            rotation_deg: preset.rotation_deg(),
            total_length,
            track_offset: 0.0,
            progress_offset: offset,
            glow_offset: offset,
            fraction,
            labels: Labels::new(state, prefix),
            celebrating: false,
            celebration_ms: 0,
            animate: false,
        }
    }

    /// Frame for an engine update
    pub fn from_output(preset: ArcPreset, output: &ProgressOutput, prefix: &str) -> Self {
        let celebrating = output.phase == GoalPhase::Celebrating;
        Self {
            celebrating,
            celebration_ms: if celebrating { CELEBRATION_DURATION_MS } else { 0 },
            animate: output.animate,
            ..Self::compute(preset, output.state(), prefix)
        }
    }

    /// Labels on a single line: `$40 / $100 (40%)`
    pub fn summary(&self) -> String {
        format!(
            "{} / {} ({})",
            self.labels.current, self.labels.goal, self.labels.percent
        )
    }
}
