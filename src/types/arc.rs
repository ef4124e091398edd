//! Arc shapes and path descriptors

use serde::{Deserialize, Serialize};
use crate::{CANVAS_CENTER, CANVAS_RADIUS};

/// The four arc shapes the overlay ships with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArcPreset {
    /// Closed ring, 0 → 359.99
    #[default]
    #[serde(alias = "widget1", alias = "widget2", alias = "circle")]
    Full,
    /// Arch from 9 o'clock over the top to 3 o'clock
    #[serde(alias = "semi", alias = "widget3", alias = "arch")]
    Semicircle,
    /// 270° span centered at the top
    #[serde(alias = "arc75", alias = "widget4", alias = "wide")]
    WideArc,
    /// ~320° span with a gap at the bottom
    #[serde(alias = "openbottom", alias = "open_bottom")]
    Horseshoe,
}

impl ArcPreset {
    pub const ALL: [ArcPreset; 4] = [
        ArcPreset::Full,
        ArcPreset::Semicircle,
        ArcPreset::WideArc,
        ArcPreset::Horseshoe,
    ];

    /// (start, end) in degrees, 0° = 3 o'clock, clockwise positive
    pub fn angles(&self) -> (f64, f64) {
        match self {
            ArcPreset::Full => (0.0, 359.99),
            ArcPreset::Semicircle => (180.0, 360.0),
            ArcPreset::WideArc => (135.0, 405.0),
            ArcPreset::Horseshoe => (110.0, 430.0),
        }
    }

    /// Full rings start drawing at 3 o'clock; the renderer turns them to start at the top
    pub fn rotation_deg(&self) -> f64 {
        match self {
            ArcPreset::Full => -90.0,
            _ => 0.0,
        }
    }

    /// Arc on the default 500x500 canvas
    pub fn spec(&self) -> ArcSpec {
        self.spec_at(CANVAS_CENTER, CANVAS_CENTER, CANVAS_RADIUS)
    }

    /// Arc at a given center and radius
    pub fn spec_at(&self, center_x: f64, center_y: f64, radius: f64) -> ArcSpec {
        let (start_deg, end_deg) = self.angles();
        ArcSpec {
            center_x,
            center_y,
            radius,
            start_deg,
            end_deg,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ArcPreset::Full => "full",
            ArcPreset::Semicircle => "semicircle",
            ArcPreset::WideArc => "wide_arc",
            ArcPreset::Horseshoe => "horseshoe",
        }
    }
}

impl std::fmt::Display for ArcPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ArcPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let quoted = serde_json::Value::String(s.trim().to_ascii_lowercase());
        serde_json::from_value(quoted).map_err(|_| format!("unknown arc shape: {}", s))
    }
}

/// Circle segment to draw
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArcSpec {
    pub center_x: f64,
    pub center_y: f64,
    pub radius: f64,
    pub start_deg: f64,
    pub end_deg: f64,
}

impl ArcSpec {
    /// Angular extent in degrees
    pub fn span_deg(&self) -> f64 {
        self.end_deg - self.start_deg
    }
}

/// Cartesian point in SVG space (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Path descriptor for a single clockwise arc
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArcPath {
    pub start: Point,
    pub end: Point,
    pub radius: f64,
    /// 0 for spans up to 180°, 1 beyond
    pub large_arc: u8,
    /// Always 1: progress advances clockwise
    pub sweep: u8,
}

impl ArcPath {
    /// SVG `d` attribute
    pub fn to_svg(&self) -> String {
        format!(
            "M {} {} A {} {} 0 {} {} {} {}",
            self.start.x,
            self.start.y,
            self.radius,
            self.radius,
            self.large_arc,
            self.sweep,
            self.end.x,
            self.end.y
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_spans() {
        assert!((ArcPreset::Full.spec().span_deg() - 359.99).abs() < 1e-9);
        assert_eq!(ArcPreset::Semicircle.spec().span_deg(), 180.0);
        assert_eq!(ArcPreset::WideArc.spec().span_deg(), 270.0);
        assert_eq!(ArcPreset::Horseshoe.spec().span_deg(), 320.0);
    }

    #[test]
    fn test_preset_parses_host_names() {
        assert_eq!("semi".parse::<ArcPreset>(), Ok(ArcPreset::Semicircle));
        assert_eq!("arc75".parse::<ArcPreset>(), Ok(ArcPreset::WideArc));
        assert_eq!("openbottom".parse::<ArcPreset>(), Ok(ArcPreset::Horseshoe));
        assert_eq!("Widget1".parse::<ArcPreset>(), Ok(ArcPreset::Full));
        assert!("triangle".parse::<ArcPreset>().is_err());
    }
}
