//! Arc geometry: angles → points → SVG arc path → stroke offsets
//!
//! Conventions:
//! - 0° is the 3 o'clock position, angles grow clockwise (SVG y-down)
//! - large-arc flag is 0 for spans up to 180°, 1 beyond
//! - sweep flag is always 1, progress fills clockwise

use crate::types::{ArcPath, ArcSpec, Point};

/// Point at `angle_deg` on the circle around (cx, cy)
pub fn point_on_circle(cx: f64, cy: f64, r: f64, angle_deg: f64) -> Point {
    let theta = angle_deg.to_radians();
    Point {
        x: cx + r * theta.cos(),
        y: cy + r * theta.sin(),
    }
}

/// 0 if the span fits in a half circle, else 1
pub fn large_arc_flag(span_deg: f64) -> u8 {
    if span_deg <= 180.0 {
        0
    } else {
        1
    }
}

/// Clockwise arc from the start angle to the end angle
pub fn build_arc_path(spec: &ArcSpec) -> ArcPath {
    ArcPath {
        start: point_on_circle(spec.center_x, spec.center_y, spec.radius, spec.start_deg),
        end: point_on_circle(spec.center_x, spec.center_y, spec.radius, spec.end_deg),
        radius: spec.radius,
        large_arc: large_arc_flag(spec.span_deg()),
        sweep: 1,
    }
}

/// Length of the drawn arc
pub fn arc_length(spec: &ArcSpec) -> f64 {
    spec.radius * spec.span_deg().abs().to_radians()
}

/// `current / target` clamped into [0, 1]. Cosmetic only.
pub fn render_fraction(current: f64, target: f64) -> f64 {
    if !(target > 0.0) || !current.is_finite() {
        return 0.0;
    }
    (current / target).clamp(0.0, 1.0)
}

/// Hidden portion of a path of `total_length` at `fraction` progress
pub fn progress_offset(total_length: f64, fraction: f64) -> f64 {
    let fraction = if fraction.is_nan() { 0.0 } else { fraction };
    total_length * (1.0 - fraction.clamp(0.0, 1.0))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ArcPreset;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_point_zero_is_three_oclock() {
        let p = point_on_circle(250.0, 250.0, 200.0, 0.0);
        assert!((p.x - 450.0).abs() < EPS);
        assert!((p.y - 250.0).abs() < EPS);
    }

    #[test]
    fn test_point_ninety_is_six_oclock() {
        // Clockwise in y-down space
        let p = point_on_circle(250.0, 250.0, 200.0, 90.0);
        assert!((p.x - 250.0).abs() < EPS);
        assert!((p.y - 450.0).abs() < EPS);
    }

    #[test]
    fn test_large_arc_flag_per_preset() {
        let expected = [
            (ArcPreset::Full, 1),
            (ArcPreset::Semicircle, 0),
            (ArcPreset::WideArc, 1),
            (ArcPreset::Horseshoe, 1),
        ];
        for (preset, flag) in expected {
            let path = build_arc_path(&preset.spec());
            assert_eq!(path.large_arc, flag, "preset {}", preset);
            assert_eq!(path.sweep, 1, "preset {}", preset);
        }
    }

    #[test]
    fn test_large_arc_flag_boundary() {
        assert_eq!(large_arc_flag(0.0), 0);
        assert_eq!(large_arc_flag(179.999), 0);
        assert_eq!(large_arc_flag(180.0), 0);
        assert_eq!(large_arc_flag(180.001), 1);
        assert_eq!(large_arc_flag(359.99), 1);
    }

    #[test]
    fn test_large_arc_flag_arbitrary_spans() {
        for span in 0..=720 {
            let spec = ArcSpec {
                center_x: 0.0,
                center_y: 0.0,
                radius: 10.0,
                start_deg: 37.0,
                end_deg: 37.0 + span as f64,
            };
            let expected = if (span as f64) <= 180.0 { 0 } else { 1 };
            assert_eq!(build_arc_path(&spec).large_arc, expected, "span {}", span);
        }
    }

    #[test]
    fn test_semicircle_path_svg() {
        let path = build_arc_path(&ArcPreset::Semicircle.spec());
        assert!((path.start.x - 50.0).abs() < EPS);
        assert!((path.end.x - 450.0).abs() < EPS);
        assert!((path.end.y - 250.0).abs() < 1e-6);
        assert!(path.to_svg().starts_with("M 50 "));
        assert!(path.to_svg().contains(" A 200 200 0 0 1 "));
    }

    #[test]
    fn test_arc_length() {
        let semi = ArcPreset::Semicircle.spec();
        assert!((arc_length(&semi) - 200.0 * std::f64::consts::PI).abs() < EPS);
    }

    #[test]
    fn test_progress_offset_bounds() {
        assert_eq!(progress_offset(100.0, 0.0), 100.0);
        assert_eq!(progress_offset(100.0, 1.0), 0.0);
        assert!((progress_offset(100.0, 0.25) - 75.0).abs() < EPS);
        assert_eq!(progress_offset(100.0, 1.7), 0.0);
        assert_eq!(progress_offset(100.0, -0.5), 100.0);
        assert_eq!(progress_offset(100.0, f64::NAN), 100.0);
    }

    #[test]
    fn test_render_fraction_clamped() {
        assert!((render_fraction(5.0, 100.0) - 0.05).abs() < EPS);
        assert_eq!(render_fraction(250.0, 100.0), 1.0);
        assert_eq!(render_fraction(-10.0, 100.0), 0.0);
        assert_eq!(render_fraction(10.0, 0.0), 0.0);
    }
}
