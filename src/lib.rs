//! Spirograph - nested rotating circles tracing a curve
//!
//! Core modules:
//! - `sim`: Deterministic simulation (circle chain, pen tracer, draw scheduler, session)
//! - `settings`: Validated, clamped configuration
//! - `error`: Error types for rejected commands and settings I/O
//! - `web`: Browser binding (wasm32 only)

pub mod error;
pub mod settings;
pub mod sim;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use error::SpiroError;
pub use settings::Settings;
pub use sim::{Frame, Spirograph};

use glam::DVec2;

/// Simulation configuration constants
pub mod consts {
    /// Radius of the root circle (world units)
    pub const ROOT_RADIUS: f32 = 4.0;
    /// Rotation of the root circle per iteration (degrees)
    pub const BASE_STEP_DEGREES: f32 = 1.1;

    /// Circles allocated per chain; only `circle_count` of them are active
    pub const MAX_CIRCLES: usize = 4;
    pub const MIN_CIRCLES: usize = 2;

    /// Radius ratio between a circle and its parent
    pub const MIN_RADIUS_RATIO: f32 = 0.1;
    pub const MAX_RADIUS_RATIO: f32 = 0.9;

    /// Pen offset as a fraction of the last circle's scale
    pub const MIN_PEN_OFFSET: f32 = 0.0;
    pub const MAX_PEN_OFFSET: f32 = 1.0;

    pub const MIN_PEN_WIDTH: f32 = 0.01;
    pub const MAX_PEN_WIDTH: f32 = 1.0;

    /// Pause between scheduler steps (seconds)
    pub const MIN_DELAY_SECONDS: f32 = 0.0;
    pub const MAX_DELAY_SECONDS: f32 = 1.0;

    pub const MAX_ITERATIONS: usize = 20_000;

    /// Iterations per scheduler step grow from MIN to MAX as the curve fills in
    pub const BATCH_SIZE_MIN: usize = 8;
    pub const BATCH_SIZE_MAX: usize = 30;
    /// Scale applied to the iteration count before the sqrt growth term
    pub const BATCH_GROWTH_FACTOR: f32 = 0.1;
}

/// Rotate a vector counter-clockwise by `degrees`.
///
/// The angle is wrapped before conversion so long runs keep full precision
/// in `sin`/`cos`.
#[inline]
pub fn rotate_degrees(v: DVec2, degrees: f64) -> DVec2 {
    DVec2::from_angle(degrees.rem_euclid(360.0).to_radians()).rotate(v)
}

/// Normalized angle in [0, 360) degrees, for display; orientations are unbounded
#[inline]
pub fn normalize_degrees(angle: f64) -> f32 {
    let wrapped = angle.rem_euclid(360.0) as f32;
    // Rounding (rem_euclid or the f32 cast) can land on exactly 360
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotate_quarter_turn() {
        let v = rotate_degrees(DVec2::Y, 90.0);
        assert!((v - DVec2::new(-1.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn test_rotate_preserves_length() {
        let v = DVec2::new(3.0, 4.0);
        let r = rotate_degrees(v, -37.5);
        assert!((r.length() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_rotate_large_angle_wraps() {
        // 22000 degrees = 61 full turns + 40 degrees
        let a = rotate_degrees(DVec2::Y, 22_000.0);
        let b = rotate_degrees(DVec2::Y, 40.0);
        assert!((a - b).length() < 1e-9);
    }

    #[test]
    fn test_normalize_degrees() {
        assert!((normalize_degrees(370.0) - 10.0).abs() < 1e-4);
        assert!((normalize_degrees(-90.0) - 270.0).abs() < 1e-4);
        assert_eq!(normalize_degrees(0.0), 0.0);
        assert_eq!(normalize_degrees(-1e-12), 0.0);
    }
}
