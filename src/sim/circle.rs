//! A single rotating circle
//!
//! Each circle stores only its local state: rest-pose center, signed angular
//! step and accumulated orientation. Absolute placement is composed by the
//! chain, never stored here.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{BASE_STEP_DEGREES, ROOT_RADIUS};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    /// Position in the chain (root = 0)
    pub depth: usize,
    /// Radius relative to the parent circle (root = 1)
    pub radius_ratio: f32,
    /// Absolute radius (ROOT_RADIUS * ratio^depth)
    pub radius: f32,
    /// Rest-pose center in the chain frame
    pub center: Vec2,
    /// Degrees added to `orientation` per iteration
    pub angular_step: f32,
    /// Accumulated local rotation in degrees (unbounded, f64 so long runs
    /// do not drift)
    pub orientation: f64,
    /// Inactive circles are skipped by iteration and rendering
    pub active: bool,
}

impl Circle {
    /// The fixed outer circle
    pub fn root(center: Vec2) -> Self {
        Self {
            depth: 0,
            radius_ratio: 1.0,
            radius: ROOT_RADIUS,
            center,
            angular_step: BASE_STEP_DEGREES,
            orientation: 0.0,
            active: true,
        }
    }

    /// A nested circle at `depth >= 1`, internally tangent to the root's top
    pub fn nested(depth: usize, radius_ratio: f32, root_center: Vec2) -> Self {
        let ratio = sanitize_ratio(radius_ratio);
        let scale = ratio.powi(depth as i32);
        Self {
            depth,
            radius_ratio: ratio,
            radius: ROOT_RADIUS * scale,
            center: root_center + Vec2::new(0.0, ROOT_RADIUS - ROOT_RADIUS * scale),
            angular_step: step_for_depth(depth, ratio),
            orientation: 0.0,
            active: true,
        }
    }

    /// Advance one simulation iteration
    #[inline]
    pub fn iterate(&mut self) {
        self.orientation += f64::from(self.angular_step);
    }

    /// Scale of this circle relative to the root (ratio^depth)
    #[inline]
    pub fn scale(&self) -> f32 {
        self.radius / ROOT_RADIUS
    }
}

/// Zero or non-finite ratios collapse to 1.0 so radii never vanish
pub fn sanitize_ratio(ratio: f32) -> f32 {
    if ratio == 0.0 || !ratio.is_finite() {
        log::warn!("Degenerate radius ratio {ratio}, using 1.0");
        1.0
    } else {
        ratio
    }
}

/// Signed angular step for a circle at `depth`: even depths turn
/// counter-clockwise, odd depths clockwise, faster as circles shrink.
pub fn step_for_depth(depth: usize, ratio: f32) -> f32 {
    if depth == 0 {
        return BASE_STEP_DEGREES;
    }
    let sign = if depth % 2 == 0 { 1.0 } else { -1.0 };
    sign * (BASE_STEP_DEGREES / ratio.powi(depth as i32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_defaults() {
        let root = Circle::root(Vec2::ZERO);
        assert_eq!(root.angular_step, BASE_STEP_DEGREES);
        assert_eq!(root.radius, ROOT_RADIUS);
        assert_eq!(root.scale(), 1.0);
    }

    #[test]
    fn test_nested_geometry() {
        let c = Circle::nested(2, 0.5, Vec2::ZERO);
        assert!((c.radius - 1.0).abs() < 1e-6);
        assert!((c.center.y - 3.0).abs() < 1e-6);
        assert!((c.angular_step - 4.4).abs() < 1e-5);
    }

    #[test]
    fn test_nested_follows_root_center() {
        let c = Circle::nested(1, 0.5, Vec2::new(10.0, -2.0));
        assert_eq!(c.center, Vec2::new(10.0, 0.0));
    }

    #[test]
    fn test_degenerate_ratio() {
        let c = Circle::nested(1, 0.0, Vec2::ZERO);
        assert_eq!(c.radius_ratio, 1.0);
        assert_eq!(c.radius, ROOT_RADIUS);
        assert_eq!(c.center, Vec2::ZERO);
    }

    #[test]
    fn test_iterate_accumulates() {
        let mut c = Circle::nested(1, 0.5, Vec2::ZERO);
        for _ in 0..4 {
            c.iterate();
        }
        assert!((c.orientation + 8.8).abs() < 1e-4);
    }

    #[test]
    fn test_long_run_does_not_drift() {
        let mut root = Circle::root(Vec2::ZERO);
        for _ in 0..20_000 {
            root.iterate();
        }
        let exact = f64::from(BASE_STEP_DEGREES) * 20_000.0;
        assert!((root.orientation - exact).abs() < 1e-6);
    }

    #[test]
    fn test_step_sign_alternates() {
        assert!(step_for_depth(1, 0.5) < 0.0);
        assert!(step_for_depth(2, 0.5) > 0.0);
        assert!(step_for_depth(3, 0.5) < 0.0);
    }
}
