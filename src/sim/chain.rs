//! Chain of nested circles
//!
//! Circle `i` is parented to circle `i - 1`. Parenting is explicit: a circle's
//! absolute pose is found by walking from the root outward, rotating each rest
//! offset by the orientations accumulated so far.

use glam::{DVec2, Vec2};
use serde::{Deserialize, Serialize};

use super::circle::{Circle, sanitize_ratio};
use crate::consts::{MAX_CIRCLES, MAX_RADIUS_RATIO, MIN_CIRCLES, MIN_RADIUS_RATIO};
use crate::rotate_degrees;

/// Absolute placement of a circle in the chain frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec2,
    /// Sum of this circle's and all ancestors' orientations (degrees, unbounded)
    pub rotation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircleChain {
    /// Always MAX_CIRCLES long; circles past `active_count` are inactive
    circles: Vec<Circle>,
    active_count: usize,
    radius_ratio: f32,
    root_position: Vec2,
}

impl CircleChain {
    /// Build a chain from scratch. All orientations start at zero.
    /// The ratio is clamped to [MIN_RADIUS_RATIO, MAX_RADIUS_RATIO].
    pub fn build(count: usize, radius_ratio: f32, root_position: Vec2) -> Self {
        let ratio = sanitize_ratio(radius_ratio).clamp(MIN_RADIUS_RATIO, MAX_RADIUS_RATIO);
        let mut circles = Vec::with_capacity(MAX_CIRCLES);
        circles.push(Circle::root(root_position));
        for depth in 1..MAX_CIRCLES {
            circles.push(Circle::nested(depth, ratio, root_position));
        }

        let mut chain = Self {
            circles,
            active_count: MIN_CIRCLES,
            radius_ratio: ratio,
            root_position,
        };
        chain.set_active_count(count);
        log::debug!(
            "Built chain: {} active circles, ratio {:.3}",
            chain.active_count,
            ratio
        );
        chain
    }

    /// Recompute all geometry with new parameters, discarding rotation state
    pub fn rebuild(&mut self, count: usize, radius_ratio: f32) {
        *self = Self::build(count, radius_ratio, self.root_position);
    }

    /// Change how many circles take part without touching geometry
    pub fn set_active_count(&mut self, count: usize) {
        let count = count.clamp(MIN_CIRCLES, MAX_CIRCLES);
        for (i, circle) in self.circles.iter_mut().enumerate() {
            circle.active = i < count;
        }
        self.active_count = count;
    }

    pub fn active_count(&self) -> usize {
        self.active_count
    }

    pub fn radius_ratio(&self) -> f32 {
        self.radius_ratio
    }

    pub fn root_position(&self) -> Vec2 {
        self.root_position
    }

    /// Index of the innermost active circle (where the pen attaches)
    pub fn last_index(&self) -> usize {
        self.active_count - 1
    }

    /// All allocated circles, active or not
    pub fn circles(&self) -> &[Circle] {
        &self.circles
    }

    pub fn active(&self) -> &[Circle] {
        &self.circles[..self.active_count]
    }

    pub fn circle(&self, index: usize) -> &Circle {
        &self.circles[index]
    }

    /// One simulation iteration: innermost circle first, root last
    pub fn iterate(&mut self) {
        for circle in self.circles[..self.active_count].iter_mut().rev() {
            circle.iterate();
        }
    }

    /// Absolute pose of circle `index`, folding in every ancestor.
    /// Each rest offset is rotated by the parent's accumulated rotation
    /// before the child's own orientation is added.
    pub fn pose(&self, index: usize) -> Pose {
        let (position, rotation) = self.fold(index);
        Pose {
            position: position.as_vec2(),
            rotation,
        }
    }

    /// Fold in f64; positions are only narrowed to f32 at the end
    fn fold(&self, index: usize) -> (DVec2, f64) {
        let root = &self.circles[0];
        let mut position = root.center.as_dvec2();
        let mut rotation = root.orientation;

        for pair in self.circles[..=index].windows(2) {
            let (parent, child) = (&pair[0], &pair[1]);
            let offset = (child.center - parent.center).as_dvec2();
            position += rotate_degrees(offset, rotation);
            rotation += child.orientation;
        }

        (position, rotation)
    }

    /// Poses of all active circles, root first
    pub fn active_poses(&self) -> Vec<Pose> {
        (0..self.active_count).map(|i| self.pose(i)).collect()
    }
}
