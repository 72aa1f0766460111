//! Pen point and trace buffer
//!
//! The pen is rigidly offset from one circle of the chain. During a run the
//! buffer holds one sample per iteration; only the leading `drawn_count`
//! samples are handed to the renderer.

use glam::{DVec2, Vec2};

use super::chain::CircleChain;
use crate::consts::MAX_CIRCLES;
use crate::rotate_degrees;

#[derive(Debug, Clone, Default)]
pub struct PenTracer {
    /// Circle the pen is attached to
    attached_to: usize,
    /// Fraction of the attached circle's scale, along its local up axis
    offset_ratio: f32,
    positions: Vec<Vec2>,
    drawn_count: usize,
}

impl PenTracer {
    pub fn new(attached_to: usize, offset_ratio: f32) -> Self {
        Self {
            attached_to,
            offset_ratio,
            positions: Vec::new(),
            drawn_count: 0,
        }
    }

    /// Replace the trace buffer with `n` empty samples
    pub fn set_capacity(&mut self, n: usize) {
        self.positions = vec![Vec2::ZERO; n];
        self.drawn_count = 0;
    }

    /// Move the pen onto circle `index`
    pub fn attach(&mut self, index: usize, offset_ratio: f32) {
        debug_assert!(
            index < MAX_CIRCLES,
            "pen attached to circle {index}, chain has {MAX_CIRCLES}"
        );
        self.attached_to = index;
        self.offset_ratio = offset_ratio;
    }

    pub fn attached_to(&self) -> usize {
        self.attached_to
    }

    pub fn offset_ratio(&self) -> f32 {
        self.offset_ratio
    }

    /// Current absolute pen position
    pub fn position(&self, chain: &CircleChain) -> Vec2 {
        let pose = chain.pose(self.attached_to);
        let scale = chain.circle(self.attached_to).scale();
        let local = DVec2::new(0.0, f64::from(self.offset_ratio * scale));
        pose.position + rotate_degrees(local, pose.rotation).as_vec2()
    }

    /// Record the pen position as sample `index`.
    ///
    /// Panics if `index` is past the capacity set for this run.
    pub fn store_sample(&mut self, index: usize, chain: &CircleChain) {
        let capacity = self.positions.len();
        assert!(
            index < capacity,
            "trace sample {index} out of range (capacity {capacity})"
        );
        self.positions[index] = self.position(chain);
    }

    /// Expose the first `count` samples (capped at capacity)
    pub fn reveal_up_to(&mut self, count: usize) {
        self.drawn_count = count.min(self.positions.len());
    }

    /// Drop the buffer entirely
    pub fn reset(&mut self) {
        self.positions = Vec::new();
        self.drawn_count = 0;
    }

    pub fn capacity(&self) -> usize {
        self.positions.len()
    }

    pub fn drawn_count(&self) -> usize {
        self.drawn_count
    }

    /// The revealed curve, oldest sample first
    pub fn curve(&self) -> &[Vec2] {
        &self.positions[..self.drawn_count]
    }
}
