//! Spirograph configuration
//!
//! Every field is clamped to its declared range on assignment. Hosts exchange
//! settings as JSON; out-of-range values in JSON are clamped the same way.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::Result;

/// RGBA color, components in [0, 1]
pub type Rgba = [f32; 4];

/// Which settings changed, so the session knows what to rebuild
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Changes {
    /// Circle count or radius ratio changed: chain must be rebuilt
    pub geometry: bool,
    /// Pen offset changed: pen must be re-attached
    pub pen: bool,
}

impl Changes {
    pub fn any(&self) -> bool {
        self.geometry || self.pen
    }
}

/// Spirograph parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Number of active circles (2-4)
    circle_count: usize,
    /// Radius of each circle relative to its parent (0.1-0.9)
    radius_ratio: f32,
    /// Pen distance from the last circle's center, scaled by its ratio (0-1)
    pen_offset_ratio: f32,
    /// Stroke width of the traced curve
    pen_width: f32,
    /// Curve color at the first sample
    pen_color_start: Rgba,
    /// Curve color at the last sample
    pen_color_end: Rgba,
    /// Pause between scheduler steps (0-1 s)
    delay_seconds: f32,
    /// Iterations per run (0-20000); read when a run starts
    target_iterations: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            circle_count: 3,
            radius_ratio: 0.5,
            pen_offset_ratio: 0.5,
            pen_width: 0.05,
            pen_color_start: [0.2, 0.6, 1.0, 1.0],
            pen_color_end: [1.0, 0.3, 0.6, 1.0],
            delay_seconds: 0.001,
            target_iterations: 12_000,
        }
    }
}

/// Clamp a float to `[min, max]`, replacing NaN/inf with `fallback`
fn clamp_finite(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

/// Color from a host-supplied slice; `None` unless it has exactly 4 components
pub fn rgba_from_slice(components: &[f32]) -> Option<Rgba> {
    Rgba::try_from(components).ok().map(clamp_color)
}

fn clamp_color(color: Rgba) -> Rgba {
    color.map(|c| clamp_finite(c, 0.0, 1.0, 1.0))
}

/// Log when a requested value had to be clamped
fn note_clamped<T: PartialEq + std::fmt::Debug>(field: &str, requested: T, applied: T) {
    if requested != applied {
        log::warn!("{field}: {requested:?} out of range, using {applied:?}");
    }
}

impl Settings {
    /// Parse settings from JSON. Missing fields take defaults, values are clamped.
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        Ok(settings.validated())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Clamp every field to its range
    pub fn validated(mut self) -> Self {
        let raw = self.clone();
        self.set_circle_count(raw.circle_count);
        self.set_radius_ratio(raw.radius_ratio);
        self.set_pen_offset_ratio(raw.pen_offset_ratio);
        self.set_pen_width(raw.pen_width);
        self.set_pen_colors(raw.pen_color_start, raw.pen_color_end);
        self.set_delay_seconds(raw.delay_seconds);
        self.set_target_iterations(raw.target_iterations);
        self
    }

    pub fn circle_count(&self) -> usize {
        self.circle_count
    }

    pub fn radius_ratio(&self) -> f32 {
        self.radius_ratio
    }

    pub fn pen_offset_ratio(&self) -> f32 {
        self.pen_offset_ratio
    }

    pub fn pen_width(&self) -> f32 {
        self.pen_width
    }

    pub fn pen_colors(&self) -> (Rgba, Rgba) {
        (self.pen_color_start, self.pen_color_end)
    }

    pub fn delay_seconds(&self) -> f32 {
        self.delay_seconds
    }

    pub fn target_iterations(&self) -> usize {
        self.target_iterations
    }

    /// Returns true if the value changed
    pub fn set_circle_count(&mut self, count: usize) -> bool {
        let applied = count.clamp(MIN_CIRCLES, MAX_CIRCLES);
        note_clamped("circle_count", count, applied);
        let changed = self.circle_count != applied;
        self.circle_count = applied;
        changed
    }

    /// Returns true if the value changed
    pub fn set_radius_ratio(&mut self, ratio: f32) -> bool {
        let applied = clamp_finite(ratio, MIN_RADIUS_RATIO, MAX_RADIUS_RATIO, 0.5);
        note_clamped("radius_ratio", ratio, applied);
        let changed = self.radius_ratio != applied;
        self.radius_ratio = applied;
        changed
    }

    /// Returns true if the value changed
    pub fn set_pen_offset_ratio(&mut self, offset: f32) -> bool {
        let applied = clamp_finite(offset, MIN_PEN_OFFSET, MAX_PEN_OFFSET, 0.5);
        note_clamped("pen_offset_ratio", offset, applied);
        let changed = self.pen_offset_ratio != applied;
        self.pen_offset_ratio = applied;
        changed
    }

    pub fn set_pen_width(&mut self, width: f32) {
        let applied = clamp_finite(width, MIN_PEN_WIDTH, MAX_PEN_WIDTH, 0.05);
        note_clamped("pen_width", width, applied);
        self.pen_width = applied;
    }

    pub fn set_pen_colors(&mut self, start: Rgba, end: Rgba) {
        self.pen_color_start = clamp_color(start);
        self.pen_color_end = clamp_color(end);
    }

    pub fn set_delay_seconds(&mut self, delay: f32) {
        let applied = clamp_finite(delay, MIN_DELAY_SECONDS, MAX_DELAY_SECONDS, 0.001);
        note_clamped("delay_seconds", delay, applied);
        self.delay_seconds = applied;
    }

    pub fn set_target_iterations(&mut self, iterations: usize) {
        let applied = iterations.min(MAX_ITERATIONS);
        note_clamped("target_iterations", iterations, applied);
        self.target_iterations = applied;
    }

    /// Which geometry-affecting fields differ from `other`
    pub fn diff(&self, other: &Settings) -> Changes {
        Changes {
            geometry: self.circle_count != other.circle_count
                || self.radius_ratio != other.radius_ratio,
            pen: self.pen_offset_ratio != other.pen_offset_ratio,
        }
    }
}
