//! Spirograph session and render output
//!
//! `Spirograph` is the single owner of settings, chain, pen and scheduler.
//! Hosts mutate it only through its methods; geometry changes are refused
//! while a run holds the chain and trace buffer.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::chain::CircleChain;
use super::pen::PenTracer;
use super::scheduler::{CancelHandle, DrawPhase, DrawScheduler, StepOutcome};
use crate::error::{Result, SpiroError};
use crate::normalize_degrees;
use crate::settings::{Rgba, Settings};

/// A circle as the host should draw it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CircleView {
    pub depth: usize,
    pub center: Vec2,
    /// Absolute rotation in [0, 360) degrees
    pub rotation: f32,
    pub radius: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PenView {
    pub position: Vec2,
    pub width: f32,
    pub color_start: Rgba,
    pub color_end: Rgba,
}

/// Everything a host needs to render one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Active circles, root first
    pub circles: Vec<CircleView>,
    pub pen: PenView,
    /// Revealed part of the traced curve, oldest first
    pub curve: Vec<Vec2>,
    /// Whether construction circles and the pen sprite are shown
    pub construction_visible: bool,
    pub phase: DrawPhase,
    pub current_iteration: usize,
    pub target_iterations: usize,
    /// Host should disable geometry controls and the draw button
    pub controls_locked: bool,
}

#[derive(Debug)]
pub struct Spirograph {
    settings: Settings,
    chain: CircleChain,
    pen: PenTracer,
    scheduler: DrawScheduler,
}

impl Default for Spirograph {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl Spirograph {
    pub fn new(settings: Settings) -> Self {
        Self::with_root(settings, Vec2::ZERO)
    }

    /// Create a session with the root circle centered at `root_position`
    pub fn with_root(settings: Settings, root_position: Vec2) -> Self {
        let settings = settings.validated();
        let chain = CircleChain::build(
            settings.circle_count(),
            settings.radius_ratio(),
            root_position,
        );
        let pen = PenTracer::new(chain.last_index(), settings.pen_offset_ratio());
        Self {
            settings,
            chain,
            pen,
            scheduler: DrawScheduler::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn chain(&self) -> &CircleChain {
        &self.chain
    }

    pub fn pen(&self) -> &PenTracer {
        &self.pen
    }

    pub fn scheduler(&self) -> &DrawScheduler {
        &self.scheduler
    }

    pub fn phase(&self) -> DrawPhase {
        self.scheduler.phase()
    }

    /// True while a run owns the geometry
    pub fn controls_locked(&self) -> bool {
        self.scheduler.is_running()
    }

    fn ensure_idle(&self, field: &'static str) -> Result<()> {
        if self.scheduler.is_running() {
            log::warn!("Rejected {field} change during draw run");
            return Err(SpiroError::RunInProgress { field });
        }
        Ok(())
    }

    /// Rebuild circles from settings and put the pen back on the last one
    fn rebuild_geometry(&mut self) {
        self.chain
            .rebuild(self.settings.circle_count(), self.settings.radius_ratio());
        self.reattach_pen();
    }

    fn reattach_pen(&mut self) {
        self.pen
            .attach(self.chain.last_index(), self.settings.pen_offset_ratio());
    }

    pub fn set_circle_count(&mut self, count: usize) -> Result<()> {
        self.ensure_idle("circle_count")?;
        if self.settings.set_circle_count(count) {
            log::debug!("Circle count -> {}", self.settings.circle_count());
            self.rebuild_geometry();
        }
        Ok(())
    }

    pub fn set_radius_ratio(&mut self, ratio: f32) -> Result<()> {
        self.ensure_idle("radius_ratio")?;
        if self.settings.set_radius_ratio(ratio) {
            log::debug!("Radius ratio -> {:.3}", self.settings.radius_ratio());
            self.rebuild_geometry();
        }
        Ok(())
    }

    pub fn set_pen_offset_ratio(&mut self, offset: f32) -> Result<()> {
        self.ensure_idle("pen_offset_ratio")?;
        if self.settings.set_pen_offset_ratio(offset) {
            log::debug!("Pen offset -> {:.3}", self.settings.pen_offset_ratio());
            self.reattach_pen();
        }
        Ok(())
    }

    /// Applies immediately, even mid-run
    pub fn set_pen_width(&mut self, width: f32) {
        self.settings.set_pen_width(width);
    }

    /// Applies immediately, even mid-run
    pub fn set_pen_colors(&mut self, start: Rgba, end: Rgba) {
        self.settings.set_pen_colors(start, end);
    }

    /// Applies from the next step
    pub fn set_delay_seconds(&mut self, delay: f32) {
        self.settings.set_delay_seconds(delay);
    }

    /// Applies from the next `start`
    pub fn set_target_iterations(&mut self, iterations: usize) {
        self.settings.set_target_iterations(iterations);
    }

    /// Replace all settings at once
    pub fn apply_settings(&mut self, settings: Settings) -> Result<()> {
        self.ensure_idle("settings")?;
        let settings = settings.validated();
        let changes = self.settings.diff(&settings);
        self.settings = settings;
        if !changes.any() {
            return Ok(());
        }
        log::debug!("Applying settings: {changes:?}");
        if changes.geometry {
            self.rebuild_geometry();
        } else if changes.pen {
            self.reattach_pen();
        }
        Ok(())
    }

    /// Begin a run from a freshly built chain and an empty trace buffer
    pub fn start(&mut self) -> Result<()> {
        // An active run keeps its geometry; the scheduler rejects the start
        if !self.scheduler.is_running() {
            self.rebuild_geometry();
        }
        self.scheduler
            .start(self.settings.target_iterations(), &mut self.pen)
    }

    /// Advance one batch
    pub fn step(&mut self) -> StepOutcome {
        self.scheduler.step(
            &mut self.chain,
            &mut self.pen,
            self.settings.delay_seconds(),
        )
    }

    /// Cancel the active run at the next step, keeping what was drawn
    pub fn cancel(&self) {
        self.scheduler.cancel();
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.scheduler.cancel_handle()
    }

    /// Stop any run, clear the curve and rebuild the geometry
    pub fn reset(&mut self) {
        if self.scheduler.is_running() {
            log::info!(
                "Reset during run at {}/{}",
                self.scheduler.current_iteration(),
                self.scheduler.target_iterations()
            );
        }
        self.scheduler.reset();
        self.pen.reset();
        self.rebuild_geometry();
    }

    /// Step until the run ends, ignoring the pacing delay
    pub fn run_to_completion(&mut self) -> StepOutcome {
        loop {
            match self.step() {
                StepOutcome::Continue { .. } => continue,
                outcome => return outcome,
            }
        }
    }

    /// Snapshot for the renderer
    pub fn frame(&self) -> Frame {
        let circles = self
            .chain
            .active()
            .iter()
            .zip(self.chain.active_poses())
            .map(|(circle, pose)| CircleView {
                depth: circle.depth,
                center: pose.position,
                rotation: normalize_degrees(pose.rotation),
                radius: circle.radius,
            })
            .collect();

        let (color_start, color_end) = self.settings.pen_colors();
        Frame {
            circles,
            pen: PenView {
                position: self.pen.position(&self.chain),
                width: self.settings.pen_width(),
                color_start,
                color_end,
            },
            curve: self.pen.curve().to_vec(),
            construction_visible: self.scheduler.construction_visible(),
            phase: self.scheduler.phase(),
            current_iteration: self.scheduler.current_iteration(),
            target_iterations: self.scheduler.target_iterations(),
            controls_locked: self.controls_locked(),
        }
    }
}
