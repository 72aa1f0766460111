//! Draw scheduler
//!
//! Advances the chain and pen in batches. Each `step` runs one batch and
//! returns the delay the host should wait before calling `step` again; the
//! scheduler itself never sleeps. Batches start small so the first turns of
//! the curve animate smoothly, then grow with the square root of progress.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::chain::CircleChain;
use super::pen::PenTracer;
use crate::consts::{BATCH_GROWTH_FACTOR, BATCH_SIZE_MAX, BATCH_SIZE_MIN};
use crate::error::{Result, SpiroError};

/// Scheduler lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DrawPhase {
    /// No run started since the last reset
    #[default]
    Idle,
    /// A run owns the chain and trace buffer
    Running,
    /// Last run reached its target
    Finished,
    /// Last run was cancelled part way
    Cancelled,
}

/// Result of a single `step`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    /// More work remains; wait `delay` before the next step
    Continue { delay: Duration },
    /// Target reached during this step
    Finished,
    /// Cancellation observed; nothing was iterated this step
    Cancelled,
    /// Not running
    Idle,
}

/// Shared cancellation flag, checked once per step
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn clear(&self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Batch size once `current` iterations are done:
/// `clamp(MIN + round(sqrt(current * 0.1)), MIN, MAX)`
pub fn batch_size_for(current: usize) -> usize {
    let delta = (current as f32 * BATCH_GROWTH_FACTOR).sqrt().round() as usize;
    (BATCH_SIZE_MIN + delta).clamp(BATCH_SIZE_MIN, BATCH_SIZE_MAX)
}

#[derive(Debug)]
pub struct DrawScheduler {
    phase: DrawPhase,
    current: usize,
    target: usize,
    batch_size: usize,
    cancel: CancelHandle,
}

impl Default for DrawScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawScheduler {
    pub fn new() -> Self {
        Self {
            phase: DrawPhase::Idle,
            current: 0,
            target: 0,
            batch_size: BATCH_SIZE_MIN,
            cancel: CancelHandle::default(),
        }
    }

    /// Begin a run of `target` iterations. The trace buffer is replaced.
    pub fn start(&mut self, target: usize, tracer: &mut PenTracer) -> Result<()> {
        if self.phase == DrawPhase::Running {
            log::warn!(
                "Start rejected: run in progress at {}/{}",
                self.current,
                self.target
            );
            return Err(SpiroError::AlreadyRunning {
                current: self.current,
                target: self.target,
            });
        }

        tracer.set_capacity(target);
        self.current = 0;
        self.target = target;
        self.batch_size = BATCH_SIZE_MIN;
        self.cancel.clear();
        self.phase = DrawPhase::Running;
        log::info!("Draw started: {} iterations", target);
        Ok(())
    }

    /// Run one batch. `delay_seconds` is read fresh each step so pacing
    /// changes apply mid-run.
    pub fn step(
        &mut self,
        chain: &mut CircleChain,
        tracer: &mut PenTracer,
        delay_seconds: f32,
    ) -> StepOutcome {
        if self.phase != DrawPhase::Running {
            return StepOutcome::Idle;
        }

        if self.cancel.is_cancelled() {
            self.phase = DrawPhase::Cancelled;
            log::info!("Draw cancelled at {}/{}", self.current, self.target);
            return StepOutcome::Cancelled;
        }

        let batch_end = (self.current + self.batch_size).min(self.target);
        for i in self.current..batch_end {
            chain.iterate();
            tracer.store_sample(i, chain);
        }
        self.current = batch_end;
        tracer.reveal_up_to(self.current);
        self.batch_size = batch_size_for(self.current);

        if self.current >= self.target {
            self.phase = DrawPhase::Finished;
            log::info!("Draw finished: {} samples", self.current);
            return StepOutcome::Finished;
        }

        StepOutcome::Continue {
            delay: Duration::from_secs_f32(delay_seconds.max(0.0)),
        }
    }

    /// Request cancellation; takes effect at the start of the next step
    pub fn cancel(&self) {
        if self.phase == DrawPhase::Running {
            log::debug!("Cancellation requested at {}/{}", self.current, self.target);
        }
        self.cancel.cancel();
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Return to Idle, dropping progress counters
    pub fn reset(&mut self) {
        self.phase = DrawPhase::Idle;
        self.current = 0;
        self.target = 0;
        self.batch_size = BATCH_SIZE_MIN;
        self.cancel.clear();
    }

    pub fn phase(&self) -> DrawPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == DrawPhase::Running
    }

    pub fn current_iteration(&self) -> usize {
        self.current
    }

    pub fn target_iterations(&self) -> usize {
        self.target
    }

    /// Iterations the next step will run (before clamping to the target)
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Construction circles and pen sprite are hidden once a run completes
    pub fn construction_visible(&self) -> bool {
        self.phase != DrawPhase::Finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use proptest::prelude::*;

    fn setup() -> (DrawScheduler, CircleChain, PenTracer) {
        let chain = CircleChain::build(2, 0.5, Vec2::ZERO);
        let tracer = PenTracer::new(chain.last_index(), 0.5);
        (DrawScheduler::new(), chain, tracer)
    }

    fn run(
        scheduler: &mut DrawScheduler,
        chain: &mut CircleChain,
        tracer: &mut PenTracer,
    ) -> Vec<usize> {
        let mut batches = Vec::new();
        loop {
            batches.push(scheduler.batch_size());
            match scheduler.step(chain, tracer, 0.0) {
                StepOutcome::Continue { .. } => {}
                _ => break,
            }
        }
        batches
    }

    #[test]
    fn test_batch_size_formula() {
        assert_eq!(batch_size_for(0), 8);
        assert_eq!(batch_size_for(8), 9);
        assert_eq!(batch_size_for(100), 11);
        assert_eq!(batch_size_for(20_000), 30);
    }

    #[test]
    fn test_step_when_idle() {
        let (mut s, mut chain, mut tracer) = setup();
        assert_eq!(s.step(&mut chain, &mut tracer, 0.0), StepOutcome::Idle);
        assert_eq!(s.phase(), DrawPhase::Idle);
    }

    #[test]
    fn test_scenario_four_iterations() {
        let (mut s, mut chain, mut tracer) = setup();
        s.start(4, &mut tracer).unwrap();
        assert_eq!(s.step(&mut chain, &mut tracer, 0.0), StepOutcome::Finished);
        assert!((chain.circle(1).orientation + 8.8).abs() < 1e-4);
        assert!((chain.circle(0).orientation - 4.4).abs() < 1e-4);
        assert_eq!(tracer.drawn_count(), 4);
        assert!(!s.construction_visible());
    }

    #[test]
    fn test_scenario_hundred_iterations() {
        let (mut s, mut chain, mut tracer) = setup();
        s.start(100, &mut tracer).unwrap();
        let batches = run(&mut s, &mut chain, &mut tracer);
        assert_eq!(batches[0], 8);
        assert!(batches.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(s.batch_size(), 11);
        assert_eq!(s.current_iteration(), 100);
        assert_eq!(tracer.drawn_count(), 100);
        assert_eq!(s.phase(), DrawPhase::Finished);
    }

    #[test]
    fn test_zero_target_finishes_immediately() {
        let (mut s, mut chain, mut tracer) = setup();
        s.start(0, &mut tracer).unwrap();
        assert_eq!(s.step(&mut chain, &mut tracer, 0.0), StepOutcome::Finished);
        assert!(tracer.curve().is_empty());
        assert_eq!(chain.circle(0).orientation, 0.0);
    }

    #[test]
    fn test_delay_reported() {
        let (mut s, mut chain, mut tracer) = setup();
        s.start(50, &mut tracer).unwrap();
        let outcome = s.step(&mut chain, &mut tracer, 0.25);
        assert_eq!(
            outcome,
            StepOutcome::Continue {
                delay: Duration::from_millis(250)
            }
        );
    }

    #[test]
    fn test_start_rejected_while_running() {
        let (mut s, mut chain, mut tracer) = setup();
        s.start(100, &mut tracer).unwrap();
        s.step(&mut chain, &mut tracer, 0.0);
        let err = s.start(10, &mut tracer).unwrap_err();
        assert!(matches!(
            err,
            SpiroError::AlreadyRunning { current: 8, target: 100 }
        ));
        // In-flight buffer untouched
        assert_eq!(tracer.capacity(), 100);
        assert_eq!(tracer.drawn_count(), 8);
    }

    #[test]
    fn test_cancel_keeps_prefix() {
        let (mut s, mut chain, mut tracer) = setup();
        s.start(200, &mut tracer).unwrap();
        s.step(&mut chain, &mut tracer, 0.0);
        s.step(&mut chain, &mut tracer, 0.0);
        let done = s.current_iteration();
        let prefix = tracer.curve().to_vec();

        s.cancel_handle().cancel();
        assert_eq!(s.step(&mut chain, &mut tracer, 0.0), StepOutcome::Cancelled);
        assert_eq!(s.phase(), DrawPhase::Cancelled);
        assert_eq!(s.current_iteration(), done);
        assert_eq!(tracer.drawn_count(), done);
        assert_eq!(tracer.curve(), prefix.as_slice());
        assert!(s.construction_visible());
    }

    #[test]
    fn test_restart_after_cancel() {
        let (mut s, mut chain, mut tracer) = setup();
        s.start(200, &mut tracer).unwrap();
        s.step(&mut chain, &mut tracer, 0.0);
        s.cancel();
        s.step(&mut chain, &mut tracer, 0.0);
        s.start(30, &mut tracer).unwrap();
        assert_eq!(tracer.capacity(), 30);
        assert_eq!(tracer.drawn_count(), 0);
        assert_eq!(s.batch_size(), BATCH_SIZE_MIN);
        run(&mut s, &mut chain, &mut tracer);
        assert_eq!(s.phase(), DrawPhase::Finished);
    }

    proptest! {
        #[test]
        fn batch_size_bounded_and_monotonic(a in 0usize..30_000, b in 0usize..30_000) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(batch_size_for(lo) <= batch_size_for(hi));
            prop_assert!((BATCH_SIZE_MIN..=BATCH_SIZE_MAX).contains(&batch_size_for(a)));
        }

        #[test]
        fn run_fills_exactly_target(target in 0usize..600) {
            let (mut s, mut chain, mut tracer) = setup();
            s.start(target, &mut tracer).unwrap();
            run(&mut s, &mut chain, &mut tracer);
            prop_assert_eq!(s.phase(), DrawPhase::Finished);
            prop_assert_eq!(tracer.capacity(), target);
            prop_assert_eq!(tracer.drawn_count(), target);
        }
    }
}
