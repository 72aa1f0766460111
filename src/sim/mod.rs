//! Deterministic simulation module
//!
//! All spirograph logic lives here. This module must be pure and deterministic:
//! - One fixed angular step per iteration
//! - Stable iteration order (innermost circle first)
//! - No rendering, timing or platform dependencies; hosts own the clock

pub mod chain;
pub mod circle;
pub mod pen;
pub mod scheduler;
pub mod state;

pub use chain::{CircleChain, Pose};
pub use circle::Circle;
pub use pen::PenTracer;
pub use scheduler::{CancelHandle, DrawPhase, DrawScheduler, StepOutcome, batch_size_for};
pub use state::{CircleView, Frame, PenView, Spirograph};
