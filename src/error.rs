//! Error types
//!
//! Out-of-range configuration is clamped, not reported. Errors only cover
//! commands that conflict with an active run and host-side settings I/O.

use thiserror::Error;

/// Errors returned by the spirograph session and hosts.
#[derive(Error, Debug)]
pub enum SpiroError {
    /// `start` was called while a run is already in progress.
    #[error("a draw run is already in progress ({current}/{target} iterations)")]
    AlreadyRunning { current: usize, target: usize },

    /// A geometry change was requested while a run owns the chain.
    #[error("cannot change {field} while a draw run is in progress")]
    RunInProgress { field: &'static str },

    /// Settings JSON could not be parsed or produced.
    #[error("invalid settings: {0}")]
    Settings(#[from] serde_json::Error),

    /// Settings file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SpiroError>;
