//! Bounded process execution
//!
//! This module owns every child process autojudge starts. It provides a
//! single primitive, [`run_bounded`], used by both the compiler invoker and
//! the execution harness: redirect stdio through files in a scratch
//! directory, wait with a deadline, and kill and reap the whole process
//! group when the deadline passes.

use thiserror::Error;

pub use crate::process::bounded::{BoundedOutput, ExitState, run_bounded};
pub use crate::process::command::BoundedCommand;
pub use crate::process::scratch::ScratchDir;

mod bounded;
mod command;
mod scratch;

/// Errors that occur while running a bounded process
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("empty command")]
    EmptyCommand,

    #[error("failed to create scratch directory: {0}")]
    ScratchUnavailable(#[source] std::io::Error),

    #[error("failed to spawn '{program}': {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProcessError {
    /// Whether the error means the grading environment itself is unusable
    pub fn is_environment(&self) -> bool {
        matches!(self, ProcessError::ScratchUnavailable(_))
    }
}
