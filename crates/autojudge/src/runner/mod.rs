//! Judging engine for autojudge
//!
//! Provides the high-level [`Judge`] API: compile a task once, run its test
//! points, score it, and grade a whole session of tasks.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::info;

pub use crate::runner::compare::{compare, compare_bytes};
pub use crate::runner::compile::compile;
pub use crate::runner::execute::execute;
pub use crate::runner::score::score_task;
pub use crate::runner::test_point::{TestPointRun, Transcript, run_test_point};

mod compare;
mod compile;
mod execute;
mod score;
mod session;
mod test_point;

use crate::{
    config::Config,
    process::ProcessError,
    types::{CompilationResult, Task, TaskResult},
};

/// Errors that leave the compiler unusable for every task
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("failed to prepare output path {path}: {source}")]
    OutputPath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("process error: {0}")]
    Process(#[from] ProcessError),
}

/// Errors that occur while executing a compiled submission
#[derive(Debug, Error)]
pub enum ExecuteError {
    /// The executable itself could not be started
    #[error("failed to start executable: {0}")]
    Launch(#[source] ProcessError),

    #[error("process error: {0}")]
    Process(#[from] ProcessError),
}

/// Errors that abort judging
///
/// Everything a submission can cause is reported as a
/// [`Verdict`](crate::types::Verdict); these errors mean the grading
/// environment itself is broken, or the caller asked for something that
/// does not exist.
#[derive(Debug, Error)]
pub enum JudgeError {
    #[error("compilation environment unusable: {0}")]
    Compile(#[from] CompileError),

    #[error("execution environment unusable: {0}")]
    Execute(#[from] ExecuteError),

    #[error("task '{task}' has no test point {number} (it has {count})")]
    NoSuchTestPoint { task: String, number: u32, count: u32 },

    #[error("task scheduling was interrupted")]
    Interrupted,

    #[error("grading task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

type CompileCache = HashMap<PathBuf, Arc<OnceCell<Arc<CompilationResult>>>>;

/// High-level judge for grading tasks
///
/// Cloning is cheap; clones share the configuration and the compilation
/// cache, so every task is compiled at most once per `Judge`.
#[derive(Debug, Clone)]
pub struct Judge {
    config: Arc<Config>,
    compiled: Arc<Mutex<CompileCache>>,
}

impl Judge {
    /// Create a new judge with the given configuration
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            compiled: Arc::default(),
        }
    }

    /// Create a new judge with default configuration
    pub fn with_defaults() -> Self {
        Self::new(Config::default())
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Compile a task, reusing an earlier result for the same task
    pub async fn compile(&self, task: &Task) -> Result<Arc<CompilationResult>, JudgeError> {
        let cell = {
            let mut cache = self.compiled.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(cache.entry(task.executable.clone()).or_default())
        };

        let result = cell
            .get_or_try_init(|| async {
                let result = compile::compile(&self.config, &task.source, &task.executable).await?;
                info!(
                    task = %task,
                    success = result.is_success(),
                    elapsed = ?result.elapsed,
                    "compiled"
                );
                Ok::<_, JudgeError>(Arc::new(result))
            })
            .await?;

        Ok(Arc::clone(result))
    }

    /// Drop the cached compilation of a task so the next call rebuilds it
    pub fn forget(&self, task: &Task) {
        let mut cache = self.compiled.lock().unwrap_or_else(PoisonError::into_inner);
        cache.remove(&task.executable);
    }

    /// Run every test point of a task
    pub async fn score_task(&self, task: &Task) -> Result<TaskResult, JudgeError> {
        let compilation = self.compile(task).await?;
        let result = score::score_task(&self.config, task, &compilation).await?;

        info!(
            task = %task,
            score = result.score(),
            max = result.max_score(),
            passed = result.all_passed(),
            "task graded"
        );

        Ok(result)
    }

    /// Run a single test point and keep its input and outputs for display
    ///
    /// Uses the cached compilation, so calling this after
    /// [`score_task`](Self::score_task) re-runs only the submission.
    pub async fn inspect(&self, task: &Task, number: u32) -> Result<TestPointRun, JudgeError> {
        if number == 0 || number > task.test_cases {
            return Err(JudgeError::NoSuchTestPoint {
                task: task.folder.clone(),
                number,
                count: task.test_cases,
            });
        }

        let compilation = self.compile(task).await?;
        test_point::run_test_point(&self.config, task, &compilation, number).await
    }
}
