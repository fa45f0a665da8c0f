//! Task scoring

use tracing::instrument;

use crate::config::Config;
use crate::runner::{JudgeError, run_test_point};
use crate::types::{CompilationResult, Task, TaskResult};

/// Grade every test point of `task` in order
///
/// A failed compilation marks every point as a compile error without
/// running anything.
#[instrument(skip_all, fields(task = %task, test_cases = task.test_cases))]
pub async fn score_task(
    config: &Config,
    task: &Task,
    compilation: &CompilationResult,
) -> Result<TaskResult, JudgeError> {
    if let Some(failure) = &compilation.failure {
        return Ok(TaskResult::compile_failed(failure.clone(), task.test_cases));
    }

    let mut verdicts = Vec::with_capacity(task.test_cases as usize);
    for number in task.test_numbers() {
        let run = run_test_point(config, task, compilation, number).await?;
        verdicts.push(run.verdict);
    }

    Ok(TaskResult {
        verdicts,
        compile_failure: None,
    })
}
