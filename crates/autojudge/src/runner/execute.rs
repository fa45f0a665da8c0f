//! Execution step for grading
//!
//! Runs a compiled submission once on one test case's input.

use std::path::Path;

use tracing::{debug, instrument, warn};

use crate::config::Config;
use crate::process::{BoundedCommand, ExitState, ProcessError, ScratchDir, run_bounded};
use crate::runner::ExecuteError;
use crate::types::ExecutionOutcome;

/// Run `executable` with `input` on stdin under the configured time limit
///
/// The program runs inside a fresh scratch directory which is removed before
/// this function returns. Output of a timed-out or crashed run is dropped.
#[instrument(skip(config, executable, input), fields(executable = %executable.display(), input_len = input.len()))]
pub async fn execute(
    config: &Config,
    executable: &Path,
    input: &[u8],
) -> Result<ExecutionOutcome, ExecuteError> {
    // The child runs inside the scratch directory, so relative paths would break
    let executable = std::path::absolute(executable).map_err(ProcessError::Io)?;

    let scratch = ScratchDir::create(config.scratch_dir.as_deref())?;

    let command = BoundedCommand::new([executable.to_string_lossy()])?
        .timeout(config.time_limit())
        .working_dir(scratch.path());

    let run = run_bounded(&scratch, &command, Some(input)).await;
    if let Err(e) = scratch.cleanup() {
        warn!(error = %e, "failed to remove execution scratch directory");
    }

    let run = match run {
        Ok(run) => run,
        Err(e @ ProcessError::SpawnFailed { .. }) => return Err(ExecuteError::Launch(e)),
        Err(e) => return Err(e.into()),
    };

    let (state, elapsed) = (run.state, run.elapsed);
    let outcome = match state {
        ExitState::Exited(0) => ExecutionOutcome::Completed {
            stdout: run.stdout,
            exit_code: 0,
        },
        ExitState::Exited(code) => ExecutionOutcome::CrashedNonZeroExit {
            exit_code: Some(code),
            signal: None,
        },
        ExitState::Signaled(signal) => ExecutionOutcome::CrashedNonZeroExit {
            exit_code: None,
            signal: Some(signal),
        },
        ExitState::TimedOut => ExecutionOutcome::TimedOut,
    };

    debug!(?state, ?elapsed, "execution complete");

    Ok(outcome)
}
