//! Running a command with a deadline

use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use tokio::process::Child;
use tracing::{debug, instrument, warn};

use crate::process::{BoundedCommand, ProcessError, ScratchDir};

const STDIN_FILE: &str = "stdin.txt";
const STDOUT_FILE: &str = "stdout.txt";
const STDERR_FILE: &str = "stderr.txt";

/// How a bounded process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitState {
    /// Exited normally with the given code
    Exited(i32),

    /// Killed by a signal it did not handle
    Signaled(i32),

    /// Still running at the deadline; killed and reaped
    TimedOut,
}

/// Captured result of a bounded process
#[derive(Debug, Clone)]
pub struct BoundedOutput {
    pub state: ExitState,

    /// Standard output; empty when the process timed out
    pub stdout: Vec<u8>,

    /// Standard error; empty when the process timed out
    pub stderr: Vec<u8>,

    /// Wall time from spawn to exit or kill
    pub elapsed: Duration,
}

impl BoundedOutput {
    /// Check if the process exited with code 0
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.state == ExitState::Exited(0)
    }
}

/// Run a command once under its deadline
///
/// The input is written to `stdin.txt` in the scratch directory and the
/// child's stdout and stderr go to `stdout.txt` and `stderr.txt` there.
/// Output of a timed-out process is not read.
#[instrument(skip(scratch, command, stdin_data), fields(program = %command.program()))]
pub async fn run_bounded(
    scratch: &ScratchDir,
    command: &BoundedCommand,
    stdin_data: Option<&[u8]>,
) -> Result<BoundedOutput, ProcessError> {
    let stdin_path = scratch.file_path(STDIN_FILE)?;
    let stdout_path = scratch.file_path(STDOUT_FILE)?;
    let stderr_path = scratch.file_path(STDERR_FILE)?;

    // Always create the stdin file so the child never inherits our terminal
    scratch
        .write_file(STDIN_FILE, stdin_data.unwrap_or_default())
        .await?;

    let stdin = tokio::fs::File::open(&stdin_path).await?.into_std().await;
    let stdout = tokio::fs::File::create(&stdout_path).await?.into_std().await;
    let stderr = tokio::fs::File::create(&stderr_path).await?.into_std().await;

    debug!(args = ?command.build(), deadline = ?command.deadline(), "spawning bounded process");

    let started = Instant::now();
    let mut child = command
        .to_command(Stdio::from(stdin), Stdio::from(stdout), Stdio::from(stderr))
        .spawn()
        .map_err(|source| ProcessError::SpawnFailed {
            program: command.program().to_string(),
            source,
        })?;

    let mut group = GroupGuard::new(&child);

    let status = match tokio::time::timeout(command.deadline(), child.wait()).await {
        Ok(status) => {
            let status = status?;
            group.disarm();
            status
        }
        Err(_) => {
            terminate(&mut child).await?;
            group.disarm();
            let elapsed = started.elapsed();
            debug!(?elapsed, "process killed at deadline");
            return Ok(BoundedOutput {
                state: ExitState::TimedOut,
                stdout: Vec::new(),
                stderr: Vec::new(),
                elapsed,
            });
        }
    };
    let elapsed = started.elapsed();

    let state = exit_state(status);
    let stdout = scratch.read_file(STDOUT_FILE).await?;
    let stderr = scratch.read_file(STDERR_FILE).await?;

    debug!(?state, ?elapsed, stdout_len = stdout.len(), "process finished");

    Ok(BoundedOutput {
        state,
        stdout,
        stderr,
        elapsed,
    })
}

/// Kills the child's process group if the wait is abandoned
///
/// `kill_on_drop` only reaches the group leader, so a cancelled run would
/// otherwise leave the leader's own children behind. Disarm once the leader
/// has been reaped, as its group id may then be reused.
struct GroupGuard {
    pid: Option<u32>,
}

impl GroupGuard {
    fn new(child: &Child) -> Self {
        Self { pid: child.id() }
    }

    fn disarm(&mut self) {
        self.pid = None;
    }
}

impl Drop for GroupGuard {
    fn drop(&mut self) {
        let Some(pid) = self.pid.take() else {
            return;
        };
        debug!(pid, "run abandoned, killing process group");
        #[cfg(unix)]
        kill_process_group(pid);
    }
}

/// Kill the child's process group, then the child itself, and reap it
async fn terminate(child: &mut Child) -> Result<(), ProcessError> {
    #[cfg(unix)]
    if let Some(pid) = child.id() {
        kill_process_group(pid);
    }

    if let Err(e) = child.start_kill() {
        debug!(error = %e, "child already gone");
    }
    child.wait().await?;
    Ok(())
}

#[cfg(unix)]
fn kill_process_group(pid: u32) {
    let Ok(pgid) = libc::pid_t::try_from(pid) else {
        return;
    };

    // SAFETY: killpg only sends a signal. The child was spawned as leader of
    // its own group and has not been reaped yet, so the id is still ours.
    let rc = unsafe { libc::killpg(pgid, libc::SIGKILL) };
    if rc != 0 {
        warn!(
            pgid,
            error = %std::io::Error::last_os_error(),
            "failed to kill process group"
        );
    }
}

fn exit_state(status: ExitStatus) -> ExitState {
    if let Some(code) = status.code() {
        return ExitState::Exited(code);
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return ExitState::Signaled(signal);
        }
    }

    ExitState::Exited(-1)
}
