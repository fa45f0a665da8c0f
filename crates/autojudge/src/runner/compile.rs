//! Compilation step for grading
//!
//! Builds one submission source file into an executable with the configured
//! compiler command.

use std::io::ErrorKind;
use std::path::Path;
use std::time::Instant;

use tracing::{debug, instrument, warn};

use crate::config::Config;
use crate::process::{BoundedCommand, ExitState, ProcessError, ScratchDir, run_bounded};
use crate::runner::CompileError;
use crate::types::{CompilationResult, CompileFailure};

/// Compile `source` into `output`
///
/// A missing source, a compiler that cannot be started, a compiler timeout
/// and a rejected source are all reported inside the returned
/// [`CompilationResult`]. Only a broken environment (no scratch directory,
/// unwritable output directory) is an error.
#[instrument(skip(config, source), fields(source = %source.display()))]
pub async fn compile(
    config: &Config,
    source: &Path,
    output: &Path,
) -> Result<CompilationResult, CompileError> {
    let started = Instant::now();

    if !tokio::fs::try_exists(source).await.unwrap_or(false) {
        debug!("source file missing");
        return Ok(CompilationResult::failed(
            output.to_path_buf(),
            CompileFailure::SourceNotFound(source.to_path_buf()),
            started.elapsed(),
        ));
    }

    prepare_output(output).await?;

    let scratch = ScratchDir::create(config.scratch_dir.as_deref())?;

    let args = config
        .compiler
        .expand_command(&source.to_string_lossy(), &output.to_string_lossy());
    // C locale keeps diagnostics in plain ASCII quotes
    let mut command = BoundedCommand::new(args)?
        .env("LC_ALL", "C")
        .timeout(config.compile_timeout());
    if let Some(dir) = source.parent() {
        command = command.working_dir(dir);
    }

    let run = run_bounded(&scratch, &command, None).await;
    if let Err(e) = scratch.cleanup() {
        warn!(error = %e, "failed to remove compile scratch directory");
    }

    let run = match run {
        Ok(run) => run,
        Err(ProcessError::SpawnFailed { program, source }) => {
            return Ok(CompilationResult::failed(
                output.to_path_buf(),
                CompileFailure::Toolchain(format!("{program}: {source}")),
                started.elapsed(),
            ));
        }
        Err(e) => return Err(e.into()),
    };

    debug!(state = ?run.state, elapsed = ?run.elapsed, "compilation complete");

    let failure = match run.state {
        ExitState::Exited(0) => {
            if tokio::fs::try_exists(output).await.unwrap_or(false) {
                return Ok(CompilationResult::succeeded(
                    output.to_path_buf(),
                    started.elapsed(),
                ));
            }
            CompileFailure::Toolchain(format!(
                "compiler reported success but wrote no executable at {}",
                output.display()
            ))
        }
        ExitState::TimedOut => {
            remove_stale(output).await?;
            CompileFailure::TimedOut(command.deadline())
        }
        ExitState::Exited(_) | ExitState::Signaled(_) => {
            remove_stale(output).await?;
            CompileFailure::Diagnostic(diagnostic(&run.stdout, &run.stderr, run.state))
        }
    };

    Ok(CompilationResult::failed(
        output.to_path_buf(),
        failure,
        started.elapsed(),
    ))
}

/// Make sure the output directory exists and no old executable is left behind
async fn prepare_output(output: &Path) -> Result<(), CompileError> {
    if let Some(parent) = output.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| CompileError::OutputPath {
                path: parent.to_path_buf(),
                source,
            })?;
    }
    remove_stale(output).await
}

async fn remove_stale(output: &Path) -> Result<(), CompileError> {
    match tokio::fs::remove_file(output).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(source) => Err(CompileError::OutputPath {
            path: output.to_path_buf(),
            source,
        }),
    }
}

/// Combine compiler stdout and stderr into one diagnostic
fn diagnostic(stdout: &[u8], stderr: &[u8], state: ExitState) -> String {
    let stdout = String::from_utf8_lossy(stdout);
    let stderr = String::from_utf8_lossy(stderr);

    let mut text = String::new();
    text.push_str(stdout.trim_end());
    if !text.is_empty() && !stderr.trim_end().is_empty() {
        text.push('\n');
    }
    text.push_str(stderr.trim_end());

    if text.is_empty() {
        text = match state {
            ExitState::Exited(code) => format!("compiler exited with code {code}"),
            ExitState::Signaled(signal) => format!("compiler killed by signal {signal}"),
            ExitState::TimedOut => "compiler timed out".to_string(),
        };
    }
    text
}
