use std::path::Path;
use std::time::{Duration, Instant};

use autojudge::config::Config;
use autojudge::runner::execute;
use autojudge::{ExecuteError, ExecutionOutcome};

use super::{entries, install_script};

fn config_in(dir: &Path) -> Config {
    let mut config = Config::empty();
    config.execution.time_limit = 0.5;
    config.scratch_dir = Some(dir.join("scratch"));
    config
}

#[tokio::test]
async fn stdin_is_fed_and_stdout_captured() {
    let dir = tempfile::tempdir().unwrap();
    let exe = install_script(dir.path(), "echo", "cat");

    let outcome = execute(&config_in(dir.path()), &exe, b"hello\nworld\n")
        .await
        .unwrap();

    assert_eq!(
        outcome,
        ExecutionOutcome::Completed {
            stdout: b"hello\nworld\n".to_vec(),
            exit_code: 0
        }
    );
}

#[tokio::test]
async fn exit_one_without_output_is_a_crash() {
    let dir = tempfile::tempdir().unwrap();
    let exe = install_script(dir.path(), "fail", "exit 1");

    let outcome = execute(&config_in(dir.path()), &exe, b"").await.unwrap();

    assert_eq!(
        outcome,
        ExecutionOutcome::CrashedNonZeroExit {
            exit_code: Some(1),
            signal: None
        }
    );
}

#[tokio::test]
async fn stderr_does_not_count_as_output() {
    let dir = tempfile::tempdir().unwrap();
    let exe = install_script(dir.path(), "noisy", "echo warning >&2\necho 42");

    let outcome = execute(&config_in(dir.path()), &exe, b"").await.unwrap();

    assert_eq!(
        outcome,
        ExecutionOutcome::Completed {
            stdout: b"42\n".to_vec(),
            exit_code: 0
        }
    );
}

#[tokio::test]
async fn runs_inside_its_own_scratch_directory() {
    let dir = tempfile::tempdir().unwrap();
    let exe = install_script(dir.path(), "where", "pwd");
    let config = config_in(dir.path());

    let outcome = execute(&config, &exe, b"").await.unwrap();

    let ExecutionOutcome::Completed { stdout, .. } = outcome else {
        panic!("expected completion, got {outcome:?}");
    };
    let cwd = String::from_utf8(stdout).unwrap();
    assert!(Path::new(cwd.trim()).starts_with(dir.path().join("scratch")));
    assert_eq!(entries(&dir.path().join("scratch")), 0);
}

#[tokio::test]
async fn sleeper_is_killed_at_the_deadline() {
    let dir = tempfile::tempdir().unwrap();
    let pid_file = dir.path().join("pid");
    let exe = install_script(
        dir.path(),
        "sleeper",
        &format!("echo $$ > '{}'\nsleep 30", pid_file.display()),
    );
    let config = config_in(dir.path());

    let started = Instant::now();
    let outcome = execute(&config, &exe, b"").await.unwrap();

    assert_eq!(outcome, ExecutionOutcome::TimedOut);
    assert!(started.elapsed() < Duration::from_secs(10));
    assert_eq!(entries(&dir.path().join("scratch")), 0);

    // The shell was reaped, so its pid no longer names a live process
    let pid = std::fs::read_to_string(&pid_file).unwrap();
    assert!(!process_running(pid.trim()));
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn background_children_die_with_the_submission() {
    let dir = tempfile::tempdir().unwrap();
    let child_file = dir.path().join("child");
    let exe = install_script(
        dir.path(),
        "forker",
        &format!("sleep 30 &\necho $! > '{}'\nwait", child_file.display()),
    );

    let outcome = execute(&config_in(dir.path()), &exe, b"").await.unwrap();
    assert_eq!(outcome, ExecutionOutcome::TimedOut);

    let pid = std::fs::read_to_string(&child_file).unwrap();
    let pid = pid.trim();

    // The orphan is reaped by init, which may take a moment
    let deadline = Instant::now() + Duration::from_secs(5);
    while process_running(pid) && Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert!(!process_running(pid));
}

#[tokio::test]
async fn missing_executable_is_a_launch_error() {
    let dir = tempfile::tempdir().unwrap();

    let result = execute(&config_in(dir.path()), &dir.path().join("nope"), b"").await;

    assert!(matches!(result, Err(ExecuteError::Launch(_))));
    assert_eq!(entries(&dir.path().join("scratch")), 0);
}

/// Whether a pid names a process that has not exited
///
/// Zombies count as exited.
fn process_running(pid: &str) -> bool {
    match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
        Ok(stat) => stat
            .rsplit_once(')')
            .and_then(|(_, rest)| rest.split_whitespace().next())
            .is_some_and(|state| state != "Z" && state != "X"),
        Err(_) => false,
    }
}
