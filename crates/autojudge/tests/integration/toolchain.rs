//! Grading real C++ sources with the default g++ command

use std::fs;

use autojudge::config::{Config, TaskMetadata};
use autojudge::{CompileFailure, MismatchReason, RuntimeFault, Verdict, discover_tasks};
use tempfile::TempDir;

use super::FIXTURES_PATH;

/// Lay out one task folder holding a fixture source and its test data
fn assignment(fixture: &str, cases: &[(&str, &str)]) -> (TempDir, Config) {
    let root = tempfile::tempdir().unwrap();
    let task_dir = root.path().join("1_task");
    fs::create_dir(&task_dir).unwrap();
    fs::copy(
        format!("{FIXTURES_PATH}/sources/{fixture}"),
        task_dir.join("main.cpp"),
    )
    .unwrap();

    let data = root.path().join("data").join("1_task");
    fs::create_dir_all(&data).unwrap();
    for (n, (input, expected)) in cases.iter().enumerate() {
        fs::write(data.join(format!("{}.in", n + 1)), input).unwrap();
        fs::write(data.join(format!("{}.out", n + 1)), expected).unwrap();
    }

    let mut config = Config::default();
    config.execution.time_limit = 1.0;
    config.tasks.insert(
        "1_task".into(),
        TaskMetadata {
            source: "main.cpp".into(),
            executable: "task".into(),
            test_cases: None,
            inputs: None,
            outputs: None,
        },
    );
    (root, config)
}

async fn grade(fixture: &str, cases: &[(&str, &str)]) -> Vec<Verdict> {
    let (root, config) = assignment(fixture, cases);
    let discovery = discover_tasks(root.path(), &config, &root.path().join("build")).unwrap();
    let judge = autojudge::Judge::new(config);

    let session = judge.run_session(&discovery.tasks).await.unwrap();
    session.get(1).unwrap().verdicts.clone()
}

#[tokio::test]
async fn test_sum_passes() {
    let verdicts = grade("sum.cpp", &[("1 2\n", "3\n"), ("-5 5\n", "0\n")]).await;
    assert_eq!(verdicts, vec![Verdict::Pass, Verdict::Pass]);
}

#[tokio::test]
async fn test_syntax_error_is_compile_error() {
    let verdicts = grade("syntax_error.cpp", &[("", "missing semicolon\n")]).await;

    assert_eq!(verdicts.len(), 1);
    let Verdict::CompileError(failure) = &verdicts[0] else {
        panic!("expected compile error, got {:?}", verdicts[0]);
    };
    let CompileFailure::Diagnostic(text) = failure.as_ref() else {
        panic!("expected compiler diagnostic, got {failure:?}");
    };
    assert!(text.contains("error"));
}

#[tokio::test]
async fn test_infinite_loop_times_out() {
    let verdicts = grade("infinite_loop.cpp", &[("", "")]).await;
    assert_eq!(verdicts, vec![Verdict::Timeout]);
}

#[tokio::test]
async fn test_segfault_is_runtime_error() {
    let verdicts = grade("segfault.cpp", &[("", "")]).await;
    assert!(matches!(
        verdicts[0],
        Verdict::RuntimeError(RuntimeFault::Signaled(_))
    ));
}

#[tokio::test]
async fn test_wrong_last_line() {
    let verdicts = grade("off_by_one.cpp", &[("3\n", "1\n2\n3\n")]).await;
    assert_eq!(
        verdicts,
        vec![Verdict::OutputMismatch(MismatchReason::ContentDiffers {
            lines: vec![3]
        })]
    );
}
