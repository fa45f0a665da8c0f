//! Single test point grading
//!
//! Runs the compiled executable on one test case and classifies the result.

use tracing::{debug, instrument};

use crate::config::Config;
use crate::runner::{ExecuteError, JudgeError, compare_bytes, execute};
use crate::types::{
    CompilationResult, ComparisonResult, ExecutionOutcome, RuntimeFault, Task, Verdict,
};

/// Texts shown when a test point is inspected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    /// Contents of the input file
    pub input: String,

    /// Trimmed program output, if the program completed
    pub actual: Option<String>,

    /// Trimmed expected output, if it could be read
    pub expected: Option<String>,
}

/// Verdict of one test point together with what produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestPointRun {
    pub number: u32,
    pub verdict: Verdict,

    /// Missing when the test point never ran (compile failure, missing data)
    pub transcript: Option<Transcript>,
}

impl TestPointRun {
    fn without_transcript(number: u32, verdict: Verdict) -> Self {
        Self {
            number,
            verdict,
            transcript: None,
        }
    }
}

/// Grade test point `number` of `task`
///
/// Submission misbehaviour and missing test data become verdicts. Only an
/// unusable grading environment is returned as an error.
#[instrument(skip(config, task, compilation), fields(task = %task))]
pub async fn run_test_point(
    config: &Config,
    task: &Task,
    compilation: &CompilationResult,
    number: u32,
) -> Result<TestPointRun, JudgeError> {
    if let Some(failure) = &compilation.failure {
        return Ok(TestPointRun::without_transcript(
            number,
            Verdict::CompileError(failure.clone()),
        ));
    }

    let Some(case) = task.test_case(number) else {
        return Ok(TestPointRun::without_transcript(
            number,
            missing_data(format!("no test data configured for test point {number}")),
        ));
    };

    let input = match tokio::fs::read(&case.input).await {
        Ok(bytes) => bytes,
        Err(e) => {
            return Ok(TestPointRun::without_transcript(
                number,
                missing_data(format!("{}: {e}", case.input.display())),
            ));
        }
    };
    let expected = match tokio::fs::read(&case.expected).await {
        Ok(bytes) => bytes,
        Err(e) => {
            return Ok(TestPointRun::without_transcript(
                number,
                missing_data(format!("{}: {e}", case.expected.display())),
            ));
        }
    };

    let outcome = match execute(config, &compilation.executable, &input).await {
        Ok(outcome) => outcome,
        Err(ExecuteError::Launch(e)) => {
            return Ok(TestPointRun::without_transcript(
                number,
                Verdict::RuntimeError(RuntimeFault::LaunchFailed(e.to_string())),
            ));
        }
        Err(e) => return Err(e.into()),
    };

    let mut actual = None;

    let verdict = match outcome {
        ExecutionOutcome::Completed { stdout, .. } => {
            let verdict = match compare_bytes(&stdout, &expected) {
                ComparisonResult::Match => Verdict::Pass,
                ComparisonResult::Mismatch(reason) => Verdict::OutputMismatch(reason),
            };
            actual = Some(display_text(&stdout));
            verdict
        }
        ExecutionOutcome::TimedOut => Verdict::Timeout,
        ExecutionOutcome::CrashedNonZeroExit {
            signal: Some(signal),
            ..
        } => Verdict::RuntimeError(RuntimeFault::Signaled(signal)),
        ExecutionOutcome::CrashedNonZeroExit { exit_code, .. } => {
            Verdict::RuntimeError(RuntimeFault::NonZeroExit(exit_code.unwrap_or(-1)))
        }
    };

    debug!(number, verdict = %verdict.kind(), "test point graded");

    Ok(TestPointRun {
        number,
        verdict,
        transcript: Some(Transcript {
            input: String::from_utf8_lossy(&input).into_owned(),
            actual,
            expected: Some(display_text(&expected)),
        }),
    })
}

/// Output as shown in a transcript: LF line endings, trimmed
fn display_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .replace("\r\n", "\n")
        .trim()
        .to_string()
}

fn missing_data(message: String) -> Verdict {
    Verdict::RuntimeError(RuntimeFault::MissingTestData(message))
}
