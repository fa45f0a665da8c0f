use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Score awarded for a passing test point
pub const POINT_SCORE: u32 = 10;

/// A gradable task, resolved from an `<index>_<name>` folder and its metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Display index (the leading integer of the folder name)
    pub index: u32,

    /// Name part of the folder (after the first underscore)
    pub name: String,

    /// Full folder name, used as the key for per-task metadata
    pub folder: String,

    /// Absolute path to the single source file
    pub source: PathBuf,

    /// Absolute path where the compiled executable is written
    pub executable: PathBuf,

    /// Directory holding the task's input and expected-output files
    pub data_dir: PathBuf,

    /// Input file names, test case `n` uses entry `n - 1`
    pub inputs: Vec<String>,

    /// Expected-output file names, test case `n` uses entry `n - 1`
    pub outputs: Vec<String>,

    /// Number of test cases
    pub test_cases: u32,
}

impl Task {
    /// Resolve the files for test case `number` (1-based)
    ///
    /// Returns `None` if the number is zero or the name lists have no entry
    /// for it. Whether the files exist is checked by the caller.
    pub fn test_case(&self, number: u32) -> Option<TestCase> {
        let slot = usize::try_from(number.checked_sub(1)?).ok()?;
        let input = self.inputs.get(slot)?;
        let expected = self.outputs.get(slot)?;

        Some(TestCase {
            number,
            input: self.data_dir.join(input),
            expected: self.data_dir.join(expected),
        })
    }

    /// Test case numbers in grading order
    pub fn test_numbers(&self) -> std::ops::RangeInclusive<u32> {
        1..=self.test_cases
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.folder)
    }
}

/// One (input, expected output) pair of a task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    /// 1-based sequence number
    pub number: u32,
    pub input: PathBuf,
    pub expected: PathBuf,
}

/// Result of compiling a task's source
#[derive(Debug, Clone)]
pub struct CompilationResult {
    /// Where the executable was (or would have been) written
    pub executable: PathBuf,

    /// Why compilation failed, shared with every verdict it produces
    pub failure: Option<Arc<CompileFailure>>,

    /// Wall time spent in the compiler
    pub elapsed: Duration,
}

impl CompilationResult {
    pub fn succeeded(executable: PathBuf, elapsed: Duration) -> Self {
        Self {
            executable,
            failure: None,
            elapsed,
        }
    }

    pub fn failed(executable: PathBuf, failure: CompileFailure, elapsed: Duration) -> Self {
        Self {
            executable,
            failure: Some(Arc::new(failure)),
            elapsed,
        }
    }

    /// Check if compilation produced a usable executable
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Raw compiler diagnostic, if the compiler rejected the source
    pub fn diagnostic(&self) -> Option<&str> {
        self.failure.as_deref().and_then(CompileFailure::diagnostic)
    }
}

/// Reason a task could not be compiled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileFailure {
    /// The compiler ran and rejected the source
    Diagnostic(String),

    /// The source file does not exist
    SourceNotFound(PathBuf),

    /// The compiler could not be launched
    Toolchain(String),

    /// The compiler did not finish in time
    TimedOut(Duration),
}

impl CompileFailure {
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            CompileFailure::Diagnostic(text) => Some(text),
            _ => None,
        }
    }

    /// Whether the failure is caused by the grading setup rather than the submission
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            CompileFailure::SourceNotFound(_) | CompileFailure::Toolchain(_)
        )
    }
}

impl fmt::Display for CompileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileFailure::Diagnostic(text) => f.write_str(text),
            CompileFailure::SourceNotFound(path) => {
                write!(f, "source not found: {}", path.display())
            }
            CompileFailure::Toolchain(message) => {
                write!(f, "compiler could not be started: {message}")
            }
            CompileFailure::TimedOut(limit) => {
                write!(f, "compilation timed out after {:.1}s", limit.as_secs_f64())
            }
        }
    }
}

/// Outcome of running an executable on one test case
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// Program exited with code 0
    Completed { stdout: Vec<u8>, exit_code: i32 },

    /// Program exceeded the wall-clock limit and was killed
    TimedOut,

    /// Program exited with a non-zero code or was killed by a signal
    CrashedNonZeroExit {
        exit_code: Option<i32>,
        signal: Option<i32>,
    },
}

/// Result of comparing actual output with expected output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComparisonResult {
    Match,
    Mismatch(MismatchReason),
}

impl ComparisonResult {
    #[must_use]
    pub fn is_match(&self) -> bool {
        matches!(self, ComparisonResult::Match)
    }
}

/// Why two outputs differ
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MismatchReason {
    /// Outputs have a different number of lines
    LineCountDiffers { actual: usize, expected: usize },

    /// Same number of lines; 1-based numbers of every differing line
    ContentDiffers { lines: Vec<usize> },
}

impl MismatchReason {
    /// Short machine-friendly label
    pub fn label(&self) -> &'static str {
        match self {
            MismatchReason::LineCountDiffers { .. } => "line count differs",
            MismatchReason::ContentDiffers { .. } => "content differs",
        }
    }
}

impl fmt::Display for MismatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MismatchReason::LineCountDiffers { actual, expected } => write!(
                f,
                "line count differs: your output has {actual} lines, expected output has {expected} lines"
            ),
            MismatchReason::ContentDiffers { lines } if lines.is_empty() => {
                f.write_str("content differs: lines differ only in trailing whitespace")
            }
            MismatchReason::ContentDiffers { lines } => {
                let joined = lines
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "content differs at lines {joined}")
            }
        }
    }
}

/// Cause of a runtime-class verdict
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeFault {
    /// Program exited with a non-zero code
    NonZeroExit(i32),

    /// Program was killed by a signal
    Signaled(i32),

    /// The compiled executable could not be started
    LaunchFailed(String),

    /// Input or expected-output file is missing or unreadable
    MissingTestData(String),
}

impl RuntimeFault {
    /// Whether the fault comes from the grading setup rather than the submission
    pub fn is_configuration(&self) -> bool {
        matches!(self, RuntimeFault::MissingTestData(_))
    }
}

impl fmt::Display for RuntimeFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeFault::NonZeroExit(code) => write!(f, "exit code {code}"),
            RuntimeFault::Signaled(signal) => write!(f, "killed by signal {signal}"),
            RuntimeFault::LaunchFailed(message) => {
                write!(f, "executable could not be started: {message}")
            }
            RuntimeFault::MissingTestData(message) => {
                write!(f, "test data problem: {message}")
            }
        }
    }
}

/// Classified outcome of one test point
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    CompileError(Arc<CompileFailure>),
    Timeout,
    RuntimeError(RuntimeFault),
    OutputMismatch(MismatchReason),
}

impl Verdict {
    /// Points awarded for this verdict
    pub fn score(&self) -> u32 {
        match self {
            Verdict::Pass => POINT_SCORE,
            _ => 0,
        }
    }

    #[must_use]
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }

    /// Short name of the verdict kind
    pub fn kind(&self) -> &'static str {
        match self {
            Verdict::Pass => "pass",
            Verdict::CompileError(failure) if failure.is_configuration() => "configuration error",
            Verdict::CompileError(_) => "compile error",
            Verdict::Timeout => "timeout",
            Verdict::RuntimeError(fault) if fault.is_configuration() => "configuration error",
            Verdict::RuntimeError(_) => "runtime error",
            Verdict::OutputMismatch(_) => "output mismatch",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass => f.write_str("pass"),
            Verdict::CompileError(failure) => write!(f, "{}: {failure}", self.kind()),
            Verdict::Timeout => f.write_str("timeout"),
            Verdict::RuntimeError(fault) => write!(f, "{}: {fault}", self.kind()),
            Verdict::OutputMismatch(reason) => write!(f, "output mismatch: {reason}"),
        }
    }
}

/// Verdicts of every test point of one task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskResult {
    /// Verdict of test point `n` is at position `n - 1`
    pub verdicts: Vec<Verdict>,

    /// Set when the task did not compile
    pub compile_failure: Option<Arc<CompileFailure>>,
}

impl TaskResult {
    /// Result for a task that failed to compile: every point is a compile error
    pub fn compile_failed(failure: Arc<CompileFailure>, test_cases: u32) -> Self {
        let verdicts = (0..test_cases)
            .map(|_| Verdict::CompileError(Arc::clone(&failure)))
            .collect();
        Self {
            verdicts,
            compile_failure: Some(failure),
        }
    }

    /// True iff the task compiled and every verdict is a pass
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.compile_failure.is_none() && self.verdicts.iter().all(Verdict::is_pass)
    }

    pub fn score(&self) -> u32 {
        points_for(self.verdicts.iter().filter(|verdict| verdict.is_pass()).count())
    }

    pub fn max_score(&self) -> u32 {
        points_for(self.verdicts.len())
    }

    /// Failed test points with their 1-based numbers
    pub fn failures(&self) -> impl Iterator<Item = (u32, &Verdict)> {
        self.verdicts
            .iter()
            .zip(1u32..)
            .filter(|(verdict, _)| !verdict.is_pass())
            .map(|(verdict, number)| (number, verdict))
    }
}

/// Points for `count` passing test points, saturating at `u32::MAX`
fn points_for(count: usize) -> u32 {
    POINT_SCORE.saturating_mul(u32::try_from(count).unwrap_or(u32::MAX))
}

/// Results of one grading run, in the order the tasks were supplied
#[derive(Debug, Clone, Default)]
pub struct SessionResult {
    pub tasks: Vec<(Task, TaskResult)>,
}

impl SessionResult {
    /// True iff every task passed
    #[must_use]
    pub fn ready_to_submit(&self) -> bool {
        self.tasks.iter().all(|(_, result)| result.all_passed())
    }

    /// Look up the result of a task by its display index
    pub fn get(&self, index: u32) -> Option<&TaskResult> {
        self.tasks
            .iter()
            .find(|(task, _)| task.index == index)
            .map(|(_, result)| result)
    }

    pub fn total_score(&self) -> u32 {
        self.tasks
            .iter()
            .fold(0, |total: u32, (_, result)| total.saturating_add(result.score()))
    }
}
