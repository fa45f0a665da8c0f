//! A library for grading programming assignments locally.
//!
//! Autojudge compiles each task's single C++ source file, runs the
//! executable against every test case under a wall-clock limit, compares
//! its output with the expected output and scores the result.
//!
//! # Features
//!
//! - **Bounded execution** with a process group killed and reaped at the deadline.
//! - **Whitespace-trimmed comparison** with line-level mismatch reasons.
//! - **Per-task scoring** at 10 points per test point, plus a ready-to-submit flag.
//! - **TOML configuration** for compiler command, limits and task metadata.
//! - **Task discovery** from `<index>_<name>` folders in the latest assignment.
//!
//! # Example
//!
//! ```no_run
//! # async fn grade() -> Result<(), Box<dyn std::error::Error>> {
//! use std::path::Path;
//!
//! use autojudge::{Config, Judge, discover_tasks};
//!
//! let config = Config::from_file("autojudge.toml")?;
//! let root = Path::new("assignment3");
//! let discovery = discover_tasks(root, &config, &root.join("build"))?;
//!
//! let judge = Judge::new(config);
//! let session = judge.run_session(&discovery.tasks).await?;
//! println!("ready to submit: {}", session.ready_to_submit());
//! # Ok(())
//! # }
//! ```

pub use config::{Config, ConfigError, EXAMPLE_CONFIG, TaskMetadata};
pub use discovery::{
    Discovery, DiscoveryError, RejectedTask, discover_tasks, latest_assignment_dir,
    parse_task_folder,
};
pub use process::{ProcessError, ScratchDir};
pub use runner::{CompileError, ExecuteError, Judge, JudgeError, TestPointRun, Transcript};
pub use types::{
    CompilationResult, CompileFailure, ComparisonResult, ExecutionOutcome, MismatchReason,
    POINT_SCORE, RuntimeFault, SessionResult, Task, TaskResult, TestCase, Verdict,
};

pub mod config;
pub mod discovery;
pub mod process;
pub mod report;
pub mod runner;
pub mod types;
