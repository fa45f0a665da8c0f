use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

pub use crate::config::task::{TaskMetadata, TestDataConfig};
pub use crate::config::toolchain::{CompilerConfig, ExecutionConfig};

mod loader;
pub mod task;
pub mod toolchain;

/// Example configuration embedded at compile time.
///
/// Library users can access this to generate a starter config file.
pub const EXAMPLE_CONFIG: &str = include_str!("../../autojudge.example.toml");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] config::ConfigError),

    #[error("no metadata for task '{0}' in configuration")]
    TaskNotFound(String),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("invalid metadata for task '{task}': {message}")]
    InvalidTask { task: String, message: String },
}

/// Config for autojudge
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Directory (relative to the assignment root) holding per-task test data
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Parent directory for scratch directories (system temp dir if unset)
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,

    /// Number of tasks graded concurrently
    #[serde(default = "default_jobs")]
    pub jobs: usize,

    /// How submissions are compiled
    #[serde(default)]
    pub compiler: CompilerConfig,

    /// How compiled submissions are run
    #[serde(default)]
    pub execution: ExecutionConfig,

    /// Default test data file names shared by all tasks
    #[serde(default)]
    pub test_data: TestDataConfig,

    /// Per-task metadata keyed by task folder name (e.g. `1_hello`)
    #[serde(default)]
    pub tasks: HashMap<String, TaskMetadata>,
}

impl Config {
    /// Create a new config with the embedded example tasks
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a config with default settings and no task metadata
    pub fn empty() -> Self {
        Self {
            data_dir: default_data_dir(),
            scratch_dir: None,
            jobs: default_jobs(),
            compiler: CompilerConfig::default(),
            execution: ExecutionConfig::default(),
            test_data: TestDataConfig::default(),
            tasks: HashMap::new(),
        }
    }

    /// Get the metadata of a task by folder name
    ///
    /// Falls back to a case-insensitive match, since table keys may have been
    /// normalised to lowercase by the config loader.
    pub fn get_task(&self, folder: &str) -> Result<&TaskMetadata, ConfigError> {
        self.tasks
            .get(folder)
            .or_else(|| {
                self.tasks
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(folder))
                    .map(|(_, meta)| meta)
            })
            .ok_or_else(|| ConfigError::TaskNotFound(folder.to_string()))
    }

    /// Wall-clock limit for one test case execution
    pub fn time_limit(&self) -> Duration {
        Duration::from_secs_f64(self.execution.time_limit)
    }

    /// Upper bound on one compiler invocation
    pub fn compile_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.compiler.timeout)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::parse_toml(EXAMPLE_CONFIG).expect("embedded default config should be valid")
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_jobs() -> usize {
    1
}
