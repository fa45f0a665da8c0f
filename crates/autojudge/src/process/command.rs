//! Command builder for bounded processes

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::process::ProcessError;

/// Builder for a command run under a wall-clock deadline
#[derive(Debug, Clone)]
pub struct BoundedCommand {
    program: String,
    args: Vec<String>,
    env: HashMap<String, String>,
    working_dir: Option<PathBuf>,
    timeout: Duration,
}

impl BoundedCommand {
    /// Create a command from a program and its arguments
    pub fn new(command: impl IntoIterator<Item = impl Into<String>>) -> Result<Self, ProcessError> {
        let mut parts = command.into_iter().map(Into::into);
        let program = parts.next().ok_or(ProcessError::EmptyCommand)?;
        if program.is_empty() {
            return Err(ProcessError::EmptyCommand);
        }

        Ok(Self {
            program,
            args: parts.collect(),
            env: HashMap::new(),
            working_dir: None,
            timeout: Duration::from_secs(2),
        })
    }

    /// Set an environment variable
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Set the working directory
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Set the wall-clock deadline
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn deadline(&self) -> Duration {
        self.timeout
    }

    /// Full argument vector, program first
    pub fn build(&self) -> Vec<String> {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().cloned())
            .collect()
    }

    /// Build the tokio command with the given stdio handles
    ///
    /// The child leads its own process group so a timeout can kill
    /// everything it started.
    pub(crate) fn to_command(&self, stdin: Stdio, stdout: Stdio, stderr: Stdio) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .envs(&self.env)
            .stdin(stdin)
            .stdout(stdout)
            .stderr(stderr)
            .kill_on_drop(true);

        if let Some(ref dir) = self.working_dir {
            command.current_dir(dir);
        }

        #[cfg(unix)]
        command.process_group(0);

        command
    }
}
