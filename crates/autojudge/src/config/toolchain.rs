use serde::{Deserialize, Serialize};

/// Placeholder for the source file in the compiler command
pub const SOURCE_PLACEHOLDER: &str = "{source}";

/// Placeholder for the executable in the compiler command
pub const OUTPUT_PLACEHOLDER: &str = "{output}";

/// Configuration for the compilation step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Command and arguments with placeholders
    /// Placeholders: {source}, {output}
    #[serde(default = "default_compile_command")]
    pub command: Vec<String>,

    /// Compilation timeout in seconds
    #[serde(default = "default_compile_timeout")]
    pub timeout: f64,
}

impl CompilerConfig {
    /// Expand placeholders in the compiler command
    pub fn expand_command(&self, source: &str, output: &str) -> Vec<String> {
        self.command
            .iter()
            .map(|arg| {
                arg.replace(SOURCE_PLACEHOLDER, source)
                    .replace(OUTPUT_PLACEHOLDER, output)
            })
            .collect()
    }
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            command: default_compile_command(),
            timeout: default_compile_timeout(),
        }
    }
}

fn default_compile_command() -> Vec<String> {
    [
        "g++",
        SOURCE_PLACEHOLDER,
        "-o",
        OUTPUT_PLACEHOLDER,
        "-g",
        "-Wall",
        "--std=c++11",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_compile_timeout() -> f64 {
    30.0
}

/// Configuration for the execution step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Wall clock time limit per test case in seconds
    #[serde(default = "default_time_limit")]
    pub time_limit: f64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            time_limit: default_time_limit(),
        }
    }
}

fn default_time_limit() -> f64 {
    2.0
}
