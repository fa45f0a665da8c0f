use std::path::{Component, Path};

use serde::{Deserialize, Serialize};

/// Default test data file names shared by every task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestDataConfig {
    /// Input file names, in test case order
    #[serde(default = "default_inputs")]
    pub inputs: Vec<String>,

    /// Expected output file names, in test case order
    #[serde(default = "default_outputs")]
    pub outputs: Vec<String>,
}

impl Default for TestDataConfig {
    fn default() -> Self {
        Self {
            inputs: default_inputs(),
            outputs: default_outputs(),
        }
    }
}

fn default_inputs() -> Vec<String> {
    (1..=10).map(|n| format!("{n}.in")).collect()
}

fn default_outputs() -> Vec<String> {
    (1..=10).map(|n| format!("{n}.out")).collect()
}

/// Metadata for one task folder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskMetadata {
    /// Source file, relative to the task folder
    pub source: String,

    /// Executable file name written to the build directory
    pub executable: String,

    /// Number of test cases; counted from the data directory when unset
    #[serde(default)]
    pub test_cases: Option<u32>,

    /// Input file names overriding `[test_data]`
    #[serde(default)]
    pub inputs: Option<Vec<String>>,

    /// Expected output file names overriding `[test_data]`
    #[serde(default)]
    pub outputs: Option<Vec<String>>,
}

impl TaskMetadata {
    /// Input names for this task, falling back to the shared defaults
    pub fn inputs<'a>(&'a self, defaults: &'a TestDataConfig) -> &'a [String] {
        self.inputs.as_deref().unwrap_or(&defaults.inputs)
    }

    /// Expected output names for this task, falling back to the shared defaults
    pub fn outputs<'a>(&'a self, defaults: &'a TestDataConfig) -> &'a [String] {
        self.outputs.as_deref().unwrap_or(&defaults.outputs)
    }

    /// Check the metadata is usable; the message names the offending field
    pub fn check(&self, defaults: &TestDataConfig) -> Result<(), String> {
        if self.source.is_empty() {
            return Err("empty source".to_string());
        }
        if !is_relative_inside(Path::new(&self.source)) {
            return Err(format!(
                "source '{}' must be a relative path inside the task folder",
                self.source
            ));
        }
        if self.executable.is_empty() {
            return Err("empty executable name".to_string());
        }
        if self.executable.contains('/') || self.executable.contains("..") {
            return Err(format!(
                "executable '{}' must be a plain file name",
                self.executable
            ));
        }

        let inputs = self.inputs(defaults);
        let outputs = self.outputs(defaults);
        if inputs.len() != outputs.len() {
            return Err(format!(
                "{} input names but {} output names",
                inputs.len(),
                outputs.len()
            ));
        }
        for name in inputs.iter().chain(outputs) {
            if name.is_empty() || !is_relative_inside(Path::new(name)) {
                return Err(format!("invalid test data file name '{name}'"));
            }
        }
        if let Some(count) = self.test_cases
            && count as usize > inputs.len()
        {
            return Err(format!(
                "test_cases = {count} but only {} input names are listed",
                inputs.len()
            ));
        }

        Ok(())
    }
}

fn is_relative_inside(path: &Path) -> bool {
    path.components()
        .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
}
