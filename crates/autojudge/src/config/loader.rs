//! Configuration file loading for autojudge
//!
//! Handles loading and parsing configuration files using the config crate.

use std::path::Path;

use config::{Config as ConfigBuilder, File, FileFormat};

use crate::config::toolchain::{OUTPUT_PLACEHOLDER, SOURCE_PLACEHOLDER};
use crate::config::{Config, ConfigError};

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config = ConfigBuilder::builder()
            .add_source(File::from(path))
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self, ConfigError> {
        let config = ConfigBuilder::builder()
            .add_source(File::from_str(content, FileFormat::Toml))
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the session-wide settings
    ///
    /// Per-task metadata is checked during discovery so that one broken
    /// entry only rejects its own task.
    fn validate(&self) -> Result<(), ConfigError> {
        let command = &self.compiler.command;
        if command.is_empty() {
            return Err(ConfigError::Invalid("empty compiler command".to_string()));
        }
        for placeholder in [SOURCE_PLACEHOLDER, OUTPUT_PLACEHOLDER] {
            if !command.iter().any(|arg| arg.contains(placeholder)) {
                return Err(ConfigError::Invalid(format!(
                    "compiler command must contain {placeholder}"
                )));
            }
        }

        if !(self.compiler.timeout.is_finite() && self.compiler.timeout > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "compiler timeout must be positive, got {}",
                self.compiler.timeout
            )));
        }
        if !(self.execution.time_limit.is_finite() && self.execution.time_limit > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "time limit must be positive, got {}",
                self.execution.time_limit
            )));
        }
        if self.jobs == 0 {
            return Err(ConfigError::Invalid("jobs must be at least 1".to_string()));
        }
        if self.test_data.inputs.len() != self.test_data.outputs.len() {
            return Err(ConfigError::Invalid(format!(
                "test_data lists {} inputs but {} outputs",
                self.test_data.inputs.len(),
                self.test_data.outputs.len()
            )));
        }

        Ok(())
    }
}
