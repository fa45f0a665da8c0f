//! Task discovery
//!
//! Turns an assignment directory into typed [`Task`] descriptors. Task
//! folders are named `<index>_<name>` where the index is a positive integer
//! and the name is made of word characters. Each one is joined with its
//! `[tasks.<folder>]` metadata from the configuration.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::config::{Config, ConfigError};
use crate::types::Task;

/// Directory name prefixes that hold an assignment, in order of preference
const ASSIGNMENT_PREFIXES: [&str; 2] = ["assignment", "challenge"];

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("failed to read directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no assignment or challenge directory under {0}")]
    NoAssignment(PathBuf),
}

/// A task folder that could not be turned into a [`Task`]
#[derive(Debug)]
pub struct RejectedTask {
    pub folder: String,
    pub error: ConfigError,
}

/// Outcome of scanning an assignment directory
#[derive(Debug, Default)]
pub struct Discovery {
    /// Usable tasks sorted by index
    pub tasks: Vec<Task>,

    /// Folders that follow the naming convention but cannot be graded
    pub rejected: Vec<RejectedTask>,
}

impl Discovery {
    /// Find a task by display index or folder name
    pub fn find(&self, key: &str) -> Option<&Task> {
        match key.parse::<u32>() {
            Ok(index) => self.tasks.iter().find(|task| task.index == index),
            Err(_) => self
                .tasks
                .iter()
                .find(|task| task.folder.eq_ignore_ascii_case(key)),
        }
    }
}

/// Split a task folder name into its index and name
///
/// Returns `None` unless the name is `<positive integer>_<word chars>`.
pub fn parse_task_folder(folder: &str) -> Option<(u32, &str)> {
    let (index, name) = folder.split_once('_')?;
    if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return None;
    }

    let index: u32 = index.parse().ok()?;
    (index > 0).then_some((index, name))
}

/// Pick the assignment directory to grade under `base`
///
/// Prefers the `assignment<N>` directory with the highest `N`, and falls
/// back to `challenge<N>` when there is none.
pub fn latest_assignment_dir(base: &Path) -> Result<PathBuf, DiscoveryError> {
    let dirs = subdirectories(base)?;

    for prefix in ASSIGNMENT_PREFIXES {
        let latest = dirs
            .iter()
            .filter_map(|name| Some((assignment_number(name.strip_prefix(prefix)?)?, name)))
            .max_by_key(|(number, _)| *number);

        if let Some((_, name)) = latest {
            return Ok(base.join(name));
        }
    }

    Err(DiscoveryError::NoAssignment(base.to_path_buf()))
}

/// The first run of digits in a directory name suffix
fn assignment_number(suffix: &str) -> Option<u64> {
    let start = suffix.find(|c: char| c.is_ascii_digit())?;
    let digits = &suffix[start..];
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse().ok()
}

/// Find and resolve every task folder directly under `root`
///
/// Executables are placed at `<build_dir>/<folder>/<executable>`. A folder
/// without usable metadata is reported in [`Discovery::rejected`] rather than
/// failing the whole scan.
#[instrument(skip(root, config), fields(root = %root.display()))]
pub fn discover_tasks(
    root: &Path,
    config: &Config,
    build_dir: &Path,
) -> Result<Discovery, DiscoveryError> {
    let mut discovery = Discovery::default();

    for folder in subdirectories(root)? {
        let Some((index, name)) = parse_task_folder(&folder) else {
            debug!(%folder, "not a task folder");
            continue;
        };

        match resolve_task(root, config, build_dir, &folder, index, name) {
            Ok(task) => {
                debug!(%folder, test_cases = task.test_cases, "discovered task");
                discovery.tasks.push(task);
            }
            Err(error) => {
                warn!(%folder, %error, "rejected task folder");
                discovery.rejected.push(RejectedTask { folder, error });
            }
        }
    }

    discovery
        .tasks
        .sort_by(|a, b| a.index.cmp(&b.index).then_with(|| a.folder.cmp(&b.folder)));
    discovery
        .rejected
        .sort_by(|a, b| a.folder.cmp(&b.folder));

    Ok(discovery)
}

fn resolve_task(
    root: &Path,
    config: &Config,
    build_dir: &Path,
    folder: &str,
    index: u32,
    name: &str,
) -> Result<Task, ConfigError> {
    let meta = config.get_task(folder)?;
    meta.check(&config.test_data)
        .map_err(|message| ConfigError::InvalidTask {
            task: folder.to_string(),
            message,
        })?;

    let data_dir = root.join(&config.data_dir).join(folder);
    let inputs = meta.inputs(&config.test_data).to_vec();
    let outputs = meta.outputs(&config.test_data).to_vec();

    // Without an explicit count, grade the listed inputs that are present
    let test_cases = match meta.test_cases {
        Some(count) => count,
        None => {
            let present = inputs
                .iter()
                .take_while(|input| data_dir.join(input).is_file())
                .count();
            u32::try_from(present).unwrap_or(u32::MAX)
        }
    };

    Ok(Task {
        index,
        name: name.to_string(),
        folder: folder.to_string(),
        source: root.join(folder).join(&meta.source),
        executable: build_dir.join(folder).join(&meta.executable),
        data_dir,
        inputs,
        outputs,
        test_cases,
    })
}

fn subdirectories(path: &Path) -> Result<Vec<String>, DiscoveryError> {
    let read_err = |source| DiscoveryError::ReadDir {
        path: path.to_path_buf(),
        source,
    };

    let mut names = Vec::new();
    for entry in std::fs::read_dir(path).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        if !entry.path().is_dir() {
            continue;
        }
        if let Ok(name) = entry.file_name().into_string() {
            names.push(name);
        }
    }
    Ok(names)
}
