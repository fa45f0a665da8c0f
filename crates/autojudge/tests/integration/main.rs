//! Integration tests for autojudge
//!
//! Most tests stand in `/bin/sh` scripts for both the compiler and the
//! submissions, so they only need a unix shell. Tests that build real C++
//! sources need g++ on the PATH.
//! Run with: cargo test -p autojudge --features integration-tests

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;

use autojudge::config::{Config, TaskMetadata};
use autojudge::{Discovery, Judge, Task, discover_tasks};
use tempfile::TempDir;

mod discovery;
mod harness;
#[cfg(feature = "integration-tests")]
mod toolchain;

/// Path to test fixtures
pub(crate) const FIXTURES_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

/// Compiler stand-in that "builds" a shell script by copying it
pub(crate) fn copy_compiler() -> Vec<String> {
    ["cp", "{source}", "{output}"].map(String::from).to_vec()
}

/// Compiler stand-in that rejects every source
pub(crate) fn failing_compiler(diagnostic: &str) -> Vec<String> {
    vec![
        "/bin/sh".into(),
        "-c".into(),
        format!("echo \"{diagnostic}\" >&2; exit 1"),
        "cc".into(),
        "{source}".into(),
        "{output}".into(),
    ]
}

/// Install an executable shell script at `dir/name`
///
/// The script is written under another name and copied into place by a
/// child process, so this process never holds a write handle to a file it
/// is about to execute.
pub(crate) fn install_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let staged = dir.join(format!("{name}.staged"));
    write_executable(&staged, body);

    let target = dir.join(name);
    let status = Command::new("cp")
        .arg(&staged)
        .arg(&target)
        .status()
        .expect("failed to run cp");
    assert!(status.success(), "cp failed for {}", target.display());
    target
}

fn write_executable(path: &Path, body: &str) {
    fs::write(path, format!("#!/bin/sh\n{body}\n")).expect("failed to write script");
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
        .expect("failed to mark script executable");
}

/// An assignment directory with task folders and test data
pub(crate) struct Assignment {
    dir: TempDir,
    pub config: Config,
}

impl Assignment {
    pub(crate) fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create assignment dir");
        let mut config = Config::empty();
        config.compiler.command = copy_compiler();
        config.scratch_dir = Some(dir.path().join("scratch"));
        Self { dir, config }
    }

    pub(crate) fn root(&self) -> &Path {
        self.dir.path()
    }

    pub(crate) fn scratch_dir(&self) -> PathBuf {
        self.dir.path().join("scratch")
    }

    /// Add a task folder whose source is the given shell script body
    pub(crate) fn add_task(&mut self, folder: &str, program: &str) {
        let task_dir = self.root().join(folder);
        fs::create_dir_all(&task_dir).expect("failed to create task folder");
        write_executable(&task_dir.join("main.cpp"), program);

        let executable = folder.split_once('_').map_or(folder, |(_, name)| name);
        self.config.tasks.insert(
            folder.to_string(),
            TaskMetadata {
                source: "main.cpp".into(),
                executable: executable.into(),
                test_cases: None,
                inputs: None,
                outputs: None,
            },
        );
    }

    /// Write test case `number` of a task
    pub(crate) fn add_case(&self, folder: &str, number: u32, input: &str, expected: &str) {
        let data = self.root().join("data").join(folder);
        fs::create_dir_all(&data).expect("failed to create data folder");
        fs::write(data.join(format!("{number}.in")), input).expect("failed to write input");
        fs::write(data.join(format!("{number}.out")), expected).expect("failed to write output");
    }

    pub(crate) fn discover(&self) -> Discovery {
        discover_tasks(self.root(), &self.config, &self.root().join("build"))
            .expect("discovery failed")
    }

    pub(crate) fn task(&self, folder: &str) -> Task {
        self.discover()
            .find(folder)
            .cloned()
            .unwrap_or_else(|| panic!("task {folder} not discovered"))
    }

    pub(crate) fn judge(&self) -> Judge {
        Judge::new(self.config.clone())
    }
}

/// Number of entries left in a directory (0 if it does not exist)
pub(crate) fn entries(dir: &Path) -> usize {
    fs::read_dir(dir).map_or(0, |entries| entries.count())
}
