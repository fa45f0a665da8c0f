//! Scratch directory lifecycle
//!
//! Every compilation and every test case execution gets its own scratch
//! directory. It holds the redirected stdio files and is removed when the
//! invocation ends, whichever way it ends.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, instrument};

use crate::process::ProcessError;

const SCRATCH_PREFIX: &str = "autojudge-";

/// An exclusively owned temporary directory
///
/// The directory is deleted by [`cleanup()`](Self::cleanup), or on drop if
/// cleanup was never called.
#[derive(Debug)]
pub struct ScratchDir {
    dir: TempDir,
}

impl ScratchDir {
    /// Create a fresh scratch directory under `parent`, or the system temp dir
    #[instrument]
    pub fn create(parent: Option<&Path>) -> Result<Self, ProcessError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(SCRATCH_PREFIX);

        let dir = match parent {
            Some(parent) => {
                std::fs::create_dir_all(parent).map_err(ProcessError::ScratchUnavailable)?;
                builder.tempdir_in(parent)
            }
            None => builder.tempdir(),
        }
        .map_err(ProcessError::ScratchUnavailable)?;

        debug!(path = %dir.path().display(), "created scratch directory");
        Ok(Self { dir })
    }

    /// Get the path to the scratch directory
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Get the path to a file inside the scratch directory
    ///
    /// Returns an error if the path contains path traversal attempts.
    pub fn file_path(&self, name: &str) -> Result<PathBuf, ProcessError> {
        if name.contains("..") || name.starts_with('/') {
            return Err(ProcessError::InvalidPath(format!(
                "path traversal not allowed: {name}"
            )));
        }
        Ok(self.dir.path().join(name))
    }

    /// Write a file into the scratch directory
    #[instrument(skip(self, content))]
    pub async fn write_file(&self, name: &str, content: &[u8]) -> Result<(), ProcessError> {
        let path = self.file_path(name)?;
        tokio::fs::write(&path, content).await?;
        debug!(?path, len = content.len(), "wrote scratch file");
        Ok(())
    }

    /// Read a file from the scratch directory
    pub async fn read_file(&self, name: &str) -> Result<Vec<u8>, ProcessError> {
        let path = self.file_path(name)?;
        Ok(tokio::fs::read(&path).await?)
    }

    /// Remove the scratch directory and everything in it
    pub fn cleanup(self) -> Result<(), ProcessError> {
        let path = self.dir.path().to_path_buf();
        self.dir.close()?;
        debug!(path = %path.display(), "removed scratch directory");
        Ok(())
    }
}
