//! Ownership of ephemeral files created during a run.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Files that must not outlive the run.
///
/// Everything registered is removed on [`TempFiles::cleanup`] or, failing
/// that, when the set is dropped, so an early `?` return leaves nothing
/// behind.
#[derive(Debug, Default)]
pub struct TempFiles {
    files: Vec<PathBuf>,
}

impl TempFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `path`. Register before writing so partial output is covered.
    pub fn register(&mut self, path: PathBuf) {
        self.files.push(path);
    }

    /// Registered files in registration order.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Delete every registered file that exists.
    pub fn cleanup(&mut self) {
        for path in self.files.drain(..) {
            remove_quietly(&path);
        }
    }
}

impl Drop for TempFiles {
    fn drop(&mut self) {
        self.cleanup();
    }
}

fn remove_quietly(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "removed temporary file"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "failed to remove temporary file"),
    }
}
