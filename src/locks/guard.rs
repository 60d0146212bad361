//! RAII guard for a document lock file.

use crate::error::{DocsmithError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Holds a document's lock file for as long as it lives.
///
/// Dropping the guard deletes the lock file; a failed deletion prints a
/// warning and leaves the file behind for `docsmith lock clear`.
#[derive(Debug)]
pub struct LockGuard {
    lock_path: PathBuf,
    document: PathBuf,
    released: bool,
}

impl LockGuard {
    pub(super) fn new(lock_path: PathBuf, document: PathBuf) -> Self {
        Self {
            lock_path,
            document,
            released: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.lock_path
    }

    /// The document this lock protects.
    pub fn document(&self) -> &Path {
        &self.document
    }

    /// Release the lock now, reporting a failed deletion as an error.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        fs::remove_file(&self.lock_path).map_err(|e| {
            DocsmithError::LockError(format!(
                "failed to release lock on '{}': {}",
                self.document.display(),
                e
            ))
        })
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = fs::remove_file(&self.lock_path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            eprintln!(
                "Warning: failed to release lock '{}': {}",
                self.lock_path.display(),
                e
            );
        }
    }
}
