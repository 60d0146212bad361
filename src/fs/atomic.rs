//! Atomic filesystem writes.
//!
//! All writes follow the same pattern:
//! 1. Write content to a temporary file in the same directory
//! 2. Sync the file to disk (fsync)
//! 3. Rename it over the target
//!
//! `std::fs::rename` replaces an existing destination on both POSIX and
//! Windows, and is atomic when source and destination share a filesystem.
//! On crash a temporary file named `.{filename}.tmp` may remain beside the
//! target.

use crate::error::{DocsmithError, Result};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Atomically write bytes to a file.
///
/// Any failure is reported as [`DocsmithError::DocumentWriteFailure`] carrying
/// the underlying I/O error; the target is left untouched in that case.
///
/// # Example
///
/// ```no_run
/// use docsmith::fs::atomic_write;
/// use std::path::Path;
///
/// atomic_write(Path::new("docs/prd.md"), b"# PRD\n")?;
/// # Ok::<(), docsmith::error::DocsmithError>(())
/// ```
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| DocsmithError::write_failure(path, e))?;
    }

    let temp_path = generate_temp_path(path).map_err(|e| DocsmithError::write_failure(path, e))?;

    write_and_sync(&temp_path, content).map_err(|e| DocsmithError::write_failure(path, e))?;

    atomic_replace(&temp_path, path).map_err(|e| DocsmithError::write_failure(path, e))?;

    Ok(())
}

/// Atomically write a string to a file.
pub fn atomic_write_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    atomic_write(path, content.as_bytes())
}

/// Temporary file path in the same directory as the target: `.{filename}.tmp`.
fn generate_temp_path(target: &Path) -> io::Result<PathBuf> {
    let parent = target.parent().unwrap_or(Path::new("."));
    let filename = target
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "invalid file path"))?;

    Ok(parent.join(format!(".{}.tmp", filename)))
}

fn write_and_sync(path: &Path, content: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;

    if let Err(e) = file.write_all(content).and_then(|()| file.sync_all()) {
        let _ = fs::remove_file(path);
        return Err(e);
    }

    Ok(())
}

fn atomic_replace(source: &Path, target: &Path) -> io::Result<()> {
    if let Err(e) = fs::rename(source, target) {
        let _ = fs::remove_file(source);
        return Err(e);
    }

    // Persist the directory entry as well.
    #[cfg(unix)]
    if let Some(parent) = target.parent()
        && let Ok(dir) = File::open(parent)
    {
        let _ = dir.sync_all();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write_new_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("prd.md");

        atomic_write(&file_path, b"# PRD\n").unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "# PRD\n");
    }

    #[test]
    fn test_atomic_write_replace_existing() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("prd.md");
        fs::write(&file_path, "original content").unwrap();

        atomic_write_file(&file_path, "new content").unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "new content");
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("docs").join("specs").join("design.md");

        atomic_write_file(&file_path, "nested").unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "nested");
    }

    #[test]
    fn test_atomic_write_temp_file_cleanup() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("prd.md");

        atomic_write(&file_path, b"content").unwrap();

        assert!(!temp_dir.path().join(".prd.md.tmp").exists());
    }

    #[test]
    fn test_generate_temp_path() {
        let temp = generate_temp_path(Path::new("/some/path/prd.md")).unwrap();
        assert_eq!(temp, Path::new("/some/path/.prd.md.tmp"));
    }

    #[test]
    fn test_atomic_write_into_directory_fails_with_write_failure() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("occupied");
        fs::create_dir_all(target.join("child")).unwrap();

        let err = atomic_write_file(&target, "content").unwrap_err();
        match err {
            DocsmithError::DocumentWriteFailure { path, .. } => assert_eq!(path, target),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(!temp_dir.path().join(".occupied.tmp").exists());
    }

    #[test]
    fn test_atomic_write_concurrent_distinct_files() {
        let temp_dir = TempDir::new().unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let path = temp_dir.path().join(format!("doc_{}.md", i));
                let content = format!("content {}", i);
                std::thread::spawn(move || {
                    atomic_write_file(&path, &content).unwrap();
                    (path, content)
                })
            })
            .collect();

        for handle in handles {
            let (path, expected) = handle.join().unwrap();
            assert_eq!(fs::read_to_string(&path).unwrap(), expected);
        }
    }
}
