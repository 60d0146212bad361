//! Lock file acquisition, inspection and clearing.

use super::guard::LockGuard;
use super::metadata::LockMetadata;
use crate::error::{DocsmithError, Result};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// A lock file found beside a document.
#[derive(Debug, Clone)]
pub struct LockInfo {
    pub path: PathBuf,
    pub document: PathBuf,
    pub metadata: LockMetadata,
    pub is_stale: bool,
}

impl std::fmt::Display for LockInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (owner: {}, age: {}, action: {}{})",
            self.document.display(),
            self.metadata.owner,
            self.metadata.age_string(),
            self.metadata.action,
            if self.is_stale { ", STALE" } else { "" }
        )
    }
}

/// `.<file>.lock` in the same directory as `document`.
pub fn lock_path_for(document: &Path) -> PathBuf {
    let name = document
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    let lock_name = format!(".{}.lock", name);

    match document.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(lock_name),
        _ => PathBuf::from(lock_name),
    }
}

/// Take the lock file for `document`.
///
/// Fails with `LockError` when another holder already has it.
pub fn acquire_document_lock(document: &Path, action: &str) -> Result<LockGuard> {
    let lock_path = lock_path_for(document);

    if let Some(parent) = lock_path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| {
            DocsmithError::LockError(format!(
                "failed to create directory '{}': {}",
                parent.display(),
                e
            ))
        })?;
    }

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&lock_path)
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::AlreadyExists {
                let holder = match LockMetadata::from_file(&lock_path) {
                    Ok(meta) => format!(
                        "\nLock: {} (created {} ago by {})\nAction: {}",
                        lock_path.display(),
                        meta.age_string(),
                        meta.owner,
                        meta.action
                    ),
                    Err(_) => format!("\nLock: {}", lock_path.display()),
                };
                DocsmithError::LockError(format!(
                    "'{}' is being updated by another process{}",
                    document.display(),
                    holder
                ))
            } else {
                DocsmithError::LockError(format!(
                    "failed to acquire lock '{}': {}",
                    lock_path.display(),
                    e
                ))
            }
        })?;

    let json = LockMetadata::new(action).to_json()?;
    let written = file.write_all(json.as_bytes()).and_then(|_| file.sync_all());
    if let Err(e) = written {
        let _ = fs::remove_file(&lock_path);
        return Err(DocsmithError::LockError(format!(
            "failed to write lock metadata: {}",
            e
        )));
    }

    Ok(LockGuard::new(lock_path, document.to_path_buf()))
}

/// The lock currently held on `document`, if any.
pub fn read_lock(document: &Path, stale_minutes: u32) -> Result<Option<LockInfo>> {
    let path = lock_path_for(document);
    if !path.exists() {
        return Ok(None);
    }

    let metadata = LockMetadata::from_file(&path)?;
    let is_stale = metadata.is_stale(stale_minutes);

    Ok(Some(LockInfo {
        path,
        document: document.to_path_buf(),
        metadata,
        is_stale,
    }))
}

/// Remove the lock file on `document`.
///
/// A lock that is not yet stale is only removed with `force`. Unreadable lock
/// files are treated as stale.
pub fn clear_lock(document: &Path, stale_minutes: u32, force: bool) -> Result<LockInfo> {
    let path = lock_path_for(document);
    if !path.exists() {
        return Err(DocsmithError::UserError(format!(
            "no lock on '{}' (looked for {})",
            document.display(),
            path.display()
        )));
    }

    let info = match LockMetadata::from_file(&path) {
        Ok(metadata) => LockInfo {
            is_stale: metadata.is_stale(stale_minutes),
            path: path.clone(),
            document: document.to_path_buf(),
            metadata,
        },
        Err(_) => LockInfo {
            path: path.clone(),
            document: document.to_path_buf(),
            metadata: LockMetadata {
                owner: "unknown".to_string(),
                pid: None,
                created_at: chrono::DateTime::<chrono::Utc>::UNIX_EPOCH,
                action: "unknown".to_string(),
            },
            is_stale: true,
        },
    };

    if !info.is_stale && !force {
        return Err(DocsmithError::UserError(format!(
            "lock on '{}' is not stale ({} old, threshold {}m); use --force to clear it",
            document.display(),
            info.metadata.age_string(),
            stale_minutes
        )));
    }

    fs::remove_file(&path).map_err(|e| {
        DocsmithError::UserError(format!(
            "failed to clear lock '{}': {}",
            path.display(),
            e
        ))
    })?;

    Ok(info)
}
