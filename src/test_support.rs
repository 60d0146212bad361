use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, MutexGuard};
use tempfile::TempDir;

static CWD_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

pub(crate) struct DirGuard {
    original: PathBuf,
    _lock: MutexGuard<'static, ()>,
}

impl DirGuard {
    pub(crate) fn new(new_dir: &Path) -> Self {
        // Changing the process current working directory is global and not thread-safe.
        // Lock it so tests don't race even if a #[serial] annotation is missed.
        let lock = CWD_LOCK.lock().unwrap_or_else(|poison| poison.into_inner());
        let original = std::env::current_dir().unwrap();
        std::env::set_current_dir(new_dir).unwrap();
        Self {
            original,
            _lock: lock,
        }
    }
}

impl Drop for DirGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.original);
    }
}

/// A scratch directory laid out like an initialized workspace: `.docsmith/`
/// with its `templates/` and `events/` directories and no config file.
pub(crate) fn create_test_workspace() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let docsmith_dir = temp_dir.path().join(".docsmith");

    std::fs::create_dir_all(docsmith_dir.join("templates")).unwrap();
    std::fs::create_dir_all(docsmith_dir.join("events")).unwrap();

    temp_dir
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::WorkspaceContext;

    #[test]
    fn test_create_test_workspace_is_initialized() {
        let temp = create_test_workspace();
        let ctx = WorkspaceContext::resolve_from(temp.path()).unwrap();

        assert!(ctx.is_initialized());
        assert!(!ctx.config_path().exists());
    }
}
