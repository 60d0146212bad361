//! Workspace resolution for docsmith.
//!
//! A workspace is the directory tree rooted where `.docsmith/` lives. Commands
//! resolve it by walking up from the current directory; when no ancestor has
//! a `.docsmith/` directory the current directory is the workspace root and
//! every setting takes its default.

use crate::config::Config;
use crate::error::{DocsmithError, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Name of the per-workspace state directory.
pub const DOCSMITH_DIR: &str = ".docsmith";

/// Resolved paths for a docsmith workspace. All paths are absolute.
#[derive(Debug, Clone)]
pub struct WorkspaceContext {
    /// Directory containing `.docsmith/` (or the starting directory).
    pub root: PathBuf,

    /// `{root}/.docsmith/`
    pub docsmith_dir: PathBuf,

    /// Directory the context was resolved from. Relative document paths
    /// given on the command line are relative to this.
    pub cwd: PathBuf,
}

impl WorkspaceContext {
    /// Resolve the workspace from the current working directory.
    pub fn resolve() -> Result<Self> {
        let cwd = env::current_dir().map_err(|e| {
            DocsmithError::UserError(format!("failed to get current working directory: {}", e))
        })?;

        Self::resolve_from(&cwd)
    }

    /// Resolve the workspace from a specific directory.
    pub fn resolve_from<P: AsRef<Path>>(cwd: P) -> Result<Self> {
        let cwd = std::path::absolute(cwd.as_ref()).map_err(|e| {
            DocsmithError::UserError(format!(
                "failed to resolve '{}': {}",
                cwd.as_ref().display(),
                e
            ))
        })?;

        let root = cwd
            .ancestors()
            .find(|dir| dir.join(DOCSMITH_DIR).is_dir())
            .unwrap_or(&cwd)
            .to_path_buf();

        Ok(Self {
            docsmith_dir: root.join(DOCSMITH_DIR),
            root,
            cwd,
        })
    }

    pub fn is_initialized(&self) -> bool {
        self.docsmith_dir.is_dir()
    }

    pub fn config_path(&self) -> PathBuf {
        self.docsmith_dir.join("config.yaml")
    }

    pub fn events_dir(&self) -> PathBuf {
        self.docsmith_dir.join("events")
    }

    /// Load `.docsmith/config.yaml`, or defaults when it does not exist.
    pub fn load_config(&self) -> Result<Config> {
        Config::load_or_default(self.config_path())
    }

    pub fn templates_dir(&self, config: &Config) -> PathBuf {
        config.templates_path(&self.docsmith_dir)
    }

    /// Resolve a document path given on the command line.
    pub fn document_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }
}
