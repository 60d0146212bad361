//! In-process, per-document mutual exclusion.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// One mutex per document path.
///
/// Paths are made absolute before keying, so `doc.md` and `./doc.md` share a
/// slot. Slots are never removed; the set of documents a process touches is
/// small.
#[derive(Debug, Default)]
pub struct DocumentLocks {
    slots: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl DocumentLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// The mutex guarding `path`. Lock the returned slot for the duration of
    /// the update.
    pub fn slot(&self, path: &Path) -> Arc<Mutex<()>> {
        let key = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        let mut slots = self.slots.lock().unwrap_or_else(|p| p.into_inner());
        Arc::clone(slots.entry(key).or_default())
    }

    /// Run `f` while holding the slot for `path`.
    pub fn with_lock<T>(&self, path: &Path, f: impl FnOnce() -> T) -> T {
        let slot = self.slot(path);
        let _held = slot.lock().unwrap_or_else(|p| p.into_inner());
        f()
    }
}
