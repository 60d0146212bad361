//! Applying section updates to documents on disk.

use super::progress::{ProgressRecord, ProgressStore, compute_progress};
use super::types::{AppliedUpdate, SectionUpdateOutcome, SectionUpdateSpec};
use crate::error::Result;
use crate::fs::atomic_write_file;
use crate::locks::{DocumentLocks, acquire_document_lock};
use crate::markdown::{
    self, apply, create_section, header_level, join_lines, locate, nest_content, split_lines,
};
use crate::template::TemplateStructure;
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;

/// Applies batches of [`SectionUpdateSpec`] and tracks progress.
///
/// Updates to one document path are single-flight: threads sharing an updater
/// queue on an in-process mutex, and a lock file beside the document keeps
/// other processes out for the duration of the write.
#[derive(Debug, Clone)]
pub struct DocumentUpdater {
    progress: Arc<ProgressStore>,
    locks: Arc<DocumentLocks>,
    lock_files: bool,
}

impl Default for DocumentUpdater {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentUpdater {
    pub fn new() -> Self {
        Self::with_store(Arc::new(ProgressStore::new()))
    }

    /// An updater recording progress into a shared store.
    pub fn with_store(progress: Arc<ProgressStore>) -> Self {
        Self {
            progress,
            locks: Arc::new(DocumentLocks::new()),
            lock_files: true,
        }
    }

    /// Skip the cross-process lock file. In-process serialization still applies.
    pub fn without_lock_files(mut self) -> Self {
        self.lock_files = false;
        self
    }

    pub fn progress_store(&self) -> &Arc<ProgressStore> {
        &self.progress
    }

    /// Apply `updates` to the document at `path` in priority order.
    ///
    /// A missing or unreadable document is treated as empty. Sections that cannot
    /// be located are appended. Headings in the update content are nested
    /// under the target section. The document is written once, and the
    /// progress record is refreshed only after the write succeeds.
    pub fn apply_section_updates(
        &self,
        path: &Path,
        updates: &[SectionUpdateSpec],
        structure: &TemplateStructure,
    ) -> Result<SectionUpdateOutcome> {
        self.locks.with_lock(path, || {
            let _lock_file = if self.lock_files {
                Some(acquire_document_lock(path, "update")?)
            } else {
                None
            };

            let original = read_document(path);

            let mut ordered: Vec<&SectionUpdateSpec> = updates.iter().collect();
            ordered.sort_by_key(|u| u.priority);

            let mut text = original.clone();
            let mut applied = Vec::with_capacity(ordered.len());

            for update in ordered {
                let sections = markdown::parse(&text);
                let created = match locate(&sections, &update.section) {
                    Some(section) => {
                        let content = nest_content(&update.content, section.level);
                        text = join_lines(&apply(split_lines(&text), section, &content, update.mode));
                        false
                    }
                    None => {
                        let header = structure
                            .sections
                            .get(&update.section)
                            .map(|info| info.heading.as_str())
                            .unwrap_or(update.section.as_str());
                        let content = nest_content(&update.content, header_level(header));
                        text = create_section(&text, header, &content);
                        true
                    }
                };

                applied.push(AppliedUpdate {
                    section: update.section.clone(),
                    mode: update.mode,
                    created,
                });
            }

            let written = text != original;
            if written {
                atomic_write_file(path, &text)?;
            }

            let record = ProgressRecord {
                path: path.to_path_buf(),
                progress: compute_progress(&text, structure),
                updated_at: Utc::now(),
            };
            self.progress.record(record.clone());

            Ok(SectionUpdateOutcome {
                path: path.to_path_buf(),
                applied,
                written,
                progress: record,
            })
        })
    }

    /// The last recorded progress for `path`, or a fresh 0% record.
    pub fn get_update_progress(&self, path: &Path) -> ProgressRecord {
        self.progress.get_or_init(path)
    }

    /// Recompute progress for `path` from the document on disk and store it.
    pub fn refresh_progress(&self, path: &Path, structure: &TemplateStructure) -> ProgressRecord {
        let text = read_document(path);
        let record = ProgressRecord {
            path: path.to_path_buf(),
            progress: compute_progress(&text, structure),
            updated_at: Utc::now(),
        };
        self.progress.record(record.clone());
        record
    }
}

/// Document text. A missing file is empty.
///
/// Bytes that are not UTF-8 are replaced rather than discarding the whole
/// document, since the result is written back. Any other read failure warns
/// and yields an empty document.
fn read_document(path: &Path) -> String {
    match std::fs::read(path) {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => {
                eprintln!(
                    "Warning: '{}' is not valid UTF-8; invalid bytes were replaced",
                    path.display()
                );
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => {
            eprintln!(
                "Warning: failed to read '{}': {}; treating it as empty",
                path.display(),
                e
            );
            String::new()
        }
    }
}
