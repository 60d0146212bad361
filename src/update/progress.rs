//! Completion tracking.
//!
//! A required section is satisfied when the document has a matching heading
//! whose content run holds something other than whitespace and HTML comments.

use crate::markdown::{self, locate};
use crate::template::TemplateStructure;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Required versus satisfied sections of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionProgress {
    pub required: Vec<String>,
    pub satisfied: Vec<String>,
    /// `satisfied / required * 100`, rounded down; 100 when nothing is required.
    pub percent: u8,
}

impl SectionProgress {
    /// Required sections not yet satisfied, in declared order.
    pub fn missing(&self) -> Vec<&str> {
        self.required
            .iter()
            .filter(|name| !self.satisfied.contains(name))
            .map(String::as_str)
            .collect()
    }
}

/// Progress of one document, as last computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub path: PathBuf,
    #[serde(flatten)]
    pub progress: SectionProgress,
    pub updated_at: DateTime<Utc>,
}

impl ProgressRecord {
    /// A 0% record for a document nothing is known about yet.
    pub fn empty(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            progress: SectionProgress::default(),
            updated_at: Utc::now(),
        }
    }

    pub fn percent(&self) -> u8 {
        self.progress.percent
    }
}

/// Compute progress of `text` against the required sections of `structure`.
pub fn compute_progress(text: &str, structure: &TemplateStructure) -> SectionProgress {
    let sections = markdown::parse(text);
    let lines = markdown::split_lines(text);

    let required: Vec<String> = structure
        .required_sections()
        .into_iter()
        .map(str::to_string)
        .collect();

    let satisfied: Vec<String> = required
        .iter()
        .filter(|name| locate(&sections, name).is_some_and(|s| s.has_content(&lines)))
        .cloned()
        .collect();

    let percent = if required.is_empty() {
        100
    } else {
        (satisfied.len() * 100 / required.len()) as u8
    };

    SectionProgress {
        required,
        satisfied,
        percent,
    }
}

/// Process-lifetime progress records, keyed by absolute document path.
#[derive(Debug, Default)]
pub struct ProgressStore {
    records: Mutex<HashMap<PathBuf, ProgressRecord>>,
}

impl ProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The record for `path`, inserting a 0% record on first query.
    pub fn get_or_init(&self, path: &Path) -> ProgressRecord {
        let mut records = self.records.lock().unwrap_or_else(|p| p.into_inner());
        records
            .entry(key(path))
            .or_insert_with(|| ProgressRecord::empty(path))
            .clone()
    }

    pub fn get(&self, path: &Path) -> Option<ProgressRecord> {
        let records = self.records.lock().unwrap_or_else(|p| p.into_inner());
        records.get(&key(path)).cloned()
    }

    pub fn record(&self, record: ProgressRecord) {
        let mut records = self.records.lock().unwrap_or_else(|p| p.into_inner());
        records.insert(key(&record.path), record);
    }

    pub fn clear(&self, path: &Path) -> Option<ProgressRecord> {
        let mut records = self.records.lock().unwrap_or_else(|p| p.into_inner());
        records.remove(&key(path))
    }
}

fn key(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
