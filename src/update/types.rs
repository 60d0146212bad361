//! Value types shared by the update engine.

use super::progress::ProgressRecord;
use crate::markdown::UpdateMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where a conversation stands. Read-only to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationContext {
    pub agent_id: String,
    pub template_id: String,
    /// Turn counter, starting at 1.
    pub turn: u32,
    /// Prior agent replies, oldest first.
    #[serde(default)]
    pub history: Vec<String>,
    pub document_path: PathBuf,
}

impl ConversationContext {
    pub fn new(agent_id: &str, template_id: &str, turn: u32, document_path: impl AsRef<Path>) -> Self {
        Self {
            agent_id: agent_id.to_string(),
            template_id: template_id.to_string(),
            turn,
            history: Vec::new(),
            document_path: document_path.as_ref().to_path_buf(),
        }
    }

    pub fn with_history(mut self, history: Vec<String>) -> Self {
        self.history = history;
        self
    }

    pub fn is_first_turn(&self) -> bool {
        self.turn <= 1
    }
}

/// One edit against one section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionUpdateSpec {
    pub section: String,
    pub content: String,
    pub mode: UpdateMode,
    /// Lower values are applied first.
    #[serde(default)]
    pub priority: u32,
}

impl SectionUpdateSpec {
    pub fn new(section: &str, content: &str, mode: UpdateMode, priority: u32) -> Self {
        Self {
            section: section.to_string(),
            content: content.to_string(),
            mode,
            priority,
        }
    }
}

/// Updates produced from one reply, ordered by priority.
///
/// At most one update exists per section name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SectionUpdates(Vec<SectionUpdateSpec>);

impl SectionUpdates {
    pub(crate) fn from_unordered(mut updates: Vec<SectionUpdateSpec>) -> Self {
        updates.sort_by_key(|u| u.priority);
        Self(updates)
    }

    pub fn get(&self, section: &str) -> Option<&SectionUpdateSpec> {
        self.0.iter().find(|u| u.section == section)
    }

    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|u| u.section.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SectionUpdateSpec> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[SectionUpdateSpec] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a SectionUpdates {
    type Item = &'a SectionUpdateSpec;
    type IntoIter = std::slice::Iter<'a, SectionUpdateSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// An update as it was actually applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedUpdate {
    pub section: String,
    pub mode: UpdateMode,
    /// The section did not exist and was appended to the document.
    pub created: bool,
}

/// Result of [`DocumentUpdater::apply_section_updates`](super::DocumentUpdater::apply_section_updates).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionUpdateOutcome {
    pub path: PathBuf,
    /// In application order.
    pub applied: Vec<AppliedUpdate>,
    /// Whether the document on disk changed.
    pub written: bool,
    pub progress: ProgressRecord,
}
