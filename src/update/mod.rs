//! Document update engine.
//!
//! Turns free-form agent replies into targeted section edits:
//!
//! 1. [`ContentMapper`] extracts per-section text from a reply using the
//!    agent's keyword profile and assigns each update a mode and priority.
//! 2. [`DocumentUpdater`] applies a batch of updates to one document through
//!    the section model, persists it atomically and refreshes the document's
//!    [`ProgressRecord`].
//!
//! The engine never parses templates itself; callers pass the
//! [`TemplateStructure`](crate::template::TemplateStructure) of the template
//! the document was rendered from.

mod engine;
mod extract;
mod mapper;
mod progress;
mod types;

#[cfg(test)]
mod tests;

pub use engine::DocumentUpdater;
pub use extract::{ExtractionProfile, Formatter, KeywordRule, builtin_profiles};
pub use mapper::ContentMapper;
pub use progress::{ProgressRecord, ProgressStore, SectionProgress, compute_progress};
pub use types::{
    AppliedUpdate, ConversationContext, SectionUpdateOutcome, SectionUpdateSpec, SectionUpdates,
};
