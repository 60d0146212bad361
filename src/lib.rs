//! Docsmith: template-anchored Markdown documents for agent-assisted authoring.
//!
//! Templates render into documents with named sections ([`template`]). The
//! section model ([`markdown`]) locates and splices those sections without
//! disturbing the rest of the text, and the update engine ([`update`]) maps
//! agent replies onto sections and tracks how many required sections have
//! content.

pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod exit_codes;
pub mod fs;
pub mod locks;
pub mod markdown;
pub mod template;
pub mod update;

#[cfg(test)]
mod test_support;
