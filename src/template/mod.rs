//! Template registry and renderer.
//!
//! A template is a Markdown body with `{{name}}` placeholders, a set of
//! declared variables and a front-matter skeleton. The registry resolves
//! template ids; [`render`] turns a definition plus a [`RenderContext`] into
//! document text.

pub mod builtin;
mod definition;
mod loader;
mod registry;
mod render;
mod structure;
mod substitute;

pub use definition::{SectionSpec, TemplateDefinition, VariableKind, VariableSpec, VariableValue};
pub use loader::{build_globset, load_file};
pub use registry::{ReloadReport, SkippedTemplate, TemplateRegistry};
pub use render::{
    RESERVED_VARIABLES, RenderContext, RenderResult, TemplateMetadata, UNKNOWN_AUTHOR, render,
};
pub use structure::{PlaceholderInfo, SectionInfo, TemplateStructure};
pub use substitute::{Placeholder, placeholders, substitute};
