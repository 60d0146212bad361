//! Template rendering.
//!
//! Rendering is all-or-nothing and referentially transparent: the current
//! timestamp is part of the [`RenderContext`], so the same definition and the
//! same context always produce byte-identical output.
//!
//! Binding precedence, highest first:
//!
//! 1. Values supplied in the context
//! 2. Template defaults for variables not supplied
//! 3. Reserved values: `currentDate`, `currentDateTime`, `workspaceRoot`, `author`
//!
//! Reserved values are only injected when the name is still unbound, so a
//! template's own variable (or an explicit `author` binding) shadows them.

use super::definition::{TemplateDefinition, VariableSpec, VariableValue};
use super::substitute::substitute;
use crate::error::{DocsmithError, Result};
use crate::markdown::compose;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Author used when neither the bindings nor the context name one.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Reserved variable names injected by the renderer.
pub const RESERVED_VARIABLES: &[&str] = &["currentDate", "currentDateTime", "workspaceRoot", "author"];

/// Inputs for a single render call.
#[derive(Debug, Clone)]
pub struct RenderContext {
    /// Caller-supplied variable bindings.
    pub bindings: BTreeMap<String, VariableValue>,
    /// Workspace root, exposed to templates as `workspaceRoot`.
    pub workspace_root: PathBuf,
    /// Timestamp used for `currentDate`, `currentDateTime` and `created`.
    pub now: DateTime<Utc>,
    /// Caller identity, used for `author` when not bound explicitly.
    pub author: Option<String>,
}

impl RenderContext {
    /// Create a context rooted at `workspace_root`, stamped with the current time.
    pub fn new(workspace_root: impl AsRef<Path>) -> Self {
        Self {
            bindings: BTreeMap::new(),
            workspace_root: workspace_root.as_ref().to_path_buf(),
            now: Utc::now(),
            author: None,
        }
    }

    pub fn with_binding(mut self, name: impl Into<String>, value: impl Into<VariableValue>) -> Self {
        self.bindings.insert(name.into(), value.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Pin the render timestamp.
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }
}

/// Snapshot of the template a result was rendered from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateMetadata {
    pub id: String,
    pub name: String,
    pub description: String,
    pub variables: Vec<VariableSpec>,
}

impl From<&TemplateDefinition> for TemplateMetadata {
    fn from(definition: &TemplateDefinition) -> Self {
        Self {
            id: definition.id.clone(),
            name: definition.name.clone(),
            description: definition.description.clone(),
            variables: definition.variables.clone(),
        }
    }
}

/// The output of a successful render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderResult {
    /// Rendered body text.
    pub body: String,
    /// Resolved front matter.
    pub front_matter: BTreeMap<String, Value>,
    /// Metadata of the source template.
    pub template: TemplateMetadata,
}

impl RenderResult {
    /// Compose the persisted document: front-matter block, blank line, body.
    pub fn to_document(&self) -> Result<String> {
        if self.front_matter.is_empty() || self.body.is_empty() || self.body.starts_with('\n') {
            compose(&self.front_matter, &self.body)
        } else {
            compose(&self.front_matter, &format!("\n{}", self.body))
        }
    }
}

/// Render `definition` with `context`.
pub fn render(definition: &TemplateDefinition, context: &RenderContext) -> Result<RenderResult> {
    let missing: Vec<String> = definition
        .variables
        .iter()
        .filter(|v| v.required && v.default.is_none() && !context.bindings.contains_key(&v.name))
        .map(|v| v.name.clone())
        .collect();

    if !missing.is_empty() {
        return Err(DocsmithError::MissingRequiredVariables(missing));
    }

    let merged = merge_bindings(definition, context);
    let text_bindings: BTreeMap<String, String> = merged
        .iter()
        .map(|(name, value)| (name.clone(), value.to_string()))
        .collect();

    let body = substitute(&definition.body, &text_bindings);

    let mut front_matter: BTreeMap<String, Value> = definition
        .front_matter
        .iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => Value::String(substitute(s, &text_bindings)),
                other => other.clone(),
            };
            (key.clone(), value)
        })
        .collect();

    let title = text_bindings
        .get("title")
        .cloned()
        .unwrap_or_else(|| definition.name.clone());
    let created = text_bindings
        .get("currentDateTime")
        .cloned()
        .unwrap_or_else(|| timestamp(&context.now));
    let author = text_bindings
        .get("author")
        .cloned()
        .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());

    front_matter.insert("title".to_string(), Value::String(title));
    front_matter.insert("created".to_string(), Value::String(created));
    front_matter.insert("author".to_string(), Value::String(author));

    Ok(RenderResult {
        body,
        front_matter,
        template: TemplateMetadata::from(definition),
    })
}

fn merge_bindings(
    definition: &TemplateDefinition,
    context: &RenderContext,
) -> BTreeMap<String, VariableValue> {
    let mut merged = context.bindings.clone();

    for variable in &definition.variables {
        if let Some(default) = &variable.default {
            merged
                .entry(variable.name.clone())
                .or_insert_with(|| default.clone());
        }
    }

    let reserved = [
        ("currentDate", VariableValue::Date(context.now.date_naive())),
        ("currentDateTime", VariableValue::String(timestamp(&context.now))),
        (
            "workspaceRoot",
            VariableValue::String(context.workspace_root.display().to_string()),
        ),
        (
            "author",
            VariableValue::String(
                context
                    .author
                    .clone()
                    .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
            ),
        ),
    ];
    for (name, value) in reserved {
        merged.entry(name.to_string()).or_insert(value);
    }

    merged
}

fn timestamp(now: &DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Secs, true)
}
