//! Loading template definitions from disk.
//!
//! Two file layouts are understood:
//!
//! - `.md`: YAML front matter holding the definition's metadata, with the
//!   template body following the closing `---`.
//! - `.yaml` / `.yml`: the whole definition, including `body`.
//!
//! In both cases `id` defaults to the file stem and `name` to the id.

use super::definition::{SectionSpec, TemplateDefinition, VariableSpec};
use crate::error::{DocsmithError, Result};
use crate::markdown::Document;
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Definition fields as written in a template file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TemplateFile {
    id: Option<String>,
    name: Option<String>,
    description: String,
    body: String,
    variables: Vec<VariableSpec>,
    front_matter: BTreeMap<String, serde_yaml::Value>,
    agents: Option<BTreeSet<String>>,
    sections: Vec<SectionSpec>,
}

impl TemplateFile {
    fn into_definition(self, path: &Path) -> Result<TemplateDefinition> {
        let id = match self.id {
            Some(id) => id,
            None => path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(str::to_string)
                .ok_or_else(|| {
                    DocsmithError::UserError(format!(
                        "cannot derive a template id from '{}'",
                        path.display()
                    ))
                })?,
        };

        let definition = TemplateDefinition {
            name: self.name.unwrap_or_else(|| id.clone()),
            id,
            description: self.description,
            body: self.body,
            variables: self.variables,
            front_matter: self.front_matter,
            agents: self.agents,
            sections: self.sections,
        };

        definition.validate()?;
        Ok(definition)
    }
}

/// Load a single template file.
pub fn load_file(path: &Path) -> Result<TemplateDefinition> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        DocsmithError::UserError(format!(
            "failed to read template file '{}': {}",
            path.display(),
            e
        ))
    })?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let file = match extension.as_str() {
        "yaml" | "yml" => serde_yaml::from_str::<TemplateFile>(&content).map_err(|e| {
            DocsmithError::UserError(format!(
                "failed to parse template '{}': {}",
                path.display(),
                e
            ))
        })?,
        _ => parse_markdown_template(&content, path)?,
    };

    file.into_definition(path)
}

fn parse_markdown_template(content: &str, path: &Path) -> Result<TemplateFile> {
    let document = Document::parse(content).map_err(|e| {
        DocsmithError::UserError(format!("template '{}': {}", path.display(), e))
    })?;

    let header = serde_yaml::to_value(&document.front_matter)
        .and_then(serde_yaml::from_value::<TemplateFile>)
        .map_err(|e| {
            DocsmithError::UserError(format!(
                "failed to parse template header in '{}': {}",
                path.display(),
                e
            ))
        })?;

    let body = document
        .body
        .strip_prefix("\r\n")
        .or_else(|| document.body.strip_prefix('\n'))
        .unwrap_or(&document.body)
        .to_string();

    Ok(TemplateFile { body, ..header })
}

/// Compile the configured template file patterns.
pub fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();

    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| {
            DocsmithError::UserError(format!(
                "invalid glob pattern in template_globs: '{}' - {}",
                pattern, e
            ))
        })?;
        builder.add(glob);
    }

    builder
        .build()
        .map_err(|e| DocsmithError::UserError(format!("failed to compile template_globs: {}", e)))
}

/// List template files directly inside `dir` whose names match `globs`,
/// sorted by file name. A missing directory yields an empty list.
pub fn discover(dir: &Path, globs: &GlobSet) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let entries = std::fs::read_dir(dir).map_err(|e| {
        DocsmithError::UserError(format!(
            "failed to read templates directory '{}': {}",
            dir.display(),
            e
        ))
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| !name.starts_with('.') && globs.is_match(name))
        })
        .collect();

    files.sort();
    Ok(files)
}
