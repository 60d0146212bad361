//! The template catalog.

use super::builtin;
use super::definition::TemplateDefinition;
use super::loader::{build_globset, discover, load_file};
use super::render::{RenderContext, RenderResult, render};
use super::structure::TemplateStructure;
use crate::error::{DocsmithError, Result};
use globset::GlobSet;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A directory of external template files.
#[derive(Debug, Clone)]
struct TemplateSource {
    dir: PathBuf,
    globs: GlobSet,
}

/// What a [`TemplateRegistry::reload`] found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReloadReport {
    /// Ids of templates loaded from the source directory.
    pub loaded: Vec<String>,
    /// Files that could not be loaded, with the reason.
    pub skipped: Vec<SkippedTemplate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedTemplate {
    pub path: PathBuf,
    pub reason: String,
}

/// Built-in and external template definitions, keyed by id.
///
/// Built-ins are fixed at construction. External definitions are registered
/// explicitly or read from a source directory by [`reload`](Self::reload); an
/// external definition shadows a built-in with the same id.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    builtins: BTreeMap<String, TemplateDefinition>,
    external: BTreeMap<String, TemplateDefinition>,
    source: Option<TemplateSource>,
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRegistry {
    /// A registry holding only the built-in templates.
    pub fn new() -> Self {
        let builtins = builtin::all()
            .into_iter()
            .map(|definition| (definition.id.clone(), definition))
            .collect();

        Self {
            builtins,
            external: BTreeMap::new(),
            source: None,
        }
    }

    /// A registry that also reads templates from `dir`, selecting files whose
    /// names match one of `patterns`. The directory is read immediately.
    pub fn with_source(dir: impl AsRef<Path>, patterns: &[String]) -> Result<(Self, ReloadReport)> {
        let mut registry = Self::new();
        registry.source = Some(TemplateSource {
            dir: dir.as_ref().to_path_buf(),
            globs: build_globset(patterns)?,
        });
        let report = registry.reload()?;
        Ok((registry, report))
    }

    /// Register an external definition, replacing any existing one with the
    /// same id.
    pub fn register(&mut self, definition: TemplateDefinition) -> Result<()> {
        definition.validate()?;
        self.external.insert(definition.id.clone(), definition);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&TemplateDefinition> {
        self.external.get(id).or_else(|| self.builtins.get(id))
    }

    /// Like [`get`](Self::get), failing with `TemplateNotFound`.
    pub fn require(&self, id: &str) -> Result<&TemplateDefinition> {
        self.get(id)
            .ok_or_else(|| DocsmithError::TemplateNotFound(id.to_string()))
    }

    /// Whether `id` currently resolves to a built-in definition.
    pub fn is_builtin(&self, id: &str) -> bool {
        !self.external.contains_key(id) && self.builtins.contains_key(id)
    }

    /// Every visible definition, sorted by id.
    pub fn list(&self) -> Vec<&TemplateDefinition> {
        let mut ids: Vec<&String> = self.builtins.keys().chain(self.external.keys()).collect();
        ids.sort();
        ids.dedup();
        ids.into_iter().filter_map(|id| self.get(id)).collect()
    }

    /// Definitions usable by `agent`, sorted by id.
    pub fn list_for_agent(&self, agent: &str) -> Vec<&TemplateDefinition> {
        self.list()
            .into_iter()
            .filter(|definition| definition.permits_agent(agent))
            .collect()
    }

    /// Drop every external definition and re-read the source directory.
    ///
    /// Files that fail to load are reported and skipped; they never abort the
    /// reload. Without a source directory this only clears external entries.
    pub fn reload(&mut self) -> Result<ReloadReport> {
        self.external.clear();

        let Some(source) = &self.source else {
            return Ok(ReloadReport::default());
        };

        let mut report = ReloadReport::default();
        for path in discover(&source.dir, &source.globs)? {
            match load_file(&path) {
                Ok(definition) => {
                    report.loaded.push(definition.id.clone());
                    self.external.insert(definition.id.clone(), definition);
                }
                Err(e) => report.skipped.push(SkippedTemplate {
                    path,
                    reason: e.to_string(),
                }),
            }
        }

        Ok(report)
    }

    /// Render template `id` with `context`.
    pub fn render(&self, id: &str, context: &RenderContext) -> Result<RenderResult> {
        render(self.require(id)?, context)
    }

    /// Section layout of template `id`.
    pub fn structure(&self, id: &str) -> Result<TemplateStructure> {
        Ok(TemplateStructure::from_definition(self.require(id)?))
    }
}
