//! Section layout of a template, as consumed by the update engine.

use super::definition::TemplateDefinition;
use super::substitute::placeholders;
use crate::markdown::{self, normalize_header};
use serde::Serialize;
use std::collections::BTreeMap;

/// Declared metadata for one section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionInfo {
    /// Heading line used when the section has to be created.
    pub heading: String,
    pub required: bool,
    /// Position among the template's sections, starting at 0.
    pub order: u32,
}

/// Where a placeholder lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaceholderInfo {
    /// Title of the nearest preceding heading, if any.
    pub section: Option<String>,
    pub description: String,
}

/// Map of section name to its metadata, plus placeholder ownership.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TemplateStructure {
    pub sections: BTreeMap<String, SectionInfo>,
    pub placeholders: BTreeMap<String, PlaceholderInfo>,
}

impl TemplateStructure {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a section after the ones already present.
    pub fn with_section(mut self, name: &str, required: bool) -> Self {
        let order = self.sections.len() as u32;
        self.sections.insert(
            name.to_string(),
            SectionInfo {
                heading: normalize_header(name),
                required,
                order,
            },
        );
        self
    }

    /// Derive the structure of `definition`.
    ///
    /// Declared sections are used as-is. A template that declares none gets
    /// one required section per heading of level 2 or deeper in its body.
    pub fn from_definition(definition: &TemplateDefinition) -> Self {
        let body_sections = markdown::parse(&definition.body);
        let lines = markdown::split_lines(&definition.body);

        let mut structure = Self::new();

        if definition.sections.is_empty() {
            for section in body_sections.iter().filter(|s| s.level >= 2) {
                if structure.sections.contains_key(&section.title) {
                    continue;
                }
                let heading = lines[section.start_line].trim_end().to_string();
                let order = structure.sections.len() as u32;
                structure.sections.insert(
                    section.title.clone(),
                    SectionInfo {
                        heading,
                        required: true,
                        order,
                    },
                );
            }
        } else {
            for (order, spec) in definition.sections.iter().enumerate() {
                let heading = spec
                    .heading
                    .as_deref()
                    .map(normalize_header)
                    .or_else(|| {
                        markdown::locate(&body_sections, &spec.name)
                            .map(|s| lines[s.start_line].trim_end().to_string())
                    })
                    .unwrap_or_else(|| normalize_header(&spec.name));
                structure.sections.insert(
                    spec.name.clone(),
                    SectionInfo {
                        heading,
                        required: spec.required,
                        order: order as u32,
                    },
                );
            }
        }

        for placeholder in placeholders(&definition.body) {
            if structure.placeholders.contains_key(&placeholder.name) {
                continue;
            }
            let line = definition.body[..placeholder.offset].matches('\n').count();
            let owner = body_sections
                .iter()
                .rev()
                .find(|s| s.start_line < line)
                .map(|s| s.title.clone());
            let description = definition
                .variable(&placeholder.name)
                .map(|v| v.description.clone())
                .unwrap_or_default();
            structure.placeholders.insert(
                placeholder.name,
                PlaceholderInfo {
                    section: owner,
                    description,
                },
            );
        }

        structure
    }

    /// Sections sorted by declared order.
    pub fn ordered(&self) -> Vec<(&str, &SectionInfo)> {
        let mut sections: Vec<(&str, &SectionInfo)> = self
            .sections
            .iter()
            .map(|(name, info)| (name.as_str(), info))
            .collect();
        sections.sort_by_key(|(_, info)| info.order);
        sections
    }

    /// Names of required sections, in declared order.
    pub fn required_sections(&self) -> Vec<&str> {
        self.ordered()
            .into_iter()
            .filter(|(_, info)| info.required)
            .map(|(name, _)| name)
            .collect()
    }

    pub fn order_of(&self, name: &str) -> Option<u32> {
        self.sections.get(name).map(|info| info.order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::builtin;

    #[test]
    fn test_declared_sections() {
        let structure = TemplateStructure::from_definition(&builtin::prd());

        assert_eq!(
            structure.required_sections(),
            vec![
                "Problem Statement",
                "Target Users",
                "Goals",
                "Features",
                "Requirements"
            ]
        );
        assert_eq!(structure.order_of("Target Users"), Some(1));
        assert!(!structure.sections["Open Questions"].required);
        assert_eq!(structure.sections["Goals"].heading, "## Goals");
    }

    #[test]
    fn test_sections_derived_from_body() {
        let mut def = builtin::basic();
        def.body = "# {{title}}\n\n## Context\n\n{{context}}\n\n### Detail\n\n## Decision\n".to_string();
        let structure = TemplateStructure::from_definition(&def);

        assert_eq!(structure.required_sections(), vec!["Context", "Detail", "Decision"]);
        assert_eq!(structure.sections["Detail"].heading, "### Detail");
        assert!(!structure.sections.contains_key("{{title}}"));
    }

    #[test]
    fn test_placeholder_ownership() {
        let mut def = builtin::basic();
        def.body = "{{intro}}\n# {{title}}\n\n## Context\n\n{{context}}\n".to_string();
        let structure = TemplateStructure::from_definition(&def);

        assert_eq!(structure.placeholders["intro"].section, None);
        assert_eq!(structure.placeholders["title"].section, None);
        assert_eq!(structure.placeholders["context"].section.as_deref(), Some("Context"));
        assert_eq!(structure.placeholders["title"].description, "Document title");
    }

    #[test]
    fn test_builder() {
        let structure = TemplateStructure::new()
            .with_section("Problem Statement", true)
            .with_section("Notes", false);

        assert_eq!(structure.required_sections(), vec!["Problem Statement"]);
        assert_eq!(structure.order_of("Notes"), Some(1));
        assert_eq!(structure.order_of("Missing"), None);
    }
}
