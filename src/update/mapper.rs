//! Mapping agent replies onto template sections.

use super::extract::{ExtractionProfile, builtin_profiles};
use super::types::{ConversationContext, SectionUpdateSpec, SectionUpdates};
use crate::markdown::{UpdateMode, match_rank};
use crate::template::TemplateStructure;
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Turns free-form replies into [`SectionUpdates`].
#[derive(Debug, Clone)]
pub struct ContentMapper {
    profiles: BTreeMap<String, ExtractionProfile>,
}

impl Default for ContentMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentMapper {
    /// A mapper with the built-in `pm`, `analyst` and `architect` profiles.
    pub fn new() -> Self {
        Self {
            profiles: builtin_profiles(),
        }
    }

    /// Add or replace the profile for `agent`.
    pub fn with_profile(mut self, agent: &str, profile: ExtractionProfile) -> Self {
        self.profiles.insert(agent.to_string(), profile);
        self
    }

    pub fn agents(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    /// The profile `agent` uses against `structure`.
    pub fn profile_for<'a>(
        &'a self,
        agent: &str,
        structure: &TemplateStructure,
    ) -> Cow<'a, ExtractionProfile> {
        match self.profiles.get(agent) {
            Some(profile) => Cow::Borrowed(profile),
            None => Cow::Owned(ExtractionProfile::from_structure(structure)),
        }
    }

    /// Extract section updates from `content`.
    ///
    /// Section names are resolved against the structure where possible, so a
    /// rule for "Requirements" updates the template's "Functional
    /// Requirements" when that is the closest declared section. Priority is
    /// the declared order; sections the structure does not declare sort after
    /// every declared one.
    pub fn map_content_to_sections(
        &self,
        content: &str,
        structure: &TemplateStructure,
        context: &ConversationContext,
    ) -> SectionUpdates {
        let profile = self.profile_for(&context.agent_id, structure);
        let declared = structure.sections.len() as u32;
        let rule_index: BTreeMap<&str, u32> = profile
            .rules
            .iter()
            .enumerate()
            .map(|(i, rule)| (rule.section.as_str(), i as u32))
            .collect();

        let mut merged: BTreeMap<String, SectionUpdateSpec> = BTreeMap::new();

        for (rule_section, text) in profile.extract(content) {
            let section = resolve_section(structure, &rule_section).unwrap_or(rule_section.as_str());
            let priority = structure.order_of(section).unwrap_or_else(|| {
                declared + rule_index.get(rule_section.as_str()).copied().unwrap_or(0)
            });

            merged
                .entry(section.to_string())
                .and_modify(|existing| {
                    existing.content.push_str("\n\n");
                    existing.content.push_str(&text);
                    existing.priority = existing.priority.min(priority);
                })
                .or_insert_with(|| SectionUpdateSpec {
                    mode: self.determine_update_mode(section, context),
                    section: section.to_string(),
                    content: text,
                    priority,
                });
        }

        SectionUpdates::from_unordered(merged.into_values().collect())
    }

    /// Turn 1 replaces a section's placeholder text; later turns append.
    pub fn determine_update_mode(&self, _section: &str, context: &ConversationContext) -> UpdateMode {
        if context.is_first_turn() {
            UpdateMode::Replace
        } else {
            UpdateMode::Append
        }
    }
}

/// The declared section best matching `name`; ties go to declared order.
fn resolve_section<'a>(structure: &'a TemplateStructure, name: &str) -> Option<&'a str> {
    structure
        .ordered()
        .into_iter()
        .filter_map(|(declared, info)| {
            match_rank(declared, name).map(|rank| (rank, info.order, declared))
        })
        .min()
        .map(|(_, _, declared)| declared)
}
