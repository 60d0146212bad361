//! Built-in templates.
//!
//! These are constructed once per registry and never mutated. Section bodies
//! start out as HTML comments, which do not count as content when measuring
//! progress.

use super::definition::{SectionSpec, TemplateDefinition, VariableSpec};
use serde_yaml::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Every built-in template, in id order.
pub fn all() -> Vec<TemplateDefinition> {
    vec![basic(), design(), prd(), requirements()]
}

/// A minimal titled document.
pub fn basic() -> TemplateDefinition {
    TemplateDefinition {
        id: "basic".to_string(),
        name: "Basic Document".to_string(),
        description: "A titled document with a single free-form body".to_string(),
        body: "# {{title}}\n\n{{content}}\n".to_string(),
        variables: vec![
            VariableSpec::required("title", "Document title"),
            VariableSpec::optional("content", "Document body", "Add your content here..."),
        ],
        front_matter: front_matter("basic"),
        agents: None,
        sections: Vec::new(),
    }
}

/// Product requirements document, co-authored with the `pm` agent.
pub fn prd() -> TemplateDefinition {
    TemplateDefinition {
        id: "prd".to_string(),
        name: "Product Requirements Document".to_string(),
        description: "Problem, users, goals and features of a product increment".to_string(),
        body: "\
# {{title}}

## Problem Statement

<!-- What problem are we solving, and for whom? -->

## Target Users

<!-- Who are the primary users and what do they need? -->

## Goals

<!-- What does success look like? -->

## Features

<!-- One `###` heading per feature. -->

## Requirements

<!-- One requirement per bullet. -->

## Success Metrics

<!-- How will we measure the outcome? -->

## Open Questions

<!-- Anything still undecided. -->
"
        .to_string(),
        variables: standard_variables(),
        front_matter: front_matter("prd"),
        agents: Some(agents(&["pm"])),
        sections: vec![
            SectionSpec::required("Problem Statement"),
            SectionSpec::required("Target Users"),
            SectionSpec::required("Goals"),
            SectionSpec::required("Features"),
            SectionSpec::required("Requirements"),
            SectionSpec::optional("Success Metrics"),
            SectionSpec::optional("Open Questions"),
        ],
    }
}

/// Requirements specification, co-authored with the `analyst` agent.
pub fn requirements() -> TemplateDefinition {
    TemplateDefinition {
        id: "requirements".to_string(),
        name: "Requirements Specification".to_string(),
        description: "Functional and non-functional requirements with their constraints"
            .to_string(),
        body: "\
# {{title}}

## Functional Requirements

<!-- One requirement per bullet. -->

## Non-Functional Requirements

<!-- Performance, security, availability... -->

## Assumptions

<!-- What are we taking for granted? -->

## Constraints

<!-- Budget, schedule, platform or regulatory limits. -->
"
        .to_string(),
        variables: standard_variables(),
        front_matter: front_matter("requirements"),
        agents: Some(agents(&["analyst", "pm"])),
        sections: vec![
            SectionSpec::required("Functional Requirements"),
            SectionSpec::required("Non-Functional Requirements"),
            SectionSpec::optional("Assumptions"),
            SectionSpec::required("Constraints"),
        ],
    }
}

/// Technical design, co-authored with the `architect` agent.
pub fn design() -> TemplateDefinition {
    TemplateDefinition {
        id: "design".to_string(),
        name: "Technical Design".to_string(),
        description: "Architecture, components, data model and risks".to_string(),
        body: "\
# {{title}}

## Architecture Overview

<!-- The shape of the system in a few paragraphs. -->

## Components

<!-- One `###` heading per component. -->

## Data Model

<!-- Entities, schemas and their relationships. -->

## Technology Stack

<!-- Languages, frameworks and infrastructure. -->

## Risks

<!-- What could go wrong, and the mitigation. -->
"
        .to_string(),
        variables: standard_variables(),
        front_matter: front_matter("design"),
        agents: Some(agents(&["architect"])),
        sections: vec![
            SectionSpec::required("Architecture Overview"),
            SectionSpec::required("Components"),
            SectionSpec::required("Data Model"),
            SectionSpec::optional("Technology Stack"),
            SectionSpec::required("Risks"),
        ],
    }
}

fn standard_variables() -> Vec<VariableSpec> {
    vec![
        VariableSpec::required("title", "Document title"),
        VariableSpec::optional("version", "Document version", "0.1"),
        VariableSpec::optional("status", "Review status", "draft"),
    ]
}

fn front_matter(template_id: &str) -> BTreeMap<String, Value> {
    let mut fields = BTreeMap::new();
    fields.insert("title".to_string(), Value::from("{{title}}"));
    fields.insert("template".to_string(), Value::from(template_id));
    if template_id != "basic" {
        fields.insert("version".to_string(), Value::from("{{version}}"));
        fields.insert("status".to_string(), Value::from("{{status}}"));
    }
    fields
}

fn agents(ids: &[&str]) -> BTreeSet<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_validate() {
        for definition in all() {
            definition.validate().unwrap();
        }
    }

    #[test]
    fn test_builtin_ids_are_unique_and_sorted() {
        let ids: Vec<String> = all().into_iter().map(|d| d.id).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn test_declared_sections_exist_in_body() {
        for definition in all() {
            let sections = crate::markdown::parse(&definition.body);
            for spec in &definition.sections {
                assert!(
                    crate::markdown::locate(&sections, &spec.name).is_some(),
                    "{}: section '{}' missing from body",
                    definition.id,
                    spec.name
                );
            }
        }
    }
}
