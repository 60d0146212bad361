//! Tests for config functionality.

use crate::config::Config;
use crate::config::types::DEFAULT_TEMPLATES_DIR;
use crate::error::DocsmithError;
use crate::update::{ConversationContext, Formatter};
use crate::template::TemplateStructure;
use std::path::Path;
use tempfile::TempDir;

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.templates_dir, DEFAULT_TEMPLATES_DIR);
    assert_eq!(config.template_globs, vec!["*.md", "*.yaml", "*.yml"]);
    assert!(config.default_author.is_none());
    assert_eq!(config.lock_stale_minutes, 120);
    assert!(config.record_events);
    assert!(config.agents.is_empty());
}

#[test]
fn test_parse_minimal_yaml() {
    let config = Config::from_yaml("").unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_parse_partial_yaml() {
    let yaml = r#"
default_author: Dana
record_events: false
"#;
    let config = Config::from_yaml(yaml).unwrap();

    assert_eq!(config.default_author.as_deref(), Some("Dana"));
    assert!(!config.record_events);
    assert_eq!(config.lock_stale_minutes, 120);
    assert_eq!(config.templates_dir, "templates");
}

#[test]
fn test_parse_agents() {
    let yaml = r#"
agents:
  security:
    rules:
      - section: Threat Model
        keywords: [threat, attack]
        formatter: bullet_list
      - section: Mitigations
        keywords: [mitigat]
"#;
    let config = Config::from_yaml(yaml).unwrap();
    let profile = &config.agents["security"];

    assert_eq!(profile.rules.len(), 2);
    assert_eq!(profile.rules[0].formatter, Formatter::BulletList);
    assert_eq!(profile.rules[1].formatter, Formatter::Plain);
}

#[test]
fn test_content_mapper_includes_configured_agents() {
    let yaml = r#"
agents:
  security:
    rules:
      - section: Threat Model
        keywords: [threat]
"#;
    let config = Config::from_yaml(yaml).unwrap();
    let mapper = config.content_mapper();

    let agents: Vec<&str> = mapper.agents().collect();
    assert_eq!(agents, vec!["analyst", "architect", "pm", "security"]);

    let structure = TemplateStructure::new().with_section("Threat Model", true);
    let ctx = ConversationContext::new("security", "design", 1, "doc.md");
    let updates = mapper.map_content_to_sections("One threat is replay.", &structure, &ctx);
    assert!(updates.get("Threat Model").is_some());
}

#[test]
fn test_unknown_fields_ignored() {
    let config = Config::from_yaml("future_option: 1\nlock_stale_minutes: 30\n").unwrap();
    assert_eq!(config.lock_stale_minutes, 30);
}

#[test]
fn test_validation_zero_lock_stale_minutes() {
    let err = Config::from_yaml("lock_stale_minutes: 0").unwrap_err();
    assert!(matches!(err, DocsmithError::UserError(_)));
    assert!(err.to_string().contains("lock_stale_minutes"));
}

#[test]
fn test_validation_empty_globs() {
    let err = Config::from_yaml("template_globs: []").unwrap_err();
    assert!(err.to_string().contains("template_globs"));
}

#[test]
fn test_validation_bad_glob() {
    assert!(Config::from_yaml("template_globs: ['[']").is_err());
}

#[test]
fn test_validation_rule_without_keywords() {
    let yaml = r#"
agents:
  scribe:
    rules:
      - section: Notes
        keywords: []
"#;
    let err = Config::from_yaml(yaml).unwrap_err();
    assert!(err.to_string().contains("no keywords"));
}

#[test]
fn test_invalid_yaml() {
    assert!(Config::from_yaml("lock_stale_minutes: [not, a, number]").is_err());
}

#[test]
fn test_yaml_round_trip() {
    let mut config = Config::default();
    config.default_author = Some("Dana".to_string());

    let yaml = config.to_yaml().unwrap();
    assert_eq!(Config::from_yaml(&yaml).unwrap(), config);
}

#[test]
fn test_load_or_default() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.yaml");

    assert_eq!(Config::load_or_default(&path).unwrap(), Config::default());

    std::fs::write(&path, "lock_stale_minutes: 5\n").unwrap();
    assert_eq!(Config::load_or_default(&path).unwrap().lock_stale_minutes, 5);
}

#[test]
fn test_load_missing_file_fails() {
    let err = Config::load("/nonexistent/config.yaml").unwrap_err();
    assert!(err.to_string().contains("failed to read config file"));
}

#[test]
fn test_templates_path() {
    let config = Config::default();
    assert_eq!(
        config.templates_path(Path::new("/ws/.docsmith")),
        Path::new("/ws/.docsmith/templates")
    );
}
