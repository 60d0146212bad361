//! Default values for config fields.

/// Templates directory, relative to `.docsmith/`.
pub const DEFAULT_TEMPLATES_DIR: &str = "templates";

pub fn default_templates_dir() -> String {
    DEFAULT_TEMPLATES_DIR.to_string()
}

pub fn default_template_globs() -> Vec<String> {
    vec!["*.md".to_string(), "*.yaml".to_string(), "*.yml".to_string()]
}

pub fn default_lock_stale_minutes() -> u32 {
    120
}

pub fn default_true() -> bool {
    true
}
