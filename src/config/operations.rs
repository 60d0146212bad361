//! Config loading, validation, and utility operations.

use super::model::Config;
use crate::error::{DocsmithError, Result};
use crate::update::ContentMapper;
use std::path::{Path, PathBuf};

impl Config {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully loaded and validated config
    /// * `Err(DocsmithError::UserError)` - Read error, parse error or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            DocsmithError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Load config from `path`, falling back to defaults when the file does
    /// not exist.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml).map_err(|e| {
            DocsmithError::UserError(format!("failed to parse config YAML: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            DocsmithError::UserError(format!("failed to serialize config to YAML: {}", e))
        })
    }

    /// Validate config values.
    ///
    /// Validation rules:
    /// - `lock_stale_minutes` must be positive
    /// - `templates_dir` must be non-empty
    /// - `template_globs` must be non-empty and compile
    /// - every agent rule needs a section and at least one keyword
    pub fn validate(&self) -> Result<()> {
        if self.lock_stale_minutes == 0 {
            return Err(DocsmithError::UserError(
                "config validation failed: lock_stale_minutes must be greater than 0".to_string(),
            ));
        }

        if self.templates_dir.trim().is_empty() {
            return Err(DocsmithError::UserError(
                "config validation failed: templates_dir must be non-empty".to_string(),
            ));
        }

        if self.template_globs.is_empty() {
            return Err(DocsmithError::UserError(
                "config validation failed: template_globs must list at least one pattern"
                    .to_string(),
            ));
        }
        crate::template::build_globset(&self.template_globs)?;

        for (agent, profile) in &self.agents {
            for rule in &profile.rules {
                if rule.section.trim().is_empty() {
                    return Err(DocsmithError::UserError(format!(
                        "config validation failed: agent '{}' has a rule without a section",
                        agent
                    )));
                }
                if rule.keywords.iter().all(|k| k.trim().is_empty()) {
                    return Err(DocsmithError::UserError(format!(
                        "config validation failed: agent '{}' rule for '{}' has no keywords",
                        agent, rule.section
                    )));
                }
            }
        }

        Ok(())
    }

    /// Templates directory resolved against the `.docsmith/` directory.
    pub fn templates_path(&self, docsmith_dir: &Path) -> PathBuf {
        docsmith_dir.join(&self.templates_dir)
    }

    /// A mapper carrying the built-in profiles plus the configured ones.
    pub fn content_mapper(&self) -> ContentMapper {
        self.agents
            .iter()
            .fold(ContentMapper::new(), |mapper, (agent, profile)| {
                mapper.with_profile(agent, profile.clone())
            })
    }
}
