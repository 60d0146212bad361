//! Config struct definition and default implementation.

use super::types::*;
use crate::update::ExtractionProfile;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Configuration for a docsmith workspace.
///
/// This struct represents the contents of `.docsmith/config.yaml`.
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // =========================================================================
    // Templates
    // =========================================================================
    /// Directory holding workspace templates, relative to `.docsmith/`.
    #[serde(default = "default_templates_dir")]
    pub templates_dir: String,

    /// File name patterns selecting template files in `templates_dir`.
    #[serde(default = "default_template_globs")]
    pub template_globs: Vec<String>,

    /// Author recorded in rendered front matter when `--author` is not given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_author: Option<String>,

    // =========================================================================
    // Locks and events
    // =========================================================================
    /// Minutes after which a document lock is considered stale.
    #[serde(default = "default_lock_stale_minutes")]
    pub lock_stale_minutes: u32,

    /// Whether commands append to `.docsmith/events/events.ndjson`.
    #[serde(default = "default_true")]
    pub record_events: bool,

    // =========================================================================
    // Agents
    // =========================================================================
    /// Extraction profiles by agent id. These add to the built-in `pm`,
    /// `analyst` and `architect` profiles, replacing any with the same id.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub agents: BTreeMap<String, ExtractionProfile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            templates_dir: default_templates_dir(),
            template_globs: default_template_globs(),
            default_author: None,
            lock_stale_minutes: default_lock_stale_minutes(),
            record_events: default_true(),
            agents: BTreeMap::new(),
        }
    }
}
