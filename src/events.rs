//! Event logging subsystem for docsmith.
//!
//! Commands that change workspace state append one NDJSON record (one JSON
//! object per line) to `.docsmith/events/events.ndjson`. The log is the
//! workspace's audit trail: what was rendered or updated, by whom, and when.
//!
//! # Event Format
//!
//! Each event is a JSON object with the following fields:
//! - `ts`: RFC3339 timestamp
//! - `action`: The action performed (init, render, update, reload, lock_clear)
//! - `actor`: The owner string (e.g., `user@HOST`)
//! - `document`: Optional path of the document involved
//! - `details`: Freeform object with action-specific details
//!
//! ```no_run
//! use docsmith::context::WorkspaceContext;
//! use docsmith::events::{Event, EventAction, append_event};
//! use serde_json::json;
//!
//! let ctx = WorkspaceContext::resolve()?;
//! let event = Event::new(EventAction::Render)
//!     .with_document("docs/prd.md")
//!     .with_details(json!({"template": "prd"}));
//! append_event(&ctx, &event)?;
//! # Ok::<(), docsmith::error::DocsmithError>(())
//! ```

use crate::config::Config;
use crate::context::WorkspaceContext;
use crate::error::{DocsmithError, Result};
use crate::locks::get_owner_string;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

/// Actions that can be logged as events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    /// Workspace initialized
    Init,
    /// Template rendered to a document
    Render,
    /// Agent reply applied to a document
    Update,
    /// Workspace templates re-read
    Reload,
    /// Document lock cleared manually
    LockClear,
}

impl std::fmt::Display for EventAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventAction::Init => write!(f, "init"),
            EventAction::Render => write!(f, "render"),
            EventAction::Update => write!(f, "update"),
            EventAction::Reload => write!(f, "reload"),
            EventAction::LockClear => write!(f, "lock_clear"),
        }
    }
}

/// One audit record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub ts: DateTime<Utc>,

    pub action: EventAction,

    /// `user@HOST` of whoever ran the command.
    pub actor: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,

    pub details: Value,
}

impl Event {
    /// Create an event stamped with the current time and actor.
    pub fn new(action: EventAction) -> Self {
        Self {
            ts: Utc::now(),
            action,
            actor: get_owner_string(),
            document: None,
            details: Value::Object(serde_json::Map::new()),
        }
    }

    pub fn with_document(mut self, document: impl Into<String>) -> Self {
        self.document = Some(document.into());
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    /// Serialize the event to a single-line JSON string.
    pub fn to_ndjson_line(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| {
            DocsmithError::UserError(format!("failed to serialize event to JSON: {}", e))
        })
    }
}

pub fn events_file_path(ctx: &WorkspaceContext) -> PathBuf {
    ctx.events_dir().join("events.ndjson")
}

/// Append an event to the events log, creating the file and its directory
/// as needed. Each append writes exactly one line.
pub fn append_event(ctx: &WorkspaceContext, event: &Event) -> Result<()> {
    let events_file = events_file_path(ctx);
    let json_line = event.to_ndjson_line()?;

    let events_dir = ctx.events_dir();
    if !events_dir.exists() {
        fs::create_dir_all(&events_dir).map_err(|e| {
            DocsmithError::UserError(format!(
                "failed to create events directory '{}': {}",
                events_dir.display(),
                e
            ))
        })?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&events_file)
        .map_err(|e| {
            DocsmithError::UserError(format!(
                "failed to open events file '{}': {}",
                events_file.display(),
                e
            ))
        })?;

    writeln!(file, "{}", json_line)
        .and_then(|()| file.sync_all())
        .map_err(|e| {
            DocsmithError::UserError(format!(
                "failed to write event to '{}': {}",
                events_file.display(),
                e
            ))
        })
}

/// Append `event` when the workspace is initialized and `record_events` is on.
///
/// Failures are reported on stderr; the command's own work has already
/// succeeded by the time it is logged.
pub fn record(ctx: &WorkspaceContext, config: &Config, event: Event) {
    if !config.record_events || !ctx.is_initialized() {
        return;
    }
    if let Err(e) = append_event(ctx, &event) {
        eprintln!("Warning: {}", e);
    }
}

/// Read every event in the log, oldest first. A missing log is empty.
pub fn read_events(ctx: &WorkspaceContext) -> Result<Vec<Event>> {
    let events_file = events_file_path(ctx);
    if !events_file.exists() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(&events_file).map_err(|e| {
        DocsmithError::UserError(format!(
            "failed to read events file '{}': {}",
            events_file.display(),
            e
        ))
    })?;

    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(i, line)| {
            serde_json::from_str(line).map_err(|e| {
                DocsmithError::UserError(format!(
                    "malformed event on line {} of '{}': {}",
                    i + 1,
                    events_file.display(),
                    e
                ))
            })
        })
        .collect()
}
