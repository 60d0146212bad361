//! Implementation of the `docsmith init` command.
//!
//! # What `docsmith init` does
//!
//! 1. Creates `.docsmith/` in the current directory
//! 2. Writes a default `config.yaml` (if missing)
//! 3. Creates the templates directory named by the config
//! 4. Creates `events/` and logs an `init` event
//!
//! The command is idempotent: existing files are left untouched.

use crate::config::Config;
use crate::context::{DOCSMITH_DIR, WorkspaceContext};
use crate::error::{DocsmithError, Result};
use crate::events::{self, Event, EventAction};
use crate::fs::atomic_write_file;
use serde_json::json;
use std::env;
use std::fs;
use std::path::Path;

/// Execute the `docsmith init` command.
pub fn cmd_init() -> Result<()> {
    let cwd = env::current_dir().map_err(|e| {
        DocsmithError::UserError(format!("failed to get current working directory: {}", e))
    })?;

    let ctx = init_workspace(&cwd)?;

    println!("Initialized docsmith workspace.");
    println!();
    println!("Workspace root: {}", ctx.root.display());
    println!("Config:         {}", ctx.config_path().display());
    println!();
    println!("Add your own templates to .docsmith/templates/ or render a built-in one:");
    println!("  docsmith render prd --var title=\"My Product\" -o docs/prd.md");

    Ok(())
}

/// Create the workspace scaffolding under `dir` and return its context.
pub(crate) fn init_workspace(dir: &Path) -> Result<WorkspaceContext> {
    let docsmith_dir = dir.join(DOCSMITH_DIR);
    create_dir(&docsmith_dir)?;

    let ctx = WorkspaceContext::resolve_from(dir)?;

    let config_path = ctx.config_path();
    let created_config = !config_path.exists();
    if created_config {
        atomic_write_file(&config_path, &Config::default().to_yaml()?)?;
    }

    // An existing config may name a different templates directory.
    let config = ctx.load_config()?;
    create_dir(&ctx.templates_dir(&config))?;
    create_dir(&ctx.events_dir())?;

    events::record(
        &ctx,
        &config,
        Event::new(EventAction::Init).with_details(json!({
            "root": ctx.root.display().to_string(),
            "created_config": created_config,
        })),
    );

    Ok(ctx)
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| {
        DocsmithError::UserError(format!(
            "failed to create directory '{}': {}",
            path.display(),
            e
        ))
    })
}
