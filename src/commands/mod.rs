//! Command implementations for docsmith.
//!
//! Each submodule implements one top-level command. Commands resolve the
//! workspace from the current directory, load its config and print
//! human-readable output; the library modules do the actual work.

mod init;
mod lock;
mod progress;
mod render;
mod sections;
mod templates;
mod update;

use crate::cli::{Command, LockAction, TemplatesAction};
use crate::config::Config;
use crate::context::WorkspaceContext;
use crate::error::Result;
use crate::template::TemplateRegistry;

pub use init::cmd_init;
pub use lock::{cmd_lock_clear, cmd_lock_show};
pub use progress::cmd_progress;
pub use render::cmd_render;
pub use sections::cmd_sections;
pub use templates::{cmd_templates_list, cmd_templates_reload, cmd_templates_show};
pub use update::cmd_update;

/// Dispatch a command to its implementation.
pub fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Init => cmd_init(),
        Command::Templates(cmd) => match cmd.action {
            TemplatesAction::List(args) => cmd_templates_list(args),
            TemplatesAction::Show(args) => cmd_templates_show(args),
            TemplatesAction::Reload => cmd_templates_reload(),
        },
        Command::Render(args) => cmd_render(args),
        Command::Update(args) => cmd_update(args),
        Command::Progress(args) => cmd_progress(args),
        Command::Sections(args) => cmd_sections(args),
        Command::Lock(cmd) => match cmd.action {
            LockAction::Show(args) => cmd_lock_show(args),
            LockAction::Clear(args) => cmd_lock_clear(args),
        },
    }
}

/// Resolve the workspace from the current directory and load its config.
pub(crate) fn load_workspace() -> Result<(WorkspaceContext, Config)> {
    let ctx = WorkspaceContext::resolve()?;
    let config = ctx.load_config()?;
    Ok((ctx, config))
}

/// Build the registry from built-ins plus the workspace templates directory.
///
/// Template files that fail to load are reported on stderr and skipped.
pub(crate) fn load_registry(ctx: &WorkspaceContext, config: &Config) -> Result<TemplateRegistry> {
    let (registry, report) =
        TemplateRegistry::with_source(ctx.templates_dir(config), &config.template_globs)?;
    for skipped in &report.skipped {
        eprintln!(
            "Warning: skipped template '{}': {}",
            skipped.path.display(),
            skipped.reason
        );
    }
    Ok(registry)
}
