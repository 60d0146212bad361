//! Implementation of the `docsmith render` command.

use super::{load_registry, load_workspace};
use crate::cli::RenderArgs;
use crate::config::Config;
use crate::context::WorkspaceContext;
use crate::error::{DocsmithError, Result};
use crate::events::{self, Event, EventAction};
use crate::fs::atomic_write_file;
use crate::locks::acquire_document_lock;
use crate::template::{RenderContext, TemplateRegistry, VariableKind, VariableValue};
use serde_json::json;
use std::path::Path;

/// Execute the `docsmith render` command.
///
/// `--var` values are parsed according to the declared kind of the variable;
/// undeclared names are bound as strings. The document goes to `--output`
/// when given, else to stdout. An existing output file is only replaced with
/// `--force`.
pub fn cmd_render(args: RenderArgs) -> Result<()> {
    let (ctx, config) = load_workspace()?;
    let registry = load_registry(&ctx, &config)?;

    let document = render_document(&ctx, &config, &registry, &args)?;

    let Some(output) = &args.output else {
        print!("{}", document);
        return Ok(());
    };

    let path = ctx.document_path(output);
    write_rendered(&path, &document, args.force)?;

    events::record(
        &ctx,
        &config,
        Event::new(EventAction::Render)
            .with_document(path.display().to_string())
            .with_details(json!({
                "template": args.template,
                "variables": args.vars.iter().map(|(name, _)| name).collect::<Vec<_>>(),
                "force": args.force,
            })),
    );

    println!("Rendered '{}' to {}", args.template, path.display());
    Ok(())
}

/// Write a rendered document while holding its lock.
///
/// The existence check happens under the lock, so a concurrent `update`
/// either finishes first or fails on the lock.
pub(crate) fn write_rendered(path: &Path, document: &str, force: bool) -> Result<()> {
    let guard = acquire_document_lock(path, "render")?;

    if path.exists() && !force {
        return Err(DocsmithError::UserError(format!(
            "'{}' already exists; use --force to overwrite it",
            path.display()
        )));
    }

    atomic_write_file(path, document)?;
    guard.release()
}

/// Render the requested template to persisted document text.
pub(crate) fn render_document(
    ctx: &WorkspaceContext,
    config: &Config,
    registry: &TemplateRegistry,
    args: &RenderArgs,
) -> Result<String> {
    let definition = registry.require(&args.template)?;

    let mut render_ctx = RenderContext::new(&ctx.root);
    for (name, raw) in &args.vars {
        let kind = definition
            .variable(name)
            .map(|v| v.kind)
            .unwrap_or(VariableKind::String);
        render_ctx = render_ctx.with_binding(name.as_str(), VariableValue::parse_as(kind, raw)?);
    }

    if let Some(author) = args.author.as_ref().or(config.default_author.as_ref()) {
        render_ctx = render_ctx.with_author(author.as_str());
    }

    registry.render(&args.template, &render_ctx)?.to_document()
}
