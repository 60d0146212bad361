//! Implementation of the `docsmith update` command.
//!
//! Reads an agent reply, maps it onto the template's sections with the
//! agent's extraction profile and merges the result into the document.

use super::{load_registry, load_workspace};
use crate::cli::UpdateArgs;
use crate::config::Config;
use crate::context::WorkspaceContext;
use crate::error::{DocsmithError, Result};
use crate::events::{self, Event, EventAction};
use crate::template::TemplateRegistry;
use crate::update::{ConversationContext, DocumentUpdater, SectionUpdateOutcome};
use serde_json::json;
use std::io;

/// Execute the `docsmith update` command.
pub fn cmd_update(args: UpdateArgs) -> Result<()> {
    let (ctx, config) = load_workspace()?;
    let registry = load_registry(&ctx, &config)?;

    let reply = read_reply(&args)?;

    let Some(outcome) = update_document(&ctx, &config, &registry, &args, &reply)? else {
        println!("No content matched the sections of '{}'; document unchanged.", args.template);
        return Ok(());
    };

    if !outcome.written {
        println!("{} is already up to date.", outcome.path.display());
    } else {
        println!("Updated {}", outcome.path.display());
        for applied in &outcome.applied {
            let note = if applied.created { " (new section)" } else { "" };
            println!("  {:<8} {}{}", applied.mode.to_string(), applied.section, note);
        }
    }
    println!();
    println!("Progress: {}%", outcome.progress.percent());

    Ok(())
}

fn read_reply(args: &UpdateArgs) -> Result<String> {
    match &args.content_file {
        Some(path) => std::fs::read_to_string(path).map_err(|e| {
            DocsmithError::UserError(format!(
                "failed to read content file '{}': {}",
                path.display(),
                e
            ))
        }),
        None => io::read_to_string(io::stdin())
            .map_err(|e| DocsmithError::UserError(format!("failed to read stdin: {}", e))),
    }
}

/// Map `reply` onto the template's sections and apply it.
///
/// Returns `None` when nothing in the reply matched a section.
pub(crate) fn update_document(
    ctx: &WorkspaceContext,
    config: &Config,
    registry: &TemplateRegistry,
    args: &UpdateArgs,
    reply: &str,
) -> Result<Option<SectionUpdateOutcome>> {
    let definition = registry.require(&args.template)?;
    if !definition.permits_agent(&args.agent) {
        eprintln!(
            "Warning: template '{}' is not declared for agent '{}'",
            args.template, args.agent
        );
    }

    let structure = registry.structure(&args.template)?;
    let path = ctx.document_path(&args.doc);
    let conversation = ConversationContext::new(&args.agent, &args.template, args.turn, &path);

    let updates = config
        .content_mapper()
        .map_content_to_sections(reply, &structure, &conversation);
    if updates.is_empty() {
        return Ok(None);
    }

    let outcome = DocumentUpdater::new().apply_section_updates(&path, updates.as_slice(), &structure)?;

    if outcome.written {
        events::record(
            ctx,
            config,
            Event::new(EventAction::Update)
                .with_document(path.display().to_string())
                .with_details(json!({
                    "template": args.template,
                    "agent": args.agent,
                    "turn": args.turn,
                    "sections": updates.sections().collect::<Vec<_>>(),
                    "progress": outcome.progress.percent(),
                })),
        );
    }

    Ok(Some(outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::read_events;
    use crate::locks::acquire_document_lock;
    use crate::template::RenderContext;
    use crate::test_support::{DirGuard, create_test_workspace};
    use serial_test::serial;
    use std::path::PathBuf;

    fn update_args(doc: &str, turn: u32) -> UpdateArgs {
        UpdateArgs {
            doc: PathBuf::from(doc),
            template: "prd".to_string(),
            agent: "pm".to_string(),
            turn,
            content_file: None,
        }
    }

    fn render_prd(ctx: &WorkspaceContext, doc: &str) {
        let registry = TemplateRegistry::new();
        let text = registry
            .render("prd", &RenderContext::new(&ctx.root).with_binding("title", "Checkout"))
            .unwrap()
            .to_document()
            .unwrap();
        std::fs::write(ctx.root.join(doc), text).unwrap();
    }

    #[test]
    fn test_update_document_fills_sections() {
        let temp = create_test_workspace();
        let ctx = WorkspaceContext::resolve_from(temp.path()).unwrap();
        render_prd(&ctx, "prd.md");

        let outcome = update_document(
            &ctx,
            &Config::default(),
            &TemplateRegistry::new(),
            &update_args("prd.md", 1),
            "The problem is that checkout takes too long.\n\nOur target users are mobile shoppers.",
        )
        .unwrap()
        .unwrap();

        assert!(outcome.written);
        let text = std::fs::read_to_string(temp.path().join("prd.md")).unwrap();
        assert!(text.contains("checkout takes too long"));
        assert!(text.contains("mobile shoppers"));
        assert!(outcome.progress.percent() > 0);

        let events = read_events(&ctx).unwrap();
        let last = events.last().unwrap();
        assert_eq!(last.action, EventAction::Update);
        assert_eq!(last.details["agent"], "pm");
    }

    #[test]
    fn test_update_document_nothing_matched() {
        let temp = create_test_workspace();
        let ctx = WorkspaceContext::resolve_from(temp.path()).unwrap();
        render_prd(&ctx, "prd.md");
        let before = std::fs::read_to_string(temp.path().join("prd.md")).unwrap();

        let outcome = update_document(
            &ctx,
            &Config::default(),
            &TemplateRegistry::new(),
            &update_args("prd.md", 1),
            "",
        )
        .unwrap();

        assert!(outcome.is_none());
        let after = std::fs::read_to_string(temp.path().join("prd.md")).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_update_document_fails_on_held_lock() {
        let temp = create_test_workspace();
        let ctx = WorkspaceContext::resolve_from(temp.path()).unwrap();
        render_prd(&ctx, "prd.md");
        let _held = acquire_document_lock(&temp.path().join("prd.md"), "test").unwrap();

        let err = update_document(
            &ctx,
            &Config::default(),
            &TemplateRegistry::new(),
            &update_args("prd.md", 1),
            "The problem is latency.",
        )
        .unwrap_err();

        assert_eq!(err.exit_code(), crate::exit_codes::LOCK_FAILURE);
    }

    #[test]
    #[serial]
    fn test_cmd_update_reads_content_file() {
        let temp = create_test_workspace();
        let _guard = DirGuard::new(temp.path());
        let ctx = WorkspaceContext::resolve().unwrap();
        render_prd(&ctx, "prd.md");
        std::fs::write(temp.path().join("reply.txt"), "Goals: ship by spring.\n").unwrap();

        let mut args = update_args("prd.md", 2);
        args.content_file = Some(PathBuf::from("reply.txt"));
        cmd_update(args).unwrap();

        let text = std::fs::read_to_string(temp.path().join("prd.md")).unwrap();
        assert!(text.contains("ship by spring"));
    }

    #[test]
    #[serial]
    fn test_cmd_update_missing_content_file() {
        let temp = create_test_workspace();
        let _guard = DirGuard::new(temp.path());

        let mut args = update_args("prd.md", 1);
        args.content_file = Some(PathBuf::from("missing.txt"));
        let err = cmd_update(args).unwrap_err();

        assert!(matches!(err, DocsmithError::UserError(_)));
    }
}
