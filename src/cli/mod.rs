//! CLI argument parsing for docsmith.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Docsmith: template-driven Markdown documents that grow section by section.
///
/// Templates render into documents with named sections. Agent replies are
/// mapped onto those sections and merged in, and progress is tracked as the
/// share of required sections that have content.
#[derive(Parser, Debug)]
#[command(name = "docsmith")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for docsmith.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize a docsmith workspace in the current directory.
    ///
    /// Creates `.docsmith/` with a default config.yaml, a templates/
    /// directory for user templates, and the events log directory.
    Init,

    /// Inspect the template registry.
    Templates(TemplatesCommand),

    /// Render a template to a document.
    ///
    /// Prints to stdout unless --output is given.
    Render(RenderArgs),

    /// Merge an agent reply into a document.
    ///
    /// The reply is read from --content-file, or from stdin when no file
    /// is given, and split across the template's sections.
    Update(UpdateArgs),

    /// Show section completion for a document.
    Progress(ProgressArgs),

    /// List the sections of a Markdown document.
    Sections(SectionsArgs),

    /// Inspect or clear document lock files.
    Lock(LockCommand),
}

/// Template subcommands.
#[derive(Parser, Debug)]
pub struct TemplatesCommand {
    #[command(subcommand)]
    pub action: TemplatesAction,
}

/// Available template actions.
#[derive(Subcommand, Debug)]
pub enum TemplatesAction {
    /// List available templates.
    List(TemplatesListArgs),

    /// Show a template's variables and sections.
    Show(TemplatesShowArgs),

    /// Re-read user templates and report what loaded.
    Reload,
}

/// Arguments for the `templates list` command.
#[derive(Parser, Debug)]
pub struct TemplatesListArgs {
    /// Only list templates usable by this agent.
    #[arg(long)]
    pub agent: Option<String>,
}

/// Arguments for the `templates show` command.
#[derive(Parser, Debug)]
pub struct TemplatesShowArgs {
    /// Template id (e.g., prd).
    pub id: String,
}

/// Arguments for the `render` command.
#[derive(Parser, Debug)]
pub struct RenderArgs {
    /// Template id to render.
    pub template: String,

    /// Variable binding as NAME=VALUE. Repeatable.
    #[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_binding)]
    pub vars: Vec<(String, String)>,

    /// Author recorded in the rendered document.
    #[arg(long)]
    pub author: Option<String>,

    /// Write the document to this path instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Replace the output file if it already exists.
    #[arg(long, requires = "output")]
    pub force: bool,
}

/// Arguments for the `update` command.
#[derive(Parser, Debug)]
pub struct UpdateArgs {
    /// Document to update.
    pub doc: PathBuf,

    /// Template the document was rendered from.
    #[arg(short, long)]
    pub template: String,

    /// Agent that produced the reply (selects the extraction profile).
    #[arg(short, long)]
    pub agent: String,

    /// Conversation turn. Turn 1 replaces section content; later turns append.
    #[arg(long, default_value_t = 1)]
    pub turn: u32,

    /// File holding the agent reply. Reads stdin when omitted.
    #[arg(long)]
    pub content_file: Option<PathBuf>,
}

/// Arguments for the `progress` command.
#[derive(Parser, Debug)]
pub struct ProgressArgs {
    /// Document to measure.
    pub doc: PathBuf,

    /// Template whose required sections are counted.
    #[arg(short, long)]
    pub template: String,
}

/// Arguments for the `sections` command.
#[derive(Parser, Debug)]
pub struct SectionsArgs {
    /// Document to outline.
    pub doc: PathBuf,
}

/// Lock subcommands.
#[derive(Parser, Debug)]
pub struct LockCommand {
    #[command(subcommand)]
    pub action: LockAction,
}

/// Available lock actions.
#[derive(Subcommand, Debug)]
pub enum LockAction {
    /// Show the lock held on a document, if any.
    Show(LockShowArgs),

    /// Clear a document's lock file.
    ///
    /// Requires --force unless the lock is stale.
    Clear(LockClearArgs),
}

/// Arguments for the `lock show` command.
#[derive(Parser, Debug)]
pub struct LockShowArgs {
    /// Document whose lock to show.
    pub doc: PathBuf,
}

/// Arguments for the `lock clear` command.
#[derive(Parser, Debug)]
pub struct LockClearArgs {
    /// Document whose lock should be cleared.
    pub doc: PathBuf,

    /// Clear the lock even if it is not stale.
    #[arg(long)]
    pub force: bool,
}

/// Parse a `NAME=VALUE` binding. The value may itself contain `=`.
fn parse_binding(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("invalid binding '{}': expected NAME=VALUE", raw))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("invalid binding '{}': empty variable name", raw));
    }
    Ok((name.to_string(), value.to_string()))
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_debug_assert() {
        // Verifies the CLI arguments configuration is valid
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_init() {
        let cli = Cli::try_parse_from(["docsmith", "init"]).unwrap();
        assert!(matches!(cli.command, Command::Init));
    }

    #[test]
    fn parse_templates_list_for_agent() {
        let cli = Cli::try_parse_from(["docsmith", "templates", "list", "--agent", "pm"]).unwrap();
        if let Command::Templates(cmd) = cli.command
            && let TemplatesAction::List(args) = cmd.action
        {
            assert_eq!(args.agent.as_deref(), Some("pm"));
        } else {
            panic!("Expected Templates List command");
        }
    }

    #[test]
    fn parse_templates_reload() {
        let cli = Cli::try_parse_from(["docsmith", "templates", "reload"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Templates(TemplatesCommand {
                action: TemplatesAction::Reload
            })
        ));
    }

    #[test]
    fn parse_render_full() {
        let cli = Cli::try_parse_from([
            "docsmith",
            "render",
            "prd",
            "--var",
            "title=Checkout v2",
            "--var",
            "formula=a=b",
            "--author",
            "Dana",
            "-o",
            "docs/prd.md",
            "--force",
        ])
        .unwrap();
        if let Command::Render(args) = cli.command {
            assert_eq!(args.template, "prd");
            assert_eq!(
                args.vars,
                vec![
                    ("title".to_string(), "Checkout v2".to_string()),
                    ("formula".to_string(), "a=b".to_string()),
                ]
            );
            assert_eq!(args.author.as_deref(), Some("Dana"));
            assert_eq!(args.output, Some(PathBuf::from("docs/prd.md")));
            assert!(args.force);
        } else {
            panic!("Expected Render command");
        }
    }

    #[test]
    fn parse_render_force_requires_output() {
        assert!(Cli::try_parse_from(["docsmith", "render", "prd", "--force"]).is_err());
    }

    #[test]
    fn parse_render_rejects_bad_binding() {
        assert!(Cli::try_parse_from(["docsmith", "render", "basic", "--var", "title"]).is_err());
        assert!(Cli::try_parse_from(["docsmith", "render", "basic", "--var", "=x"]).is_err());
    }

    #[test]
    fn parse_update_defaults() {
        let cli = Cli::try_parse_from([
            "docsmith", "update", "prd.md", "--template", "prd", "--agent", "pm",
        ])
        .unwrap();
        if let Command::Update(args) = cli.command {
            assert_eq!(args.doc, PathBuf::from("prd.md"));
            assert_eq!(args.turn, 1);
            assert!(args.content_file.is_none());
        } else {
            panic!("Expected Update command");
        }
    }

    #[test]
    fn parse_update_requires_template() {
        assert!(Cli::try_parse_from(["docsmith", "update", "prd.md", "--agent", "pm"]).is_err());
    }

    #[test]
    fn parse_lock_clear() {
        let cli = Cli::try_parse_from(["docsmith", "lock", "clear", "prd.md", "--force"]).unwrap();
        if let Command::Lock(cmd) = cli.command
            && let LockAction::Clear(args) = cmd.action
        {
            assert_eq!(args.doc, PathBuf::from("prd.md"));
            assert!(args.force);
        } else {
            panic!("Expected Lock Clear command");
        }
    }
}
