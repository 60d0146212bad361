//! Implementation of the `docsmith templates` subcommands.

use super::{load_registry, load_workspace};
use crate::cli::{TemplatesListArgs, TemplatesShowArgs};
use crate::error::Result;
use crate::events::{self, Event, EventAction};
use crate::template::{
    RESERVED_VARIABLES, ReloadReport, TemplateDefinition, TemplateRegistry, TemplateStructure,
};
use serde_json::json;

/// Execute `docsmith templates list [--agent <id>]`.
pub fn cmd_templates_list(args: TemplatesListArgs) -> Result<()> {
    let (ctx, config) = load_workspace()?;
    let registry = load_registry(&ctx, &config)?;

    let templates = match args.agent.as_deref() {
        Some(agent) => registry.list_for_agent(agent),
        None => registry.list(),
    };

    if templates.is_empty() {
        match args.agent {
            Some(agent) => println!("No templates available to agent '{}'.", agent),
            None => println!("No templates available."),
        }
        return Ok(());
    }

    println!("Templates ({}):", templates.len());
    println!();
    for definition in templates {
        println!("{}", list_line(&registry, definition));
    }

    Ok(())
}

fn list_line(registry: &TemplateRegistry, definition: &TemplateDefinition) -> String {
    let origin = if registry.is_builtin(&definition.id) {
        "built-in"
    } else {
        "user"
    };
    let mut line = format!("  {:<16} {} [{}]", definition.id, definition.name, origin);
    if !definition.description.is_empty() {
        line.push_str(&format!(" - {}", definition.description));
    }
    line
}

/// Execute `docsmith templates show <id>`.
pub fn cmd_templates_show(args: TemplatesShowArgs) -> Result<()> {
    let (ctx, config) = load_workspace()?;
    let registry = load_registry(&ctx, &config)?;

    let definition = registry.require(&args.id)?;
    let structure = TemplateStructure::from_definition(definition);

    print!("{}", describe(definition, &structure));
    Ok(())
}

/// Human-readable description of a template.
pub(crate) fn describe(definition: &TemplateDefinition, structure: &TemplateStructure) -> String {
    let mut out = String::new();

    out.push_str(&format!("{} ({})\n", definition.name, definition.id));
    if !definition.description.is_empty() {
        out.push_str(&format!("  {}\n", definition.description));
    }

    let agents = match &definition.agents {
        Some(agents) => agents.iter().cloned().collect::<Vec<_>>().join(", "),
        None => "any".to_string(),
    };
    out.push_str(&format!("\nAgents: {}\n", agents));

    out.push_str("\nVariables:\n");
    if definition.variables.is_empty() {
        out.push_str("  (none)\n");
    }
    for variable in &definition.variables {
        let mut line = format!("  {:<14} {:<8}", variable.name, variable.kind.to_string());
        if variable.required && variable.default.is_none() {
            line.push_str(" required");
        } else if let Some(default) = &variable.default {
            line.push_str(&format!(" default: {}", default));
        } else {
            line.push_str(" optional");
        }
        if !variable.description.is_empty() {
            line.push_str(&format!("  {}", variable.description));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out.push_str("\nSections:\n");
    if structure.sections.is_empty() {
        out.push_str("  (none)\n");
    }
    for (name, info) in structure.ordered() {
        let marker = if info.required { "required" } else { "optional" };
        out.push_str(&format!("  {}. {} ({})\n", info.order + 1, name, marker));
    }

    out.push_str(&format!(
        "\nReserved variables: {}\n",
        RESERVED_VARIABLES.join(", ")
    ));
    out
}

/// Execute `docsmith templates reload`.
pub fn cmd_templates_reload() -> Result<()> {
    let (ctx, config) = load_workspace()?;
    let templates_dir = ctx.templates_dir(&config);

    let (_registry, report) = TemplateRegistry::with_source(&templates_dir, &config.template_globs)?;

    print!("{}", summarize_reload(&report));

    events::record(
        &ctx,
        &config,
        Event::new(EventAction::Reload).with_details(json!({
            "templates_dir": templates_dir.display().to_string(),
            "loaded": report.loaded,
            "skipped": report.skipped.len(),
        })),
    );

    Ok(())
}

pub(crate) fn summarize_reload(report: &ReloadReport) -> String {
    let mut out = format!("Loaded {} user template(s).\n", report.loaded.len());
    for id in &report.loaded {
        out.push_str(&format!("  {}\n", id));
    }
    if !report.skipped.is_empty() {
        out.push_str(&format!("\nSkipped {} file(s):\n", report.skipped.len()));
        for skipped in &report.skipped {
            out.push_str(&format!("  {}: {}\n", skipped.path.display(), skipped.reason));
        }
    }
    out
}
