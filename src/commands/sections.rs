//! Implementation of the `docsmith sections` command.

use super::load_workspace;
use crate::cli::SectionsArgs;
use crate::error::{DocsmithError, Result};
use crate::markdown::{self, split_lines};

/// Execute the `docsmith sections` command.
pub fn cmd_sections(args: SectionsArgs) -> Result<()> {
    let (ctx, _config) = load_workspace()?;
    let path = ctx.document_path(&args.doc);

    let text = std::fs::read_to_string(&path).map_err(|e| {
        DocsmithError::UserError(format!("failed to read '{}': {}", path.display(), e))
    })?;

    let outline = outline(&text);
    if outline.is_empty() {
        println!("{} has no headings.", path.display());
    } else {
        print!("{}", outline);
    }
    Ok(())
}

/// One line per heading, indented by level, with its line number and
/// whether the section has content.
pub(crate) fn outline(text: &str) -> String {
    let lines = split_lines(text);
    markdown::parse(text)
        .iter()
        .map(|section| {
            format!(
                "{:>5}  {}{}{}\n",
                section.start_line + 1,
                "  ".repeat(usize::from(section.level.saturating_sub(1))),
                section.title,
                if section.has_content(&lines) { "" } else { "  (empty)" }
            )
        })
        .collect()
}
