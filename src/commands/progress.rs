//! Implementation of the `docsmith progress` command.

use super::{load_registry, load_workspace};
use crate::cli::ProgressArgs;
use crate::error::Result;
use crate::update::{DocumentUpdater, ProgressRecord};

/// Execute the `docsmith progress` command.
///
/// Progress is recomputed from the document on disk, so the figure is the
/// same whichever process last wrote the file.
pub fn cmd_progress(args: ProgressArgs) -> Result<()> {
    let (ctx, config) = load_workspace()?;
    let registry = load_registry(&ctx, &config)?;

    let structure = registry.structure(&args.template)?;
    let path = ctx.document_path(&args.doc);
    let record = DocumentUpdater::new().refresh_progress(&path, &structure);

    print!("{}", format_progress(&record));
    Ok(())
}

pub(crate) fn format_progress(record: &ProgressRecord) -> String {
    let progress = &record.progress;
    let mut out = format!(
        "{}: {}% ({}/{} required sections)\n",
        record.path.display(),
        progress.percent,
        progress.satisfied.len(),
        progress.required.len()
    );

    for name in &progress.required {
        let mark = if progress.satisfied.contains(name) { "x" } else { " " };
        out.push_str(&format!("  [{}] {}\n", mark, name));
    }
    out
}
