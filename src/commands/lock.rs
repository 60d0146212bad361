//! Implementation of the `docsmith lock` subcommands.

use super::load_workspace;
use crate::cli::{LockClearArgs, LockShowArgs};
use crate::error::Result;
use crate::events::{self, Event, EventAction};
use crate::locks::{self, LockInfo};
use serde_json::json;

/// Execute `docsmith lock show <doc>`.
pub fn cmd_lock_show(args: LockShowArgs) -> Result<()> {
    let (ctx, config) = load_workspace()?;
    let path = ctx.document_path(&args.doc);

    match locks::read_lock(&path, config.lock_stale_minutes)? {
        Some(info) => {
            print!("{}", describe_lock(&info));
            if info.is_stale {
                println!();
                println!(
                    "Note: lock exceeds the {} min threshold. Use `docsmith lock clear {}` to clear it.",
                    config.lock_stale_minutes,
                    args.doc.display()
                );
            }
        }
        None => println!("No lock held on {}.", path.display()),
    }

    Ok(())
}

/// Execute `docsmith lock clear <doc> [--force]`.
pub fn cmd_lock_clear(args: LockClearArgs) -> Result<()> {
    let (ctx, config) = load_workspace()?;
    let path = ctx.document_path(&args.doc);

    let cleared = locks::clear_lock(&path, config.lock_stale_minutes, args.force)?;

    events::record(
        &ctx,
        &config,
        Event::new(EventAction::LockClear)
            .with_document(path.display().to_string())
            .with_details(json!({
                "age_minutes": cleared.metadata.age().num_minutes(),
                "was_stale": cleared.is_stale,
                "force": args.force,
                "owner": cleared.metadata.owner,
                "original_action": cleared.metadata.action,
            })),
    );

    println!("Cleared lock for {}", cleared.document.display());
    println!();
    print!("{}", describe_lock(&cleared));

    Ok(())
}

pub(crate) fn describe_lock(info: &LockInfo) -> String {
    let metadata = &info.metadata;
    let mut out = format!("Lock: {}\n", info.path.display());
    out.push_str(&format!("  Owner:      {}\n", metadata.owner));
    if let Some(pid) = metadata.pid {
        out.push_str(&format!("  PID:        {}\n", pid));
    }
    out.push_str(&format!(
        "  Created:    {}\n",
        metadata.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out.push_str(&format!("  Age:        {}\n", metadata.age_string()));
    out.push_str(&format!("  Action:     {}\n", metadata.action));
    if info.is_stale {
        out.push_str("  Status:     STALE\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DocsmithError;
    use crate::events::read_events;
    use crate::locks::{acquire_document_lock, lock_path_for};
    use crate::test_support::{DirGuard, create_test_workspace};
    use serial_test::serial;
    use std::path::PathBuf;

    #[test]
    fn test_describe_lock() {
        let temp = create_test_workspace();
        let doc = temp.path().join("prd.md");
        let _guard = acquire_document_lock(&doc, "update").unwrap();

        let info = locks::read_lock(&doc, 120).unwrap().unwrap();
        let text = describe_lock(&info);

        assert!(text.contains(".prd.md.lock"));
        assert!(text.contains("Action:     update"));
        assert!(!text.contains("STALE"));
    }

    #[test]
    #[serial]
    fn test_cmd_lock_clear_requires_force() {
        let temp = create_test_workspace();
        let _dir = DirGuard::new(temp.path());
        let doc = temp.path().join("prd.md");
        let guard = acquire_document_lock(&doc, "update").unwrap();

        let err = cmd_lock_clear(LockClearArgs {
            doc: PathBuf::from("prd.md"),
            force: false,
        })
        .unwrap_err();
        assert!(matches!(err, DocsmithError::UserError(_)));
        assert!(lock_path_for(&doc).exists());

        cmd_lock_clear(LockClearArgs {
            doc: PathBuf::from("prd.md"),
            force: true,
        })
        .unwrap();
        assert!(!lock_path_for(&doc).exists());
        drop(guard);

        let (ctx, _) = load_workspace().unwrap();
        let events = read_events(&ctx).unwrap();
        let last = events.last().unwrap();
        assert_eq!(last.action, EventAction::LockClear);
        assert_eq!(last.details["force"], true);
    }

    #[test]
    #[serial]
    fn test_cmd_lock_show_without_lock() {
        let temp = create_test_workspace();
        let _dir = DirGuard::new(temp.path());

        cmd_lock_show(LockShowArgs {
            doc: PathBuf::from("prd.md"),
        })
        .unwrap();
    }
}
