//! Tests for applying updates to documents on disk.

use super::*;
use crate::error::DocsmithError;
use crate::locks::{acquire_document_lock, lock_path_for};
use crate::markdown::UpdateMode;
use crate::template::{RenderContext, TemplateRegistry, TemplateStructure, builtin};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn prd_structure() -> TemplateStructure {
    TemplateStructure::from_definition(&builtin::prd())
}

fn write_doc(dir: &TempDir, name: &str, text: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, text).unwrap();
    path
}

fn render_prd(dir: &TempDir) -> std::path::PathBuf {
    let registry = TemplateRegistry::new();
    let ctx = RenderContext::new(dir.path()).with_binding("title", "Checkout");
    let text = registry.render("prd", &ctx).unwrap().to_document().unwrap();
    write_doc(dir, "prd.md", &text)
}

#[test]
fn test_replace_problem_statement_on_disk() {
    let dir = TempDir::new().unwrap();
    let path = write_doc(&dir, "doc.md", "# Title\n\n## Problem Statement\n\nold\n");

    let updater = DocumentUpdater::new();
    let outcome = updater
        .apply_section_updates(
            &path,
            &[SectionUpdateSpec::new("Problem Statement", "new", UpdateMode::Replace, 0)],
            &prd_structure(),
        )
        .unwrap();

    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "# Title\n\n## Problem Statement\n\nnew\n"
    );
    assert!(outcome.written);
    assert!(!outcome.applied[0].created);
    assert!(!lock_path_for(&path).exists());
}

#[test]
fn test_priorities_order_created_sections() {
    let dir = TempDir::new().unwrap();
    let path = write_doc(&dir, "doc.md", "# Title\n");

    let updates = vec![
        SectionUpdateSpec::new("Target Users", "users content", UpdateMode::Replace, 2),
        SectionUpdateSpec::new("Problem Statement", "problem content", UpdateMode::Replace, 1),
    ];
    let outcome = DocumentUpdater::new()
        .apply_section_updates(&path, &updates, &prd_structure())
        .unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let problem = text.find("problem content").unwrap();
    let users = text.find("users content").unwrap();
    assert!(problem < users);
    assert_eq!(
        text,
        "# Title\n\n## Problem Statement\n\nproblem content\n\n## Target Users\n\nusers content\n"
    );

    let order: Vec<&str> = outcome.applied.iter().map(|a| a.section.as_str()).collect();
    assert_eq!(order, vec!["Problem Statement", "Target Users"]);
    assert!(outcome.applied.iter().all(|a| a.created));
}

#[test]
fn test_equal_priorities_keep_input_order() {
    let dir = TempDir::new().unwrap();
    let path = write_doc(&dir, "doc.md", "");

    let updates = vec![
        SectionUpdateSpec::new("B", "b", UpdateMode::Replace, 0),
        SectionUpdateSpec::new("A", "a", UpdateMode::Replace, 0),
    ];
    DocumentUpdater::new()
        .apply_section_updates(&path, &updates, &TemplateStructure::new())
        .unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "## B\n\nb\n\n## A\n\na\n");
}

#[test]
fn test_missing_document_is_created() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("docs/new.md");

    DocumentUpdater::new()
        .apply_section_updates(
            &path,
            &[SectionUpdateSpec::new("Goals", "grow", UpdateMode::Append, 0)],
            &prd_structure(),
        )
        .unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "## Goals\n\ngrow\n");
}

#[test]
fn test_conversation_fills_rendered_prd() {
    let dir = TempDir::new().unwrap();
    let path = render_prd(&dir);
    let structure = prd_structure();
    let mapper = ContentMapper::new();
    let updater = DocumentUpdater::new();

    assert_eq!(updater.get_update_progress(&path).percent(), 0);

    let turn1 = ConversationContext::new("pm", "prd", 1, &path);
    let reply = "The problem is that checkout takes five steps.\n\nOur customers are mobile shoppers.";
    let updates = mapper.map_content_to_sections(reply, &structure, &turn1);
    let outcome = updater
        .apply_section_updates(&path, updates.as_slice(), &structure)
        .unwrap();

    assert_eq!(outcome.progress.progress.satisfied, vec!["Problem Statement", "Target Users"]);
    assert_eq!(outcome.progress.percent(), 40);
    assert_eq!(updater.get_update_progress(&path).percent(), 40);

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("---\n"));
    assert!(text.contains("## Problem Statement\n\nThe problem is that checkout takes five steps.\n\n## Target Users"));
    assert!(!text.contains("What problem are we solving"));

    let turn2 = ConversationContext::new("pm", "prd", 2, &path);
    let updates = mapper.map_content_to_sections("Another pain is coupon entry.", &structure, &turn2);
    updater
        .apply_section_updates(&path, updates.as_slice(), &structure)
        .unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains(
        "The problem is that checkout takes five steps.\n\nAnother pain is coupon entry.\n\n## Target Users"
    ));
}

#[test]
fn test_empty_updates_do_not_write() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.md");

    let outcome = DocumentUpdater::new()
        .apply_section_updates(&path, &[], &prd_structure())
        .unwrap();

    assert!(!outcome.written);
    assert!(!path.exists());
    assert_eq!(outcome.progress.percent(), 0);
}

#[test]
fn test_held_lock_file_fails_fast() {
    let dir = TempDir::new().unwrap();
    let path = write_doc(&dir, "doc.md", "## Goals\n\nold\n");
    let _other = acquire_document_lock(&path, "update").unwrap();

    let err = DocumentUpdater::new()
        .apply_section_updates(
            &path,
            &[SectionUpdateSpec::new("Goals", "new", UpdateMode::Replace, 0)],
            &prd_structure(),
        )
        .unwrap_err();

    assert!(matches!(err, DocsmithError::LockError(_)));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "## Goals\n\nold\n");
}

#[test]
fn test_write_failure_leaves_progress_untouched() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("is-a-dir.md");
    std::fs::create_dir(&path).unwrap();

    let updater = DocumentUpdater::new().without_lock_files();
    let err = updater
        .apply_section_updates(
            &path,
            &[SectionUpdateSpec::new("Goals", "g", UpdateMode::Replace, 0)],
            &prd_structure(),
        )
        .unwrap_err();

    assert!(matches!(err, DocsmithError::DocumentWriteFailure { .. }));
    assert!(updater.progress_store().get(&path).is_none());
}

#[test]
fn test_concurrent_updates_to_one_document_are_serialized() {
    let dir = TempDir::new().unwrap();
    let path = write_doc(&dir, "doc.md", "## Log\n");
    let updater = Arc::new(DocumentUpdater::new());
    let structure = Arc::new(TemplateStructure::new().with_section("Log", true));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let updater = Arc::clone(&updater);
            let structure = Arc::clone(&structure);
            let path = path.clone();
            std::thread::spawn(move || {
                updater
                    .apply_section_updates(
                        &path,
                        &[SectionUpdateSpec::new("Log", &format!("entry {}", i), UpdateMode::Append, 0)],
                        &structure,
                    )
                    .unwrap();
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let text = std::fs::read_to_string(&path).unwrap();
    for i in 0..8 {
        assert!(text.contains(&format!("entry {}", i)), "lost entry {}", i);
    }
}

#[test]
fn test_refresh_progress_reads_disk() {
    let dir = TempDir::new().unwrap();
    let path = write_doc(
        &dir,
        "doc.md",
        "## Problem Statement\np\n## Target Users\nu\n## Goals\ng\n## Features\nf\n## Requirements\nr\n",
    );

    let updater = DocumentUpdater::new();
    let record = updater.refresh_progress(&path, &prd_structure());
    assert_eq!(record.percent(), 100);
    assert_eq!(updater.get_update_progress(Path::new(&path)).percent(), 100);
}

#[test]
fn test_fenced_reply_keeps_later_sections_reachable() {
    let dir = TempDir::new().unwrap();
    let path = render_prd(&dir);
    let structure = prd_structure();
    let mapper = ContentMapper::new();
    let updater = DocumentUpdater::new();

    let turn1 = ConversationContext::new("pm", "prd", 1, &path);
    let reply = "The problem is the parser config:\n```yaml\nsteps: 5\n\nretries: 3\n```";
    let updates = mapper.map_content_to_sections(reply, &structure, &turn1);
    updater
        .apply_section_updates(&path, updates.as_slice(), &structure)
        .unwrap();

    let turn2 = ConversationContext::new("pm", "prd", 2, &path);
    let updates =
        mapper.map_content_to_sections("Our target users are mobile shoppers.", &structure, &turn2);
    let outcome = updater
        .apply_section_updates(&path, updates.as_slice(), &structure)
        .unwrap();

    assert_eq!(outcome.applied.len(), 1);
    assert_eq!(outcome.applied[0].section, "Target Users");
    assert!(!outcome.applied[0].created);
    assert_eq!(outcome.progress.progress.satisfied, vec!["Problem Statement", "Target Users"]);

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.matches("## Target Users").count(), 1);
    assert!(text.contains("```yaml\nsteps: 5\n\nretries: 3\n```\n\n## Target Users"));
}

#[test]
fn test_same_level_reply_heading_is_nested() {
    let dir = TempDir::new().unwrap();
    let path = render_prd(&dir);
    let structure = prd_structure();

    let turn1 = ConversationContext::new("pm", "prd", 1, &path);
    let reply = "## Background\nThe problem is that checkout takes five steps.";
    let updates = ContentMapper::new().map_content_to_sections(reply, &structure, &turn1);
    let outcome = DocumentUpdater::new()
        .apply_section_updates(&path, updates.as_slice(), &structure)
        .unwrap();

    assert_eq!(outcome.progress.progress.satisfied, vec!["Problem Statement"]);

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains(
        "## Problem Statement\n\n### Background\nThe problem is that checkout takes five steps.\n"
    ));
    assert!(!text.contains("\n## Background"));
}

#[test]
fn test_created_section_nests_reply_headings() {
    let dir = TempDir::new().unwrap();
    let path = write_doc(&dir, "doc.md", "# Title\n");

    DocumentUpdater::new()
        .apply_section_updates(
            &path,
            &[SectionUpdateSpec::new("Goals", "# Growth\nDouble conversion.", UpdateMode::Replace, 0)],
            &prd_structure(),
        )
        .unwrap();

    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "# Title\n\n## Goals\n\n### Growth\nDouble conversion.\n"
    );
}

#[test]
fn test_invalid_utf8_document_keeps_other_sections() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("doc.md");
    std::fs::write(&path, b"## Goals\n\nold \xff\n\n## Risks\n\nkeep\n").unwrap();

    let outcome = DocumentUpdater::new()
        .apply_section_updates(
            &path,
            &[SectionUpdateSpec::new("Goals", "grow", UpdateMode::Replace, 0)],
            &prd_structure(),
        )
        .unwrap();

    assert!(outcome.written);
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "## Goals\n\ngrow\n\n## Risks\n\nkeep\n"
    );
}

#[test]
fn test_invalid_utf8_document_progress() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("doc.md");
    std::fs::write(&path, b"## Problem Statement\n\n\xfe slow\n").unwrap();

    let record = DocumentUpdater::new().refresh_progress(&path, &prd_structure());
    assert_eq!(record.progress.satisfied, vec!["Problem Statement"]);
}
