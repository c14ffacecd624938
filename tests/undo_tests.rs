//! Integration tests for undo.
//!
//! Tests cover:
//! - Round trip (rename then undo)
//! - Repeated undo
//! - Missing log, missing backup directory, corrupt log, tampered backup
//! - Latest log selection
//! - Chained and cyclic renames

use bulk_renamer::core::undo::UndoExecutor;
use bulk_renamer::models::result::UndoStatus;
use bulk_renamer::models::rule::{PatternRule, RenameRule};
use bulk_renamer::{execute, undo, Error, NoProgress, Session};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn create_files(dir: &Path, names: &[&str]) {
    for name in names {
        fs::write(dir.join(name), format!("content of {}", name)).unwrap();
    }
}

fn visible_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<_> = fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|n| !n.starts_with("rename_log_"))
        .collect();
    names.sort();
    names
}

// ========== ROUND TRIP TESTS ==========

#[test]
fn test_undo_restores_originals() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    create_files(dir, &["a.txt", "b.txt"]);

    let run = execute(dir, &RenameRule::with_prefix("X_")).unwrap();
    let result = undo(dir).unwrap();

    assert!(result.success);
    assert_eq!(result.restored, 2);
    assert_eq!(result.skipped, 0);
    assert_eq!(result.failed, 0);
    assert_eq!(Some(result.log_file.clone()), run.log_file);
    assert_eq!(Some(result.backup_dir.clone()), run.backup_dir);

    assert_eq!(visible_files(dir), vec!["a.txt", "b.txt"]);
    assert_eq!(fs::read_to_string(dir.join("a.txt")).unwrap(), "content of a.txt");
    assert_eq!(fs::read_to_string(dir.join("b.txt")).unwrap(), "content of b.txt");
}

#[test]
fn test_undo_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    create_files(dir, &["a.txt", "b.txt"]);

    execute(dir, &RenameRule::with_prefix("X_")).unwrap();
    undo(dir).unwrap();
    let second = undo(dir).unwrap();

    assert!(second.success);
    assert_eq!(second.restored, 0);
    assert_eq!(second.skipped, 2);
    assert!(second
        .details
        .iter()
        .all(|d| d.status == UndoStatus::SkippedAlreadyRestored));
    assert_eq!(visible_files(dir), vec!["a.txt", "b.txt"]);
}

#[test]
fn test_undo_keeps_log_and_backup() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    create_files(dir, &["a.txt"]);

    execute(dir, &RenameRule::with_prefix("X_")).unwrap();
    let result = undo(dir).unwrap();

    assert!(result.log_file.is_file());
    assert!(result.backup_dir.join("a.txt").is_file());
}

// ========== ERROR TESTS ==========

#[test]
fn test_undo_without_log() {
    let temp_dir = TempDir::new().unwrap();
    create_files(temp_dir.path(), &["a.txt"]);

    assert!(matches!(undo(temp_dir.path()), Err(Error::NoLogFound(_))));
}

#[test]
fn test_undo_with_missing_backup_dir() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    create_files(dir, &["a.txt"]);

    let run = execute(dir, &RenameRule::with_prefix("X_")).unwrap();
    fs::remove_dir_all(run.backup_dir.unwrap()).unwrap();

    assert!(matches!(undo(dir), Err(Error::NoBackupFound(_))));
    assert!(dir.join("X_a.txt").is_file());
}

#[test]
fn test_undo_with_corrupt_log() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    fs::write(dir.join("rename_log_20261017_101530_042.json"), "{ \"generated_at\": ").unwrap();

    assert!(matches!(undo(dir), Err(Error::LogCorrupt { .. })));
}

#[test]
fn test_undo_skips_missing_backup_file() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    create_files(dir, &["a.txt", "b.txt"]);

    let run = execute(dir, &RenameRule::with_prefix("X_")).unwrap();
    fs::remove_file(run.backup_dir.unwrap().join("a.txt")).unwrap();

    let result = undo(dir).unwrap();

    assert!(result.success);
    assert_eq!(result.restored, 1);
    assert_eq!(result.skipped, 1);
    assert_eq!(result.details[0].status, UndoStatus::SkippedBackupMissing);
    assert!(dir.join("X_a.txt").is_file());
    assert!(dir.join("b.txt").is_file());
}

#[test]
fn test_undo_does_not_overwrite_new_file_at_original() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    create_files(dir, &["a.txt"]);

    execute(dir, &RenameRule::with_prefix("X_")).unwrap();
    fs::write(dir.join("a.txt"), "created after the rename").unwrap();

    let result = undo(dir).unwrap();

    assert_eq!(result.restored, 0);
    assert_eq!(result.failed, 1);
    assert!(matches!(result.details[0].status, UndoStatus::Failed(_)));
    assert_eq!(fs::read_to_string(dir.join("a.txt")).unwrap(), "created after the rename");
    assert!(dir.join("X_a.txt").is_file());
}

#[test]
fn test_undo_with_non_utf8_log() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    fs::write(dir.join("rename_log_20261017_101530_042.json"), [0xff, 0xfe, b'{']).unwrap();

    assert!(matches!(undo(dir), Err(Error::LogCorrupt { .. })));
}

#[test]
fn test_undo_refuses_tampered_backup() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    create_files(dir, &["a.txt", "b.txt"]);

    let run = execute(dir, &RenameRule::with_prefix("X_")).unwrap();
    fs::write(run.backup_dir.unwrap().join("a.txt"), "tampered").unwrap();

    let result = undo(dir).unwrap();

    assert!(result.success);
    assert_eq!(result.restored, 1);
    assert_eq!(result.failed, 1);
    assert_eq!(
        result.details[0].status,
        UndoStatus::Failed("backup checksum mismatch".to_string())
    );
    assert!(dir.join("X_a.txt").is_file());
    assert!(!dir.join("a.txt").exists());
    assert_eq!(fs::read_to_string(dir.join("b.txt")).unwrap(), "content of b.txt");
}

// ========== LOG SELECTION TESTS ==========

#[test]
fn test_undo_uses_latest_log_only() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    create_files(dir, &["a.txt"]);

    execute(dir, &RenameRule::with_prefix("X_")).unwrap();
    execute(dir, &RenameRule::with_prefix("Y_")).unwrap();

    let result = undo(dir).unwrap();
    assert_eq!(result.restored, 1);
    assert_eq!(visible_files(dir), vec!["X_a.txt"]);
}

#[test]
fn test_undo_from_explicit_log() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    create_files(dir, &["a.txt", "b.txt"]);

    let first = execute(dir, &RenameRule::with_prefix("X_").with_extensions(["txt"])).unwrap();
    create_files(dir, &["c.md"]);
    execute(dir, &RenameRule::with_prefix("Y_").with_extensions(["md"])).unwrap();

    let result = Session::new(dir)
        .undo_from(first.log_file.as_ref().unwrap())
        .unwrap();

    assert_eq!(result.restored, 2);
    assert_eq!(visible_files(dir), vec!["Y_c.md", "a.txt", "b.txt"]);
}

#[test]
fn test_undo_with_missing_explicit_log() {
    let temp_dir = TempDir::new().unwrap();
    let result = UndoExecutor::with_log_file(temp_dir.path().join("nope.json"))
        .undo(temp_dir.path(), &mut NoProgress);
    assert!(matches!(result, Err(Error::NoLogFound(_))));
}

// ========== CHAIN TESTS ==========

#[test]
fn test_undo_cyclic_renames() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    create_files(dir, &["ab.txt", "ba.txt"]);

    let rule = RenameRule {
        pattern: Some(PatternRule {
            regex: "^(.)(.)$".to_string(),
            replacement: "$2$1".to_string(),
        }),
        ..RenameRule::default()
    };
    execute(dir, &rule).unwrap();

    let result = undo(dir).unwrap();
    assert_eq!(result.restored, 2);
    assert_eq!(fs::read_to_string(dir.join("ab.txt")).unwrap(), "content of ab.txt");
    assert_eq!(fs::read_to_string(dir.join("ba.txt")).unwrap(), "content of ba.txt");

    let again = undo(dir).unwrap();
    assert_eq!(again.restored, 0);
    assert_eq!(fs::read_to_string(dir.join("ab.txt")).unwrap(), "content of ab.txt");
}

#[test]
fn test_undo_chained_renames() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    create_files(dir, &["1.txt", "2.txt"]);

    let rule = RenameRule {
        pattern: Some(PatternRule {
            regex: "^.*$".to_string(),
            replacement: String::new(),
        }),
        numbering: Some(bulk_renamer::models::rule::Numbering { start: 2, padding: 1 }),
        ..RenameRule::default()
    };
    execute(dir, &rule).unwrap();

    let result = undo(dir).unwrap();
    assert_eq!(result.restored, 2);
    assert_eq!(visible_files(dir), vec!["1.txt", "2.txt"]);
    assert_eq!(fs::read_to_string(dir.join("1.txt")).unwrap(), "content of 1.txt");
    assert_eq!(fs::read_to_string(dir.join("2.txt")).unwrap(), "content of 2.txt");
}

#[test]
fn test_undo_swap_of_identical_files_counts_as_restored() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    fs::write(dir.join("ab.txt"), "same bytes").unwrap();
    fs::write(dir.join("ba.txt"), "same bytes").unwrap();

    let rule = RenameRule {
        pattern: Some(PatternRule {
            regex: "^(.)(.)$".to_string(),
            replacement: "$2$1".to_string(),
        }),
        ..RenameRule::default()
    };
    let run = execute(dir, &rule).unwrap();
    assert_eq!(run.renamed_count(), 2);

    // Both names hold the same bytes before and after the swap.
    let result = undo(dir).unwrap();
    assert_eq!(result.restored, 0);
    assert!(result
        .details
        .iter()
        .all(|d| d.status == UndoStatus::SkippedAlreadyRestored));
    assert_eq!(visible_files(dir), vec!["ab.txt", "ba.txt"]);
    assert_eq!(fs::read_to_string(dir.join("ab.txt")).unwrap(), "same bytes");
}
