//! Undo module.
//!
//! Reverses the most recent run recorded in a directory:
//! - find the latest `rename_log_<stamp>.json` (or use a given log)
//! - restore every original from the run's backup directory
//! - remove the renamed file
//!
//! Every record is classified before anything is touched. A record is only
//! restored when its backup copy exists and matches the logged checksum,
//! its renamed file is still present,
//! and restoring it cannot overwrite a file the run did not produce. The
//! log and backup directory are left in place, so undo can be repeated.

use crate::core::oplog;
use crate::core::progress::Progress;
use crate::models::oplog::{LogRecord, OperationLog};
use crate::models::result::{UndoDetail, UndoResult, UndoStatus};
use crate::utils::fs::{ensure_directory, files_match, path_occupied};
use crate::utils::hash;
use crate::Result;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Undo executor.
#[derive(Debug, Clone, Default)]
pub struct UndoExecutor {
    /// Log to undo instead of the latest one in the directory.
    log_file: Option<PathBuf>,
}

impl UndoExecutor {
    /// Create an executor that undoes the latest run.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an executor that undoes the run recorded in `log_file`.
    pub fn with_log_file(log_file: impl Into<PathBuf>) -> Self {
        Self {
            log_file: Some(log_file.into()),
        }
    }

    /// Locate the log this executor would undo.
    pub fn locate_log(&self, directory: &Path) -> Result<PathBuf> {
        ensure_directory(directory)?;

        match self.log_file {
            Some(ref path) if path.is_file() => Ok(path.clone()),
            Some(ref path) => Err(crate::Error::NoLogFound(path.display().to_string())),
            None => oplog::find_latest_log(directory)?
                .ok_or_else(|| crate::Error::NoLogFound(directory.display().to_string())),
        }
    }

    /// Undo a run.
    pub fn undo(&self, directory: &Path, progress: &mut dyn Progress) -> Result<UndoResult> {
        let log_file = self.locate_log(directory)?;
        tracing::info!("Undoing run recorded in {:?}", log_file);

        let log = oplog::load_log(&log_file)?;
        let backup_dir = resolve_backup_dir(&log, directory);
        if !backup_dir.is_dir() {
            return Err(crate::Error::NoBackupFound(backup_dir.display().to_string()));
        }

        let mut statuses = classify(&log.renamed_files, &backup_dir);

        progress.begin(log.renamed_files.len());

        let mut restored_paths: HashSet<PathBuf> = HashSet::new();
        let mut cancelled = false;

        for (record, status) in log.renamed_files.iter().zip(statuses.iter_mut()) {
            if status.is_some() {
                progress.advance(&record.original_name);
                continue;
            }
            if cancelled || progress.cancelled() {
                cancelled = true;
                *status = Some(UndoStatus::Cancelled);
                continue;
            }

            *status = Some(restore(record, &backup_dir, &mut restored_paths));
            progress.advance(&record.original_name);
        }

        progress.finish();

        let details: Vec<UndoDetail> = log
            .renamed_files
            .iter()
            .zip(statuses)
            .map(|(record, status)| UndoDetail {
                original_name: record.original_name.clone(),
                status: status.unwrap_or(UndoStatus::Cancelled),
            })
            .collect();

        let restored = details.iter().filter(|d| d.status.is_restored()).count();
        let failed = details
            .iter()
            .filter(|d| matches!(d.status, UndoStatus::Failed(_)))
            .count();

        if cancelled {
            tracing::warn!("Undo cancelled after {} restores", restored);
        }
        tracing::info!(
            "Undo finished: {} restored, {} skipped, {} failed",
            restored,
            details.len() - restored,
            failed
        );

        Ok(UndoResult {
            success: true,
            restored,
            skipped: details.len() - restored,
            failed,
            details,
            log_file,
            backup_dir,
        })
    }
}

/// Backup directory of a log, relative paths taken against `directory`.
fn resolve_backup_dir(log: &OperationLog, directory: &Path) -> PathBuf {
    if log.backup_dir.is_relative() {
        directory.join(&log.backup_dir)
    } else {
        log.backup_dir.clone()
    }
}

/// Decide up front which records are skipped or fail.
///
/// `None` means the record will be restored.
fn classify(records: &[LogRecord], backup_dir: &Path) -> Vec<Option<UndoStatus>> {
    let originals: HashSet<&Path> = records.iter().map(|r| r.original_path.as_path()).collect();

    let mut statuses: Vec<Option<UndoStatus>> = records
        .iter()
        .map(|record| {
            let backup = backup_dir.join(&record.original_name);
            if !backup.is_file() {
                tracing::warn!("Backup missing for {:?}", record.original_name);
                return Some(UndoStatus::SkippedBackupMissing);
            }
            if !path_occupied(&record.new_path) {
                return Some(UndoStatus::SkippedAlreadyRestored);
            }
            // The renamed path is also another record's original, so it may
            // already hold that record's restored content.
            if originals.contains(record.new_path.as_path()) {
                let holds_ours = files_match(&record.new_path, &backup).unwrap_or(false);
                let original_back =
                    path_occupied(&record.original_path) && files_match(&record.original_path, &backup).unwrap_or(false);
                if !holds_ours || original_back {
                    return Some(UndoStatus::SkippedAlreadyRestored);
                }
            }
            if let Some(ref expected) = record.checksum {
                let intact = hash::sha256_file(&backup).map(|actual| &actual == expected).unwrap_or(false);
                if !intact {
                    tracing::warn!("Backup checksum mismatch for {:?}", record.original_name);
                    return Some(UndoStatus::Failed("backup checksum mismatch".to_string()));
                }
            }
            None
        })
        .collect();

    // An occupied original is only overwritten when the file there is the
    // renamed output of a record being restored.
    loop {
        let replaceable: HashSet<PathBuf> = records
            .iter()
            .zip(statuses.iter())
            .filter(|(_, s)| s.is_none())
            .map(|(r, _)| r.new_path.clone())
            .collect();

        let mut changed = false;
        for (record, status) in records.iter().zip(statuses.iter_mut()) {
            if status.is_none()
                && path_occupied(&record.original_path)
                && !replaceable.contains(&record.original_path)
            {
                tracing::warn!("Original path occupied: {:?}", record.original_path);
                *status = Some(UndoStatus::Failed("original path occupied".to_string()));
                changed = true;
            }
        }

        if !changed {
            break;
        }
    }

    statuses
}

/// Restore one record: copy the backup back, then drop the renamed file.
fn restore(record: &LogRecord, backup_dir: &Path, restored_paths: &mut HashSet<PathBuf>) -> UndoStatus {
    let backup = backup_dir.join(&record.original_name);

    if let Err(e) = fs::copy(&backup, &record.original_path) {
        tracing::error!("Failed to restore {:?}: {}", record.original_path, e);
        return UndoStatus::Failed(format!("restore failed: {}", e));
    }
    restored_paths.insert(record.original_path.clone());
    tracing::debug!("Restored {:?} from {:?}", record.original_path, backup);

    if restored_paths.contains(&record.new_path) {
        return UndoStatus::Restored;
    }

    match fs::remove_file(&record.new_path) {
        Ok(()) => UndoStatus::Restored,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => UndoStatus::Restored,
        Err(e) => {
            tracing::error!("Failed to remove {:?}: {}", record.new_path, e);
            UndoStatus::Failed(format!(
                "restored, but could not remove {}: {}",
                record.new_path.display(),
                e
            ))
        }
    }
}

/// Undo the latest run in `directory` (convenience function).
pub fn undo_latest(directory: &Path) -> Result<UndoResult> {
    UndoExecutor::new().undo(directory, &mut crate::core::progress::NoProgress)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(dir: &Path, from: &str, to: &str) -> LogRecord {
        LogRecord {
            original_name: from.to_string(),
            new_name: to.to_string(),
            original_path: dir.join(from),
            new_path: dir.join(to),
            renamed_at: "2026-10-17T12:00:00+00:00".to_string(),
            checksum: None,
        }
    }

    #[test]
    fn test_classify_backup_missing() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let dir = temp_dir.path();
        let backup = dir.join("backup");
        fs::create_dir(&backup).unwrap();
        fs::write(dir.join("b"), "A").unwrap();

        let statuses = classify(&[record(dir, "a", "b")], &backup);
        assert_eq!(statuses, vec![Some(UndoStatus::SkippedBackupMissing)]);
    }

    #[test]
    fn test_classify_refuses_unrelated_occupant() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let dir = temp_dir.path();
        let backup = dir.join("backup");
        fs::create_dir(&backup).unwrap();
        fs::write(backup.join("a"), "A").unwrap();
        fs::write(dir.join("b"), "A").unwrap();
        fs::write(dir.join("a"), "someone else").unwrap();

        let statuses = classify(&[record(dir, "a", "b")], &backup);
        assert_eq!(
            statuses,
            vec![Some(UndoStatus::Failed("original path occupied".to_string()))]
        );
    }

    #[test]
    fn test_classify_chain_is_restorable() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let dir = temp_dir.path();
        let backup = dir.join("backup");
        fs::create_dir(&backup).unwrap();
        fs::write(backup.join("a"), "A").unwrap();
        fs::write(backup.join("b"), "B").unwrap();
        fs::write(dir.join("b"), "A").unwrap();
        fs::write(dir.join("c"), "B").unwrap();

        let statuses = classify(&[record(dir, "a", "b"), record(dir, "b", "c")], &backup);
        assert_eq!(statuses, vec![None, None]);
    }

    #[test]
    fn test_restore_keeps_path_restored_earlier() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let dir = temp_dir.path();
        let backup = dir.join("backup");
        fs::create_dir(&backup).unwrap();
        fs::write(backup.join("a"), "A").unwrap();
        fs::write(dir.join("a"), "B").unwrap();

        let mut restored = HashSet::new();
        restored.insert(dir.join("b"));
        let status = restore(&record(dir, "a", "b"), &backup, &mut restored);

        assert_eq!(status, UndoStatus::Restored);
        assert_eq!(fs::read_to_string(dir.join("a")).unwrap(), "A");
    }
}
