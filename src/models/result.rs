//! Run and undo result models.

use super::plan::PlanEntry;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Outcome of executing a plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunResult {
    /// Entries that were renamed (`Executed`).
    pub renamed: Vec<PlanEntry>,
    /// Entries that were never attempted (skips, conflicts, cancellations).
    pub skipped: Vec<PlanEntry>,
    /// Entries that were attempted and failed.
    pub failed: Vec<PlanEntry>,
    /// Backup directory, if one was created.
    pub backup_dir: Option<PathBuf>,
    /// Operation log, if one was written.
    pub log_file: Option<PathBuf>,
    /// Whether the run stopped early.
    pub cancelled: bool,
}

impl RunResult {
    pub fn renamed_count(&self) -> usize {
        self.renamed.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }
}

/// Outcome of an undo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UndoResult {
    /// True whenever the log and backup directory were found.
    pub success: bool,
    pub restored: usize,
    /// Entries skipped, cancelled or failed.
    pub skipped: usize,
    /// Subset of `skipped` that failed with an error.
    pub failed: usize,
    pub details: Vec<UndoDetail>,
    pub log_file: PathBuf,
    pub backup_dir: PathBuf,
}

/// Per-file undo outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndoDetail {
    pub original_name: String,
    pub status: UndoStatus,
}

/// Resolved state of one log record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum UndoStatus {
    Restored,
    SkippedBackupMissing,
    SkippedAlreadyRestored,
    Cancelled,
    Failed(String),
}

impl UndoStatus {
    pub fn is_restored(&self) -> bool {
        matches!(self, UndoStatus::Restored)
    }
}

impl fmt::Display for UndoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UndoStatus::Restored => write!(f, "restored"),
            UndoStatus::SkippedBackupMissing => write!(f, "skipped (backup file missing)"),
            UndoStatus::SkippedAlreadyRestored => write!(f, "skipped (already restored)"),
            UndoStatus::Cancelled => write!(f, "cancelled"),
            UndoStatus::Failed(msg) => write!(f, "failed ({})", msg),
        }
    }
}
