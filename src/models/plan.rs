//! Plan data model.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Ordered rename proposal for one directory/rule combination.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Plan {
    /// Directory the plan was built for.
    pub directory: PathBuf,
    /// Creation timestamp (RFC 3339).
    pub created_at: String,
    /// Entries in enumeration order.
    pub entries: Vec<PlanEntry>,
}

/// A single file of the plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanEntry {
    /// Rank among the filtered entries; drives numbering.
    pub index: usize,
    /// Current file name.
    pub original_name: String,
    /// Current path.
    pub original_path: PathBuf,
    /// Proposed file name.
    pub candidate_name: String,
    /// Proposed path.
    pub new_path: PathBuf,
    /// Entry status.
    pub status: EntryStatus,
    /// Set when the rules left nothing but the extension.
    #[serde(default)]
    pub low_confidence: bool,
}

/// Entry status.
///
/// Plans only carry `Ok`, `Skipped` and `Conflict`; execution moves `Ok`
/// entries to `Executed` or `Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum EntryStatus {
    Ok,
    Skipped(SkipReason),
    Conflict(ConflictReason),
    Executed,
    Failed(FailureReason),
}

/// Why an entry is not renamed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Candidate equals the current name.
    Unchanged,
    /// Candidate is empty or contains a path separator.
    InvalidName,
    /// The run was cancelled before this entry.
    Cancelled,
}

/// Why an entry collides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictReason {
    /// Two or more entries claim the same target.
    DuplicateTarget,
    /// Target is occupied by a file that is not being renamed.
    ExistingFile,
}

/// Why an attempted entry failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum FailureReason {
    /// Backup copy could not be made or verified.
    Backup(String),
    /// Rename failed after the backup succeeded.
    Rename(String),
}

impl Plan {
    /// Entries that will be attempted on execution.
    pub fn actionable(&self) -> impl Iterator<Item = &PlanEntry> {
        self.entries.iter().filter(|e| e.status == EntryStatus::Ok)
    }

    /// Entries blocked by a collision.
    pub fn conflicts(&self) -> impl Iterator<Item = &PlanEntry> {
        self.entries
            .iter()
            .filter(|e| matches!(e.status, EntryStatus::Conflict(_)))
    }

    /// Number of entries that will be attempted.
    pub fn actionable_count(&self) -> usize {
        self.actionable().count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PlanEntry {
    pub fn is_ok(&self) -> bool {
        self.status == EntryStatus::Ok
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryStatus::Ok => write!(f, "ok"),
            EntryStatus::Skipped(reason) => write!(f, "skipped ({})", reason),
            EntryStatus::Conflict(reason) => write!(f, "conflict ({})", reason),
            EntryStatus::Executed => write!(f, "renamed"),
            EntryStatus::Failed(reason) => write!(f, "failed ({})", reason),
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Unchanged => write!(f, "name unchanged"),
            SkipReason::InvalidName => write!(f, "invalid name"),
            SkipReason::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictReason::DuplicateTarget => write!(f, "duplicate target"),
            ConflictReason::ExistingFile => write!(f, "target exists"),
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Backup(msg) => write!(f, "backup error: {}", msg),
            FailureReason::Rename(msg) => write!(f, "rename error: {}", msg),
        }
    }
}
