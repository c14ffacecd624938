//! Operation log data model.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One rename run, as written to `rename_log_<stamp>.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperationLog {
    /// Write timestamp (RFC 3339).
    pub generated_at: String,
    /// Backup directory holding the originals of this run.
    pub backup_dir: PathBuf,
    /// Run identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    /// Completed renames in enumeration order.
    pub renamed_files: Vec<LogRecord>,
}

/// A single completed rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub original_name: String,
    pub new_name: String,
    pub original_path: PathBuf,
    pub new_path: PathBuf,
    /// Rename timestamp (RFC 3339).
    pub renamed_at: String,
    /// SHA-256 of the backed up content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}
