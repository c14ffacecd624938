//! Operation log persistence.
//!
//! One `rename_log_<stamp>.json` per run. Undo consumes the log whose
//! parsed stamp is the greatest; file names whose stamp does not parse are
//! ignored.

use crate::models::oplog::OperationLog;
use crate::utils::stamp;
use crate::Result;
use chrono::{DateTime, Utc};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// An operation log found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFileInfo {
    pub path: PathBuf,
    pub name: String,
    pub stamp: DateTime<Utc>,
}

/// List operation logs in `directory`, newest first.
pub fn list_logs(directory: &Path) -> Result<Vec<LogFileInfo>> {
    crate::utils::fs::ensure_directory(directory)?;

    let mut logs: Vec<LogFileInfo> = fs::read_dir(directory)?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter_map(|e| {
            let name = e.file_name().to_str()?.to_string();
            let at = stamp::parse_log_file_name(&name)?;
            Some(LogFileInfo {
                path: e.path(),
                name,
                stamp: at,
            })
        })
        .collect();

    logs.sort_by(|a, b| b.stamp.cmp(&a.stamp).then_with(|| b.name.cmp(&a.name)));
    Ok(logs)
}

/// Path of the most recent operation log, if any.
pub fn find_latest_log(directory: &Path) -> Result<Option<PathBuf>> {
    Ok(list_logs(directory)?.into_iter().next().map(|l| l.path))
}

/// Load an operation log. Malformed content is reported as `LogCorrupt`.
pub fn load_log(path: &Path) -> Result<OperationLog> {
    let content = fs::read(path)?;
    serde_json::from_slice(&content).map_err(|e| crate::Error::LogCorrupt {
        path: path.display().to_string(),
        source: e,
    })
}

/// Save an operation log.
///
/// The content is written to a sibling temp file, synced, then renamed into
/// place so a reader never sees a half-written log.
pub fn save_log(log: &OperationLog, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(log)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut tmp_name = path.as_os_str().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    let mut file = fs::File::create(&tmp_path)?;
    file.write_all(json.as_bytes())?;
    file.sync_all()?;
    drop(file);

    fs::rename(&tmp_path, path)?;

    tracing::info!("Rename log saved to {:?}", path);
    Ok(())
}
