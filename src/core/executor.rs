//! Plan executor module.
//!
//! Executes the `Ok` entries of a plan:
//! - backup: copy the original into the run's backup directory and verify it
//! - rename: move the file to its new name inside the same directory
//! - log: record every completed rename in one operation log
//!
//! An entry whose target is still occupied by another entry of the same
//! plan waits until that entry has moved. When the remaining entries only
//! block each other (a cycle), one of them is moved to a temporary name
//! first.

use crate::core::backup::BackupManager;
use crate::core::oplog;
use crate::core::progress::Progress;
use crate::models::oplog::{LogRecord, OperationLog};
use crate::models::plan::{EntryStatus, FailureReason, Plan, PlanEntry, SkipReason};
use crate::models::result::RunResult;
use crate::utils::fs::path_occupied;
use crate::utils::stamp;
use crate::Result;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Executor configuration.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Whether to verify backups by checksum in addition to size.
    pub verify_checksum: bool,
    /// Backup directory to use instead of `<dir>/backup_<stamp>`.
    pub backup_dir: Option<PathBuf>,
    /// Log path to use instead of `<dir>/rename_log_<stamp>.json`.
    pub log_file: Option<PathBuf>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            verify_checksum: true,
            backup_dir: None,
            log_file: None,
        }
    }
}

/// Plan executor.
#[derive(Debug, Clone)]
pub struct RenameExecutor {
    config: ExecutorConfig,
    run_started: DateTime<Utc>,
    run_id: Uuid,
}

impl RenameExecutor {
    /// Create a new executor with default configuration.
    pub fn new() -> Self {
        Self::with_config(ExecutorConfig::default())
    }

    /// Create a new executor with custom configuration.
    pub fn with_config(config: ExecutorConfig) -> Self {
        Self::for_run(config, Utc::now(), Uuid::new_v4())
    }

    /// Create an executor bound to an existing run identity.
    pub fn for_run(config: ExecutorConfig, run_started: DateTime<Utc>, run_id: Uuid) -> Self {
        Self {
            config,
            run_started,
            run_id,
        }
    }

    /// Validate a plan before execution.
    pub fn validate(&self, plan: &Plan, directory: &Path) -> Result<()> {
        let plan_dir = fs::canonicalize(&plan.directory)?;
        let dir = fs::canonicalize(directory)?;
        if plan_dir != dir {
            return Err(crate::Error::validation(format!(
                "plan was built for {:?}, not {:?}",
                plan.directory, directory
            )));
        }

        let mut targets = HashSet::new();
        for entry in plan.actionable() {
            if entry.new_path.parent() != Some(plan.directory.as_path()) {
                return Err(crate::Error::validation(format!(
                    "target {:?} is outside {:?}",
                    entry.new_path, plan.directory
                )));
            }
            if !targets.insert(&entry.new_path) {
                return Err(crate::Error::validation(format!(
                    "duplicate target {:?}",
                    entry.new_path
                )));
            }
        }

        Ok(())
    }

    /// Execute a plan.
    ///
    /// Fails as a whole only when the plan is invalid, the backup directory
    /// cannot be created, or the log cannot be written. Per-file problems end
    /// up in the result's `failed` list.
    pub fn execute(
        &self,
        plan: &Plan,
        directory: &Path,
        progress: &mut dyn Progress,
    ) -> Result<RunResult> {
        self.validate(plan, directory)?;

        let actionable: Vec<usize> = plan
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_ok())
            .map(|(i, _)| i)
            .collect();

        if actionable.is_empty() {
            tracing::info!("Nothing to rename in {:?}", directory);
            return Ok(partition(plan.entries.clone(), None, None, false));
        }

        if let Some(ref log_file) = self.config.log_file {
            if path_occupied(log_file) {
                return Err(crate::Error::validation(format!(
                    "log file {:?} already exists",
                    log_file
                )));
            }
        }

        let backup = match self.config.backup_dir {
            Some(ref dir) => {
                BackupManager::at_path(dir, &plan.directory, self.run_started, self.config.verify_checksum)?
            }
            None => BackupManager::create(&plan.directory, self.run_started, self.config.verify_checksum)?,
        };

        tracing::info!("Executing {} renames in {:?}", actionable.len(), directory);
        progress.begin(actionable.len());

        let mut state = RunState::new(plan, &backup, &self.run_id);
        let mut deferred: Vec<usize> = Vec::new();
        let mut cancelled = false;
        let mut visited = 0;

        for &idx in &actionable {
            if progress.cancelled() {
                cancelled = true;
                break;
            }
            visited += 1;

            if !state.backup(idx) {
                progress.advance(&state.entries[idx].original_name);
                continue;
            }

            if state.target_blocked(idx) {
                tracing::debug!("Deferring {:?}", state.entries[idx].original_name);
                deferred.push(idx);
                continue;
            }

            state.rename(idx);
            progress.advance(&state.entries[idx].original_name);
        }

        while !deferred.is_empty() && !cancelled {
            let mut progressed = false;
            let mut waiting = Vec::new();

            for idx in deferred.drain(..) {
                if cancelled || progress.cancelled() {
                    cancelled = true;
                    waiting.push(idx);
                    continue;
                }
                if state.target_blocked(idx) {
                    waiting.push(idx);
                    continue;
                }
                state.rename(idx);
                progress.advance(&state.entries[idx].original_name);
                progressed = true;
            }
            deferred = waiting;

            if !progressed && !cancelled {
                if let Some(&idx) = deferred.first() {
                    if let Err(e) = state.stage(idx) {
                        state.fail(idx, FailureReason::Rename(format!("cannot break rename cycle: {}", e)));
                        progress.advance(&state.entries[idx].original_name);
                        deferred.remove(0);
                    }
                }
            }
        }

        if cancelled {
            tracing::warn!("Run cancelled; remaining entries left untouched");
            for idx in deferred {
                state.cancel(idx);
            }
            for &idx in &actionable[visited..] {
                state.cancel(idx);
            }
        }

        progress.finish();

        let log_file = if state.records.is_empty() {
            tracing::warn!("No files were renamed; no log written. Backup kept at {:?}", backup.dir());
            None
        } else {
            let path = match self.config.log_file {
                Some(ref p) => p.clone(),
                None => plan.directory.join(stamp::log_file_name(&backup.stamp())),
            };
            let log = state.operation_log(&self.run_id);
            if let Err(e) = oplog::save_log(&log, &path) {
                tracing::error!(
                    "Failed to write rename log {:?}: {}. Originals are in {:?}",
                    path,
                    e,
                    backup.dir()
                );
                return Err(e);
            }
            Some(path)
        };

        let result = partition(state.entries, Some(absolute(backup.dir())), log_file, cancelled);

        tracing::info!(
            "Run finished: {} renamed, {} skipped, {} failed",
            result.renamed_count(),
            result.skipped_count(),
            result.failed_count()
        );

        Ok(result)
    }
}

impl Default for RenameExecutor {
    fn default() -> Self {
        Self::new()
    }
}

/// Mutable bookkeeping for one run.
struct RunState<'a> {
    backup: &'a BackupManager,
    directory: PathBuf,
    staging_tag: String,
    entries: Vec<PlanEntry>,
    /// Current location of every unresolved entry.
    pending: HashMap<PathBuf, usize>,
    /// Entries parked under a temporary name.
    staged: HashMap<usize, PathBuf>,
    checksums: HashMap<usize, Option<String>>,
    records: Vec<(usize, LogRecord)>,
}

impl<'a> RunState<'a> {
    fn new(plan: &Plan, backup: &'a BackupManager, run_id: &Uuid) -> Self {
        let pending = plan
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_ok())
            .map(|(i, e)| (e.original_path.clone(), i))
            .collect();

        Self {
            backup,
            directory: plan.directory.clone(),
            staging_tag: run_id.simple().to_string()[..8].to_string(),
            entries: plan.entries.clone(),
            pending,
            staged: HashMap::new(),
            checksums: HashMap::new(),
            records: Vec::new(),
        }
    }

    fn source(&self, idx: usize) -> PathBuf {
        self.staged
            .get(&idx)
            .cloned()
            .unwrap_or_else(|| self.entries[idx].original_path.clone())
    }

    /// Whether another unresolved entry still sits on this entry's target.
    fn target_blocked(&self, idx: usize) -> bool {
        self.pending
            .get(&self.entries[idx].new_path)
            .is_some_and(|&other| other != idx)
    }

    /// Back up one entry. Returns false if the entry failed.
    fn backup(&mut self, idx: usize) -> bool {
        match self.backup.copy_to_backup(&self.entries[idx].original_path) {
            Ok(copy) => {
                self.checksums.insert(idx, copy.checksum);
                true
            }
            Err(e) => {
                tracing::error!("Backup failed for {:?}: {}", self.entries[idx].original_path, e);
                self.fail(idx, FailureReason::Backup(e.to_string()));
                false
            }
        }
    }

    fn rename(&mut self, idx: usize) {
        let source = self.source(idx);
        let target = self.entries[idx].new_path.clone();

        if path_occupied(&target) {
            let msg = format!("destination already exists: {}", target.display());
            tracing::error!("Refusing to overwrite {:?}", target);
            let msg = self.unstage(idx).map_or(msg.clone(), |note| format!("{}; {}", msg, note));
            self.fail(idx, FailureReason::Rename(msg));
            return;
        }

        match fs::rename(&source, &target) {
            Ok(()) => {
                tracing::debug!("Renamed {:?} -> {:?}", self.entries[idx].original_path, target);
                self.pending.remove(&source);
                self.staged.remove(&idx);
                self.entries[idx].status = EntryStatus::Executed;

                let entry = &self.entries[idx];
                self.records.push((
                    idx,
                    LogRecord {
                        original_name: entry.original_name.clone(),
                        new_name: entry.candidate_name.clone(),
                        original_path: entry.original_path.clone(),
                        new_path: entry.new_path.clone(),
                        renamed_at: Utc::now().to_rfc3339(),
                        checksum: self.checksums.get(&idx).cloned().flatten(),
                    },
                ));
            }
            Err(e) => {
                tracing::error!("Rename failed for {:?}: {}", source, e);
                let msg = self
                    .unstage(idx)
                    .map_or(e.to_string(), |note| format!("{}; {}", e, note));
                self.fail(idx, FailureReason::Rename(msg));
            }
        }
    }

    /// Move an entry to a temporary name so its original path frees up.
    fn stage(&mut self, idx: usize) -> Result<()> {
        let original = self.entries[idx].original_path.clone();
        let name = &self.entries[idx].original_name;

        let mut temp = self.directory.join(format!(".{}.{}.renaming", name, self.staging_tag));
        let mut n = 1;
        while path_occupied(&temp) {
            temp = self
                .directory
                .join(format!(".{}.{}.{}.renaming", name, self.staging_tag, n));
            n += 1;
        }

        fs::rename(&original, &temp)?;
        tracing::debug!("Staged {:?} as {:?}", original, temp);

        self.pending.remove(&original);
        self.pending.insert(temp.clone(), idx);
        self.staged.insert(idx, temp);
        Ok(())
    }

    /// Move a staged entry back to its original path.
    ///
    /// Returns a note when the file has to stay under its temporary name.
    fn unstage(&mut self, idx: usize) -> Option<String> {
        let temp = self.staged.remove(&idx)?;
        let original = &self.entries[idx].original_path;

        if !path_occupied(original) {
            match fs::rename(&temp, original) {
                Ok(()) => {
                    self.pending.remove(&temp);
                    self.pending.insert(original.clone(), idx);
                    return None;
                }
                Err(e) => tracing::error!("Cannot move {:?} back: {}", temp, e),
            }
        }

        tracing::error!("File {:?} left at temporary name {:?}", original, temp);
        Some(format!("file left at {}", temp.display()))
    }

    fn fail(&mut self, idx: usize, reason: FailureReason) {
        let source = self.source(idx);
        self.pending.remove(&source);
        self.entries[idx].status = EntryStatus::Failed(reason);
    }

    fn cancel(&mut self, idx: usize) {
        if let Some(note) = self.unstage(idx) {
            self.fail(idx, FailureReason::Rename(format!("cancelled; {}", note)));
            return;
        }
        self.pending.remove(&self.entries[idx].original_path);
        self.entries[idx].status = EntryStatus::Skipped(SkipReason::Cancelled);
    }

    fn operation_log(&mut self, run_id: &Uuid) -> OperationLog {
        self.records.sort_by_key(|(idx, _)| *idx);
        OperationLog {
            generated_at: Utc::now().to_rfc3339(),
            backup_dir: absolute(self.backup.dir()),
            run_id: Some(run_id.to_string()),
            renamed_files: self.records.iter().map(|(_, r)| r.clone()).collect(),
        }
    }
}

fn absolute(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Split resolved entries into the result lists, keeping plan order.
fn partition(
    entries: Vec<PlanEntry>,
    backup_dir: Option<PathBuf>,
    log_file: Option<PathBuf>,
    cancelled: bool,
) -> RunResult {
    let mut result = RunResult {
        backup_dir,
        log_file,
        cancelled,
        ..RunResult::default()
    };

    for entry in entries {
        match entry.status {
            EntryStatus::Executed => result.renamed.push(entry),
            EntryStatus::Failed(_) => result.failed.push(entry),
            _ => result.skipped.push(entry),
        }
    }

    result
}

/// Execute a plan with default settings (convenience function).
pub fn execute_plan(plan: &Plan, directory: &Path) -> Result<RunResult> {
    RenameExecutor::new().execute(plan, directory, &mut crate::core::progress::NoProgress)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::plan::ConflictReason;

    fn entry(dir: &Path, index: usize, from: &str, to: &str) -> PlanEntry {
        PlanEntry {
            index,
            original_name: from.to_string(),
            original_path: dir.join(from),
            candidate_name: to.to_string(),
            new_path: dir.join(to),
            status: EntryStatus::Ok,
            low_confidence: false,
        }
    }

    fn plan(dir: &Path, entries: Vec<PlanEntry>) -> Plan {
        Plan {
            directory: dir.to_path_buf(),
            created_at: Utc::now().to_rfc3339(),
            entries,
        }
    }

    fn canonical_tempdir() -> (tempfile::TempDir, PathBuf) {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let dir = fs::canonicalize(temp_dir.path()).unwrap();
        (temp_dir, dir)
    }

    #[test]
    fn test_validate_rejects_duplicate_targets() {
        let (_guard, dir) = canonical_tempdir();
        let p = plan(&dir, vec![entry(&dir, 0, "a", "x"), entry(&dir, 1, "b", "x")]);
        let err = RenameExecutor::new().validate(&p, &dir).unwrap_err();
        assert!(matches!(err, crate::Error::Validation(_)));
    }

    #[test]
    fn test_validate_rejects_other_directory() {
        let (_guard_a, dir_a) = canonical_tempdir();
        let (_guard_b, dir_b) = canonical_tempdir();
        let p = plan(&dir_a, vec![]);
        assert!(RenameExecutor::new().validate(&p, &dir_b).is_err());
    }

    #[test]
    fn test_nothing_actionable_creates_no_backup() {
        let (_guard, dir) = canonical_tempdir();
        fs::write(dir.join("a"), "a").unwrap();
        let mut e = entry(&dir, 0, "a", "b");
        e.status = EntryStatus::Conflict(ConflictReason::ExistingFile);

        let result = execute_plan(&plan(&dir, vec![e]), &dir).unwrap();
        assert_eq!(result.skipped_count(), 1);
        assert!(result.backup_dir.is_none());
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 1);
    }

    #[test]
    fn test_chain_renames_in_dependency_order() {
        let (_guard, dir) = canonical_tempdir();
        fs::write(dir.join("a"), "A").unwrap();
        fs::write(dir.join("b"), "B").unwrap();

        let p = plan(&dir, vec![entry(&dir, 0, "a", "b"), entry(&dir, 1, "b", "c")]);
        let result = execute_plan(&p, &dir).unwrap();

        assert_eq!(result.renamed_count(), 2);
        assert_eq!(fs::read_to_string(dir.join("b")).unwrap(), "A");
        assert_eq!(fs::read_to_string(dir.join("c")).unwrap(), "B");
        assert!(!dir.join("a").exists());
    }

    #[test]
    fn test_cycle_is_broken_with_temp_name() {
        let (_guard, dir) = canonical_tempdir();
        fs::write(dir.join("a"), "A").unwrap();
        fs::write(dir.join("b"), "B").unwrap();

        let p = plan(&dir, vec![entry(&dir, 0, "a", "b"), entry(&dir, 1, "b", "a")]);
        let result = execute_plan(&p, &dir).unwrap();

        assert_eq!(result.renamed_count(), 2);
        assert_eq!(fs::read_to_string(dir.join("a")).unwrap(), "B");
        assert_eq!(fs::read_to_string(dir.join("b")).unwrap(), "A");

        let leftovers: Vec<_> = fs::read_dir(&dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".renaming"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_log_records_follow_plan_order() {
        let (_guard, dir) = canonical_tempdir();
        fs::write(dir.join("a"), "A").unwrap();
        fs::write(dir.join("b"), "B").unwrap();

        let p = plan(&dir, vec![entry(&dir, 0, "a", "b"), entry(&dir, 1, "b", "c")]);
        let result = execute_plan(&p, &dir).unwrap();

        let log = oplog::load_log(result.log_file.as_ref().unwrap()).unwrap();
        let names: Vec<_> = log.renamed_files.iter().map(|r| r.original_name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
