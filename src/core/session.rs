//! Rename session.
//!
//! A [`Session`] carries everything one invocation needs: the target
//! directory, the loaded configuration and the run identity (start time and
//! UUID). Planning, execution and undo all read from it, so a preview and
//! the rename that follows it share the same timestamp token.

use crate::core::executor::{ExecutorConfig, RenameExecutor};
use crate::core::planner::PlanBuilder;
use crate::core::progress::{NoProgress, Progress};
use crate::core::undo::UndoExecutor;
use crate::models::config::Config;
use crate::models::plan::Plan;
use crate::models::result::{RunResult, UndoResult};
use crate::models::rule::RenameRule;
use crate::Result;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// One invocation of the engine against a directory.
#[derive(Debug, Clone)]
pub struct Session {
    directory: PathBuf,
    config: Config,
    started_at: DateTime<Utc>,
    run_id: Uuid,
    backup_dir: Option<PathBuf>,
    log_file: Option<PathBuf>,
}

impl Session {
    /// Start a session with default configuration.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self::with_config(directory, Config::default())
    }

    /// Start a session with the given configuration.
    pub fn with_config(directory: impl Into<PathBuf>, config: Config) -> Self {
        Self {
            directory: directory.into(),
            config,
            started_at: Utc::now(),
            run_id: Uuid::new_v4(),
            backup_dir: None,
            log_file: None,
        }
    }

    /// Use a custom backup directory for the rename.
    pub fn backup_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.backup_dir = Some(path.into());
        self
    }

    /// Use a custom log path for the rename, or an explicit log for undo.
    pub fn log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    /// Toggle checksum verification of backups.
    pub fn verify_checksum(mut self, verify: bool) -> Self {
        self.config.backup.verify_checksum = verify;
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Build the plan without touching the filesystem.
    pub fn preview(&self, rule: &RenameRule) -> Result<Plan> {
        let mut builder = PlanBuilder::new(rule, self.started_at)?;
        if let Some(ref log_file) = self.log_file {
            builder = builder.excluding(log_file.clone());
        }
        builder.build(&self.directory)
    }

    /// Plan and execute a rename.
    pub fn execute(&self, rule: &RenameRule) -> Result<RunResult> {
        self.execute_with_progress(rule, &mut NoProgress)
    }

    /// Plan and execute a rename, reporting progress.
    pub fn execute_with_progress(&self, rule: &RenameRule, progress: &mut dyn Progress) -> Result<RunResult> {
        let plan = self.preview(rule)?;
        self.execute_plan(&plan, progress)
    }

    /// Execute a plan built earlier, for example one shown to the user.
    pub fn execute_plan(&self, plan: &Plan, progress: &mut dyn Progress) -> Result<RunResult> {
        let config = ExecutorConfig {
            verify_checksum: self.config.backup.verify_checksum,
            backup_dir: self.backup_dir.clone(),
            log_file: self.log_file.clone(),
        };
        RenameExecutor::for_run(config, self.started_at, self.run_id).execute(plan, &self.directory, progress)
    }

    /// Undo the latest run, or the run in the configured log file.
    pub fn undo(&self) -> Result<UndoResult> {
        self.undo_with_progress(&mut NoProgress)
    }

    /// Undo, reporting progress.
    pub fn undo_with_progress(&self, progress: &mut dyn Progress) -> Result<UndoResult> {
        let executor = match self.log_file {
            Some(ref path) => UndoExecutor::with_log_file(path),
            None => UndoExecutor::new(),
        };
        executor.undo(&self.directory, progress)
    }

    /// Undo the run recorded in `log_file`.
    pub fn undo_from(&self, log_file: &Path) -> Result<UndoResult> {
        UndoExecutor::with_log_file(log_file).undo(&self.directory, &mut NoProgress)
    }
}

/// Preview a rename of `directory` (convenience function).
pub fn preview(directory: &Path, rule: &RenameRule) -> Result<Plan> {
    Session::new(directory).preview(rule)
}

/// Rename the files of `directory` (convenience function).
pub fn execute(directory: &Path, rule: &RenameRule) -> Result<RunResult> {
    Session::new(directory).execute(rule)
}

/// Undo the latest rename in `directory` (convenience function).
pub fn undo(directory: &Path) -> Result<UndoResult> {
    Session::new(directory).undo()
}
