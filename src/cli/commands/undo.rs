//! Undo command implementation.
//!
//! Restores the originals of the latest run (or of an explicit log) from
//! the run's backup directory.

use super::BarProgress;
use crate::core::session::Session;
use crate::models::config;
use crate::models::result::{UndoResult, UndoStatus};
use crate::Result;
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Undo a rename run in `directory`.
pub fn undo(directory: &Path, log_file: Option<PathBuf>) -> Result<UndoResult> {
    println!("{}", "[UNDO] Restoring original names...".bold().cyan());
    println!();

    let mut session = Session::with_config(directory, config::load_config());
    if let Some(path) = log_file {
        session = session.log_file(path);
    }

    let result = session.undo_with_progress(&mut BarProgress::new())?;
    println!();

    for detail in result.details.iter().filter(|d| !d.status.is_restored()) {
        let line = format!("  {}: {}", detail.original_name, detail.status);
        match detail.status {
            UndoStatus::Failed(_) => println!("{}", line.red()),
            _ => println!("{}", line.yellow()),
        }
    }

    print_summary(&result);
    Ok(result)
}

fn print_summary(result: &UndoResult) {
    println!("{}", "[Summary]".bold());
    println!("  {} {}", "Success:".bold(), result.success);
    println!("  {} {}", "Restored:".bold(), result.restored.to_string().green());
    println!("  {} {}", "Skipped:".bold(), result.skipped);
    if result.failed > 0 {
        println!("  {} {}", "Failed:".bold(), result.failed.to_string().red());
    }
    println!("  {} {}", "Log file:".bold(), result.log_file.display());
    println!("  {} {}", "Backup dir:".bold(), result.backup_dir.display());
}
