//! Logs command implementation.
//!
//! Lists the operation logs of a directory, newest first.

use crate::core::oplog;
use crate::Result;
use colored::Colorize;
use std::path::Path;

/// List operation logs in `directory`.
pub fn list_logs(directory: &Path) -> Result<()> {
    println!("{}", "[LOGS] Rename logs".bold().cyan());
    println!();

    let logs = oplog::list_logs(directory)?;

    if logs.is_empty() {
        println!("No rename logs found.");
        return Ok(());
    }

    println!("{:<44} {:<10} {:<26} {}", "Log".bold(), "Files".bold(), "Stamp".bold(), "Backup".bold());
    println!("{}", "-".repeat(100));

    for (i, log) in logs.iter().enumerate() {
        let marker = if i == 0 { " (latest)".green() } else { "".normal() };

        match oplog::load_log(&log.path) {
            Ok(content) => {
                println!(
                    "{:<44} {:<10} {:<26} {}{}",
                    log.name,
                    content.renamed_files.len(),
                    log.stamp.format("%Y-%m-%d %H:%M:%S%.3f UTC").to_string(),
                    content.backup_dir.display(),
                    marker
                );
            }
            Err(_) => {
                println!("{:<44} {}{}", log.name, "(corrupted)".red(), marker);
            }
        }
    }

    Ok(())
}
