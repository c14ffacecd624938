//! Rename command implementation.
//!
//! Plans, backs up and renames, then points at the undo command.

use super::BarProgress;
use crate::cli::args::RuleArgs;
use crate::core::session::Session;
use crate::models::config;
use crate::Result;
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Options of the rename command besides the rule.
#[derive(Debug, Clone, Default)]
pub struct RenameOptions {
    pub dry_run: bool,
    pub backup_dir: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
    pub no_verify: bool,
}

/// Rename the files of `directory`.
pub fn rename(directory: &Path, rule: &RuleArgs, options: RenameOptions) -> Result<()> {
    let config = config::load_config();
    let rule = rule.to_rule(&config);

    let mut session = Session::with_config(directory, config);
    if let Some(dir) = options.backup_dir {
        session = session.backup_dir(dir);
    }
    if let Some(path) = options.log_file {
        session = session.log_file(path);
    }
    if options.no_verify {
        session = session.verify_checksum(false);
    }

    let plan = session.preview(&rule)?;

    if options.dry_run {
        println!("{}", "[DRY-RUN] No changes will be made".bold().yellow());
        println!();
        super::print_plan(&plan);
        return Ok(());
    }

    if plan.actionable_count() == 0 {
        super::print_plan(&plan);
        println!();
        println!("{}", "[INFO] Nothing to rename".yellow());
        return Ok(());
    }

    println!("{}", "[RENAME] Renaming files...".bold().cyan());
    println!();

    let result = session.execute_plan(&plan, &mut BarProgress::new())?;
    println!();

    println!("{}", "[Summary]".bold());
    println!("  {} {}", "Renamed:".bold(), result.renamed_count().to_string().green());
    println!("  {} {}", "Skipped:".bold(), result.skipped_count());
    if result.failed_count() > 0 {
        println!("  {} {}", "Failed:".bold(), result.failed_count().to_string().red());
        for entry in &result.failed {
            println!("    {} {}: {}", "-".red(), entry.original_name, entry.status);
        }
    }
    if let Some(ref dir) = result.backup_dir {
        println!("  {} {}", "Backup dir:".bold(), dir.display());
    }

    match result.log_file {
        Some(ref log) => {
            println!("  {} {}", "Log file:".bold(), log.display());
            println!();
            println!("{}", "[Next Steps]".bold().yellow());
            println!(
                "  To undo changes: {}",
                format!("bulk-renamer undo {}", directory.display()).cyan()
            );
        }
        None => {
            println!();
            println!("{}", "[WARNING] No file was renamed; no log written".yellow());
        }
    }

    Ok(())
}
