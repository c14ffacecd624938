//! CLI command implementations.

pub mod logs;
pub mod preview;
pub mod rename;
pub mod undo;

use crate::core::progress::Progress;
use crate::models::plan::{EntryStatus, Plan};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

/// Progress bar shown while renaming or undoing.
pub struct BarProgress {
    bar: Option<ProgressBar>,
}

impl BarProgress {
    pub fn new() -> Self {
        Self { bar: None }
    }
}

impl Default for BarProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl Progress for BarProgress {
    fn begin(&mut self, total: usize) {
        let pb = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("█▓░"));
        }
        self.bar = Some(pb);
    }

    fn advance(&mut self, name: &str) {
        if let Some(ref pb) = self.bar {
            pb.set_message(name.to_string());
            pb.inc(1);
        }
    }

    fn finish(&mut self) {
        if let Some(pb) = self.bar.take() {
            pb.finish_with_message("Done!");
        }
    }
}

/// Print a plan as a table.
pub fn print_plan(plan: &Plan) {
    if plan.is_empty() {
        println!("No matching files in {}", plan.directory.display());
        return;
    }

    let width = plan
        .entries
        .iter()
        .map(|e| e.original_name.chars().count())
        .max()
        .unwrap_or(0)
        .max(8);

    println!(
        "{:<width$}    {:<width$}  {}",
        "Original".bold(),
        "New name".bold(),
        "Status".bold(),
        width = width
    );
    println!("{}", "-".repeat(width * 2 + 20));

    for entry in &plan.entries {
        let status = match entry.status {
            EntryStatus::Ok if entry.low_confidence => "ok (extension only)".yellow(),
            EntryStatus::Ok => "ok".green(),
            EntryStatus::Conflict(_) | EntryStatus::Failed(_) => entry.status.to_string().red(),
            _ => entry.status.to_string().dimmed(),
        };
        println!(
            "{:<width$} -> {:<width$}  {}",
            entry.original_name,
            entry.candidate_name,
            status,
            width = width
        );
    }

    println!();
    println!(
        "  {} {}  {} {}  {} {}",
        "Files:".bold(),
        plan.entries.len(),
        "To rename:".bold(),
        plan.actionable_count(),
        "Conflicts:".bold(),
        plan.conflicts().count()
    );
}
