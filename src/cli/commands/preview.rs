//! Preview command implementation.
//!
//! Builds the rename plan and prints it. Nothing on disk changes.

use crate::cli::args::RuleArgs;
use crate::core::session::Session;
use crate::models::config;
use crate::Result;
use colored::Colorize;
use std::path::Path;

/// Print the plan for `directory`.
pub fn preview(directory: &Path, rule: &RuleArgs, json: bool) -> Result<()> {
    let config = config::load_config();
    let rule = rule.to_rule(&config);
    let plan = Session::with_config(directory, config).preview(&rule)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    println!("{}", "[PREVIEW] Rename plan".bold().cyan());
    println!();
    super::print_plan(&plan);

    if plan.actionable_count() > 0 {
        println!();
        println!("{}", "[Next Steps]".bold().yellow());
        println!(
            "  To apply: {}",
            format!("bulk-renamer rename {} ...", directory.display()).cyan()
        );
    }

    Ok(())
}
