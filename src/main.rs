//! Bulk Renamer CLI
//!
//! A command-line tool for renaming batches of files by rule, with backups
//! and undo.

use bulk_renamer::cli::{
    args::{Cli, Commands},
    commands::{logs, preview, rename, undo},
};
use clap::Parser;

fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    match cli.command {
        Commands::Preview { directory, rule, json } => {
            preview::preview(&directory, &rule, json)?;
        }

        Commands::Rename {
            directory,
            rule,
            dry_run,
            backup_dir,
            log_file,
            no_verify,
        } => {
            let options = rename::RenameOptions {
                dry_run,
                backup_dir,
                log_file,
                no_verify,
            };
            rename::rename(&directory, &rule, options)?;
        }

        Commands::Undo { directory, log_file } => {
            let result = undo::undo(&directory, log_file)?;
            if !result.success {
                anyhow::bail!("Undo failed for {}", directory.display());
            }
        }

        Commands::Logs { directory } => {
            logs::list_logs(&directory)?;
        }
    }

    Ok(())
}

/// Initialize the logging system.
fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("bulk_renamer=debug")
    } else {
        EnvFilter::new("bulk_renamer=info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}
