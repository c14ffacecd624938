//! Command line argument definitions.

use crate::models::config::Config;
use crate::models::rule::{parse_extension_list, Numbering, PatternRule, RenameRule, TimestampRule};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Bulk Renamer - Rename batches of files with backup and undo
#[derive(Parser, Debug)]
#[command(name = "bulk-renamer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show what a rename would do without touching any file
    Preview {
        /// Directory containing the files
        #[arg(value_name = "DIR")]
        directory: PathBuf,

        #[command(flatten)]
        rule: RuleArgs,

        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rename files, backing up the originals first
    Rename {
        /// Directory containing the files
        #[arg(value_name = "DIR")]
        directory: PathBuf,

        #[command(flatten)]
        rule: RuleArgs,

        /// Dry run - show the plan and stop
        #[arg(long)]
        dry_run: bool,

        /// Backup directory (default: DIR/backup_<stamp>)
        #[arg(long, value_name = "PATH")]
        backup_dir: Option<PathBuf>,

        /// Operation log path (default: DIR/rename_log_<stamp>.json)
        #[arg(long, value_name = "PATH")]
        log_file: Option<PathBuf>,

        /// Skip SHA-256 verification of backup copies
        #[arg(long)]
        no_verify: bool,
    },

    /// Undo the most recent rename in a directory
    Undo {
        /// Directory containing the files
        #[arg(value_name = "DIR")]
        directory: PathBuf,

        /// Undo the run recorded in this log instead of the latest one
        #[arg(long, value_name = "PATH")]
        log_file: Option<PathBuf>,
    },

    /// List operation logs in a directory
    Logs {
        /// Directory containing the logs
        #[arg(value_name = "DIR")]
        directory: PathBuf,
    },
}

/// Naming rule flags shared by preview and rename.
#[derive(Args, Debug, Clone, Default)]
pub struct RuleArgs {
    /// Text to prepend to each name
    #[arg(long, default_value = "")]
    pub prefix: String,

    /// Text to append to each name (before the extension)
    #[arg(long, default_value = "")]
    pub suffix: String,

    /// Append a sequence number
    #[arg(long)]
    pub numbering: bool,

    /// First sequence number
    #[arg(long, value_name = "N")]
    pub numbering_start: Option<u64>,

    /// Zero-padding width of the sequence number
    #[arg(long, value_name = "N")]
    pub numbering_padding: Option<usize>,

    /// Append a timestamp shared by the whole run
    #[arg(long)]
    pub timestamp: bool,

    /// strftime format of the timestamp
    #[arg(long, value_name = "FORMAT")]
    pub timestamp_format: Option<String>,

    /// Regex applied to the name without its extension
    #[arg(long, value_name = "REGEX")]
    pub regex_pattern: Option<String>,

    /// Replacement for --regex-pattern ($1, ${name} refer to groups)
    #[arg(long, value_name = "TEXT", default_value = "")]
    pub regex_replacement: String,

    /// Only rename files with these extensions (e.g. "jpg,png")
    #[arg(long = "ext", value_name = "LIST")]
    pub extensions: Vec<String>,
}

impl RuleArgs {
    /// Build a rule, filling unset values from the configuration.
    pub fn to_rule(&self, config: &Config) -> RenameRule {
        let numbering = (self.numbering || self.numbering_start.is_some() || self.numbering_padding.is_some())
            .then(|| Numbering {
                start: self.numbering_start.unwrap_or(config.defaults.numbering_start),
                padding: self.numbering_padding.unwrap_or(config.defaults.numbering_padding),
            });

        let timestamp = (self.timestamp || self.timestamp_format.is_some()).then(|| TimestampRule {
            format: self
                .timestamp_format
                .clone()
                .unwrap_or_else(|| config.defaults.timestamp_format.clone()),
        });

        let pattern = self.regex_pattern.as_ref().map(|regex| PatternRule {
            regex: regex.clone(),
            replacement: self.regex_replacement.clone(),
        });

        RenameRule {
            prefix: self.prefix.clone(),
            suffix: self.suffix.clone(),
            numbering,
            timestamp,
            pattern,
            extensions: self.extensions.iter().flat_map(|e| parse_extension_list(e)).collect(),
        }
    }
}
