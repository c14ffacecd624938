//! Extension filter.

use crate::models::rule::RenameRule;
use crate::utils::stamp;
use std::collections::BTreeSet;

/// Decides whether a file takes part in a rename batch.
#[derive(Debug, Clone, Default)]
pub struct ExtensionFilter {
    extensions: BTreeSet<String>,
}

impl ExtensionFilter {
    pub fn new(rule: &RenameRule) -> Self {
        Self {
            extensions: rule.extensions.clone(),
        }
    }

    /// Case-insensitive suffix match. An empty set matches everything.
    ///
    /// Operation logs written by this tool never match, so a later run
    /// cannot rename the log undo depends on.
    pub fn matches(&self, filename: &str) -> bool {
        if stamp::is_log_file_name(filename) {
            return false;
        }
        if self.extensions.is_empty() {
            return true;
        }
        let lower = filename.to_lowercase();
        self.extensions.iter().any(|ext| lower.ends_with(ext.as_str()))
    }
}

/// Convenience wrapper for one-off checks.
pub fn matches(filename: &str, rule: &RenameRule) -> bool {
    ExtensionFilter::new(rule).matches(filename)
}
