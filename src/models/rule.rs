//! Rename rule model.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Largest accepted zero-padding width for numbering.
pub const MAX_PADDING: usize = 32;

/// Default strftime format for the timestamp token.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Composable naming rule applied to every file of a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameRule {
    /// Text prepended to the stem.
    #[serde(default)]
    pub prefix: String,
    /// Text appended to the stem.
    #[serde(default)]
    pub suffix: String,
    /// Sequential numbering token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numbering: Option<Numbering>,
    /// Timestamp token shared by the whole run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<TimestampRule>,
    /// Regex replacement applied to the stem.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<PatternRule>,
    /// Normalized extensions (lowercase, dot-prefixed). Empty matches all.
    #[serde(default)]
    pub extensions: BTreeSet<String>,
}

/// Numbering settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Numbering {
    pub start: u64,
    pub padding: usize,
}

impl Default for Numbering {
    fn default() -> Self {
        Self { start: 1, padding: 3 }
    }
}

/// Timestamp settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimestampRule {
    /// strftime-style format.
    pub format: String,
}

impl Default for TimestampRule {
    fn default() -> Self {
        Self {
            format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
        }
    }
}

/// Regex replacement settings.
///
/// The replacement uses `$1` / `${name}` group references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternRule {
    pub regex: String,
    #[serde(default)]
    pub replacement: String,
}

impl RenameRule {
    /// Rule that only adds a prefix.
    pub fn with_prefix<S: Into<String>>(prefix: S) -> Self {
        Self {
            prefix: prefix.into(),
            ..Self::default()
        }
    }

    /// Replace the extension filter, normalizing every entry.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = extensions
            .into_iter()
            .filter_map(|e| normalize_extension(e.as_ref()))
            .collect();
        self
    }
}

/// Normalize one extension: trimmed, lowercase, dot-prefixed.
///
/// Returns `None` for empty input.
pub fn normalize_extension(ext: &str) -> Option<String> {
    let ext = ext.trim().to_lowercase();
    if ext.is_empty() || ext == "." {
        return None;
    }
    if ext.starts_with('.') {
        Some(ext)
    } else {
        Some(format!(".{}", ext))
    }
}

/// Parse a comma- or whitespace-separated extension list.
///
/// `"jpg, .PNG txt"` becomes `{".jpg", ".png", ".txt"}`.
pub fn parse_extension_list(list: &str) -> BTreeSet<String> {
    list.replace(',', " ")
        .split_whitespace()
        .filter_map(normalize_extension)
        .collect()
}
