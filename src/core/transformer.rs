//! Name transformer.
//!
//! Applies a [`RenameRule`] to a single file name. The order of operations
//! is fixed because rules compose:
//! 1. Split into stem and extension
//! 2. Regex replacement on the stem
//! 3. Prefix and suffix
//! 4. Numbering token
//! 5. Timestamp token (rendered once per run)
//! 6. Reattach the extension

use crate::models::rule::{Numbering, RenameRule, MAX_PADDING};
use crate::Result;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, Utc};
use regex::Regex;

/// Proposed name for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub name: String,
    /// The stem came out empty and only the extension is left.
    pub low_confidence: bool,
}

/// Compiled, validated form of a rule.
#[derive(Debug, Clone)]
pub struct NameTransformer {
    prefix: String,
    suffix: String,
    pattern: Option<(Regex, String)>,
    numbering: Option<Numbering>,
    timestamp: Option<String>,
}

impl NameTransformer {
    /// Validate a rule and prepare it for a run started at `run_started`.
    pub fn new(rule: &RenameRule, run_started: DateTime<Utc>) -> Result<Self> {
        for (label, value) in [("prefix", &rule.prefix), ("suffix", &rule.suffix)] {
            if value.contains(['/', '\\', '\0']) {
                return Err(crate::Error::validation(format!(
                    "{} must not contain path separators: {:?}",
                    label, value
                )));
            }
        }

        if let Some(numbering) = rule.numbering {
            if numbering.padding > MAX_PADDING {
                return Err(crate::Error::validation(format!(
                    "numbering padding {} exceeds the maximum of {}",
                    numbering.padding, MAX_PADDING
                )));
            }
        }

        let pattern = match rule.pattern {
            Some(ref p) => {
                let re = Regex::new(&p.regex).map_err(|e| {
                    crate::Error::validation(format!("invalid regex pattern {:?}: {}", p.regex, e))
                })?;
                Some((re, p.replacement.clone()))
            }
            None => None,
        };

        let timestamp = match rule.timestamp {
            Some(ref t) => Some(render_timestamp(&t.format, run_started)?),
            None => None,
        };

        Ok(Self {
            prefix: rule.prefix.clone(),
            suffix: rule.suffix.clone(),
            pattern,
            numbering: rule.numbering,
            timestamp,
        })
    }

    /// Compute the candidate name for `filename` at position `index`.
    pub fn transform(&self, filename: &str, index: usize) -> Candidate {
        let (stem, extension) = split_name(filename);

        let mut new_stem = match self.pattern {
            Some((ref re, ref replacement)) => re.replace_all(stem, replacement.as_str()).into_owned(),
            None => stem.to_string(),
        };

        new_stem.insert_str(0, &self.prefix);
        new_stem.push_str(&self.suffix);

        if let Some(numbering) = self.numbering {
            let number = numbering.start.saturating_add(index as u64);
            new_stem.push_str(&format!("{:0width$}", number, width = numbering.padding));
        }

        if let Some(ref stamp) = self.timestamp {
            new_stem.push_str(stamp);
        }

        let low_confidence = new_stem.is_empty();
        Candidate {
            name: format!("{}{}", new_stem, extension),
            low_confidence,
        }
    }

    /// The timestamp token shared by every entry of this run.
    pub fn timestamp(&self) -> Option<&str> {
        self.timestamp.as_deref()
    }
}

/// Split a file name into stem and extension (extension keeps its dot).
///
/// Leading dots belong to the stem, so `.bashrc` has no extension.
pub fn split_name(filename: &str) -> (&str, &str) {
    let lead = filename.len() - filename.trim_start_matches('.').len();
    match filename[lead..].rfind('.') {
        Some(pos) => filename.split_at(lead + pos),
        None => (filename, ""),
    }
}

/// Render the run timestamp in local time with a strftime format.
fn render_timestamp(format: &str, at: DateTime<Utc>) -> Result<String> {
    let items: Vec<Item> = StrftimeItems::new(format).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(crate::Error::validation(format!(
            "invalid timestamp format: {:?}",
            format
        )));
    }

    let rendered = at
        .with_timezone(&Local)
        .format_with_items(items.into_iter())
        .to_string()
        .replace(' ', "_");

    if rendered.is_empty() {
        return Err(crate::Error::validation("timestamp format renders to an empty string"));
    }
    if rendered.contains(['/', '\\', '\0']) {
        return Err(crate::Error::validation(format!(
            "timestamp format produces path separators: {:?}",
            format
        )));
    }

    Ok(rendered)
}
