//! Plan generation module.
//!
//! Coordinates the planning process:
//! 1. List the directory (files only) and apply the extension filter
//! 2. Compute candidate names in sorted order
//! 3. Mark unchanged/invalid names as skipped
//! 4. Detect collisions
//!
//! Planning reads the directory listing once and never writes, so preview
//! and execute share the same builder.

use crate::core::filter::ExtensionFilter;
use crate::core::transformer::NameTransformer;
use crate::models::plan::{ConflictReason, EntryStatus, Plan, PlanEntry, SkipReason};
use crate::models::rule::RenameRule;
use crate::utils::fs::{self, DirListing};
use crate::Result;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Plan generator.
#[derive(Debug, Clone)]
pub struct PlanBuilder {
    transformer: NameTransformer,
    filter: ExtensionFilter,
    run_started: DateTime<Utc>,
    /// Files left out of the plan, such as a custom log file.
    excluded: Vec<PathBuf>,
}

impl PlanBuilder {
    /// Validate the rule and create a builder for a run started at `run_started`.
    pub fn new(rule: &RenameRule, run_started: DateTime<Utc>) -> Result<Self> {
        Ok(Self {
            transformer: NameTransformer::new(rule, run_started)?,
            filter: ExtensionFilter::new(rule),
            run_started,
            excluded: Vec::new(),
        })
    }

    /// Leave `path` out of the plan even if the filter matches it.
    pub fn excluding(mut self, path: impl Into<PathBuf>) -> Self {
        self.excluded.push(path.into());
        self
    }

    /// Build a plan for `directory`.
    pub fn build(&self, directory: &Path) -> Result<Plan> {
        tracing::info!("Building rename plan for {:?}", directory);

        fs::ensure_directory(directory)?;
        let directory = &std::fs::canonicalize(directory)?;
        let listing = fs::list_directory(directory)?;
        let excluded: HashSet<PathBuf> = self.excluded.iter().filter_map(|p| resolve(p)).collect();

        let mut entries: Vec<PlanEntry> = listing
            .files
            .iter()
            .filter(|f| !excluded.contains(&f.path))
            .filter(|f| self.filter.matches(&f.name))
            .enumerate()
            .map(|(index, file)| {
                let candidate = self.transformer.transform(&file.name, index);
                let status = if !fs::is_valid_file_name(&candidate.name) {
                    EntryStatus::Skipped(SkipReason::InvalidName)
                } else if candidate.name == file.name {
                    EntryStatus::Skipped(SkipReason::Unchanged)
                } else {
                    EntryStatus::Ok
                };

                PlanEntry {
                    index,
                    original_name: file.name.clone(),
                    original_path: file.path.clone(),
                    new_path: directory.join(&candidate.name),
                    candidate_name: candidate.name,
                    status,
                    low_confidence: candidate.low_confidence,
                }
            })
            .collect();

        resolve_collisions(&mut entries, &listing);

        let plan = Plan {
            directory: directory.to_path_buf(),
            created_at: self.run_started.to_rfc3339(),
            entries,
        };

        tracing::info!(
            "Plan ready: {} files, {} to rename, {} conflicts",
            plan.entries.len(),
            plan.actionable_count(),
            plan.conflicts().count()
        );

        Ok(plan)
    }
}

/// Absolute path of `path` with its parent resolved, or `None` when the
/// parent does not exist.
fn resolve(path: &Path) -> Option<PathBuf> {
    let name = path.file_name()?;
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::canonicalize(parent).ok().map(|p| p.join(name))
}

/// Mark colliding `Ok` entries as conflicts.
///
/// A target claimed by two or more entries is a duplicate. A target that
/// exists and is not being renamed away is an existing-file conflict.
/// Conflicts shrink the set of files being renamed, which can expose new
/// existing-file conflicts, so this repeats until nothing changes.
pub fn resolve_collisions(entries: &mut [PlanEntry], listing: &DirListing) {
    let mut claims: HashMap<String, usize> = HashMap::new();
    for entry in entries.iter().filter(|e| e.is_ok()) {
        *claims.entry(entry.candidate_name.clone()).or_insert(0) += 1;
    }

    for entry in entries.iter_mut().filter(|e| e.is_ok()) {
        if claims.get(&entry.candidate_name).copied().unwrap_or(0) > 1 {
            tracing::debug!("Duplicate target {:?}", entry.candidate_name);
            entry.status = EntryStatus::Conflict(ConflictReason::DuplicateTarget);
        }
    }

    loop {
        let moving: HashSet<String> = entries
            .iter()
            .filter(|e| e.is_ok())
            .map(|e| e.original_name.clone())
            .collect();

        let mut changed = false;
        for entry in entries.iter_mut().filter(|e| e.is_ok()) {
            if listing.contains(&entry.candidate_name) && !moving.contains(&entry.candidate_name) {
                tracing::debug!("Target exists: {:?}", entry.candidate_name);
                entry.status = EntryStatus::Conflict(ConflictReason::ExistingFile);
                changed = true;
            }
        }

        if !changed {
            break;
        }
    }
}

/// Build a plan (convenience function).
pub fn build_plan(directory: &Path, rule: &RenameRule) -> Result<Plan> {
    PlanBuilder::new(rule, Utc::now())?.build(directory)
}
