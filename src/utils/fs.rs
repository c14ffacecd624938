//! File system utilities.

use crate::utils::hash;
use crate::Result;
use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Check if a path exists and is a directory.
pub fn ensure_directory(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(crate::Error::PathNotFound(path.display().to_string()));
    }
    if !path.is_dir() {
        return Err(crate::Error::NotADirectory(path.display().to_string()));
    }
    Ok(())
}

/// A regular file found by [`list_directory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedFile {
    pub name: String,
    pub path: PathBuf,
}

/// Snapshot of a directory's direct children.
#[derive(Debug, Default)]
pub struct DirListing {
    /// Regular files with UTF-8 names, sorted by name.
    pub files: Vec<ListedFile>,
    /// Names of every child (files, directories, links, others).
    pub names: HashSet<OsString>,
}

impl DirListing {
    /// Whether a child with this name existed when the listing was taken.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(&OsString::from(name))
    }
}

/// List the direct children of a directory in one pass.
///
/// Symlinks are not followed and are not reported as files.
pub fn list_directory(path: &Path) -> Result<DirListing> {
    ensure_directory(path)?;

    let mut listing = DirListing::default();

    for entry in WalkDir::new(path)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = entry.map_err(std::io::Error::from)?;
        listing.names.insert(entry.file_name().to_os_string());

        if !entry.file_type().is_file() {
            continue;
        }

        match entry.file_name().to_str() {
            Some(name) => listing.files.push(ListedFile {
                name: name.to_string(),
                path: entry.path().to_path_buf(),
            }),
            None => {
                tracing::warn!("Skipping file with non UTF-8 name: {:?}", entry.path());
            }
        }
    }

    Ok(listing)
}

/// Whether anything (including a dangling symlink) occupies a path.
pub fn path_occupied(path: &Path) -> bool {
    std::fs::symlink_metadata(path).is_ok()
}

/// Compare two files by size, then by SHA-256.
pub fn files_match(a: &Path, b: &Path) -> Result<bool> {
    let len_a = std::fs::metadata(a)?.len();
    let len_b = std::fs::metadata(b)?.len();
    if len_a != len_b {
        return Ok(false);
    }
    Ok(hash::sha256_file(a)? == hash::sha256_file(b)?)
}

/// Check that a string can be used as a single path component.
pub fn is_valid_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}
