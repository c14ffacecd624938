//! Backup management.
//!
//! Every run copies the originals it is about to rename into a
//! `backup_<stamp>` directory inside the target directory. The backup
//! directory is never removed by the tool.

use crate::utils::{hash, stamp};
use crate::Result;
use chrono::{DateTime, Duration, Utc};
use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

/// Attempts at finding a free `backup_<stamp>` name.
const MAX_CREATE_ATTEMPTS: u32 = 1000;

/// A verified backup copy.
#[derive(Debug, Clone)]
pub struct BackupCopy {
    pub path: PathBuf,
    pub size: u64,
    /// Present when checksum verification is enabled.
    pub checksum: Option<String>,
}

/// Owns the backup directory of one run.
#[derive(Debug, Clone)]
pub struct BackupManager {
    dir: PathBuf,
    stamp: DateTime<Utc>,
    verify_checksum: bool,
}

impl BackupManager {
    /// Create a fresh `backup_<stamp>` directory under `directory`.
    ///
    /// If the name is taken the stamp is advanced by a millisecond until a
    /// free one is found; an existing directory is never reused.
    pub fn create(
        directory: &Path,
        run_started: DateTime<Utc>,
        verify_checksum: bool,
    ) -> Result<Self> {
        let mut at = run_started;

        for _ in 0..MAX_CREATE_ATTEMPTS {
            let dir = directory.join(stamp::backup_dir_name(&at));
            match fs::create_dir(&dir) {
                Ok(()) => {
                    tracing::info!("Created backup directory {:?}", dir);
                    return Ok(Self {
                        dir,
                        stamp: at,
                        verify_checksum,
                    });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    at = at + Duration::milliseconds(1);
                }
                Err(e) => {
                    return Err(crate::Error::BackupDirCreate {
                        path: dir.display().to_string(),
                        source: e,
                    });
                }
            }
        }

        Err(crate::Error::BackupDirCreate {
            path: directory.display().to_string(),
            source: std::io::Error::new(ErrorKind::AlreadyExists, "no free backup directory name"),
        })
    }

    /// Use a caller-chosen backup directory, creating it if needed.
    ///
    /// The directory must differ from `directory`, the one being renamed.
    pub fn at_path(
        dir: &Path,
        directory: &Path,
        run_started: DateTime<Utc>,
        verify_checksum: bool,
    ) -> Result<Self> {
        fs::create_dir_all(dir).map_err(|e| crate::Error::BackupDirCreate {
            path: dir.display().to_string(),
            source: e,
        })?;

        if fs::canonicalize(dir)? == fs::canonicalize(directory)? {
            return Err(crate::Error::validation(format!(
                "backup directory {:?} is the directory being renamed",
                dir
            )));
        }
        tracing::info!("Using backup directory {:?}", dir);

        Ok(Self {
            dir: dir.to_path_buf(),
            stamp: run_started,
            verify_checksum,
        })
    }

    /// Backup directory path.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Stamp the directory was named with.
    pub fn stamp(&self) -> DateTime<Utc> {
        self.stamp
    }

    /// Copy `original` into the backup directory under its own name and
    /// verify the copy.
    pub fn copy_to_backup(&self, original: &Path) -> Result<BackupCopy> {
        let name = original
            .file_name()
            .ok_or_else(|| crate::Error::other(format!("No file name: {:?}", original)))?;
        let dest = self.dir.join(name);

        // An existing file may be another run's backup.
        let mut target = match OpenOptions::new().write(true).create_new(true).open(&dest) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(crate::Error::other(format!(
                    "backup file already exists: {}",
                    dest.display()
                )));
            }
            Err(e) => return Err(e.into()),
        };

        let copied = File::open(original).and_then(|mut source| io::copy(&mut source, &mut target));
        drop(target);
        if let Err(e) = copied {
            if let Err(rm) = fs::remove_file(&dest) {
                tracing::warn!("Failed to remove partial backup {:?}: {}", dest, rm);
            }
            return Err(e.into());
        }
        if let Err(e) = fs::metadata(original).and_then(|m| fs::set_permissions(&dest, m.permissions())) {
            tracing::warn!("Failed to copy permissions to {:?}: {}", dest, e);
        }

        match self.verify(original, &dest) {
            Ok(copy) => {
                tracing::debug!("Backed up {:?} -> {:?}", original, dest);
                Ok(copy)
            }
            Err(e) => {
                if let Err(rm) = fs::remove_file(&dest) {
                    tracing::warn!("Failed to remove unverified backup {:?}: {}", dest, rm);
                }
                Err(e)
            }
        }
    }

    fn verify(&self, original: &Path, dest: &Path) -> Result<BackupCopy> {
        let expected = fs::metadata(original)?.len();
        let actual = fs::metadata(dest)?.len();
        if expected != actual {
            return Err(crate::Error::other(format!(
                "backup size mismatch for {:?}: expected {} bytes, got {}",
                original, expected, actual
            )));
        }

        let checksum = if self.verify_checksum {
            let source_sum = hash::sha256_file(original)?;
            let backup_sum = hash::sha256_file(dest)?;
            if source_sum != backup_sum {
                return Err(crate::Error::other(format!(
                    "backup checksum mismatch for {:?}",
                    original
                )));
            }
            Some(backup_sum)
        } else {
            None
        };

        Ok(BackupCopy {
            path: dest.to_path_buf(),
            size: actual,
            checksum,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_create_names_directory_by_stamp() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let manager = BackupManager::create(temp_dir.path(), now(), false).unwrap();

        assert!(manager.dir().is_dir());
        assert_eq!(
            manager.dir().file_name().unwrap().to_string_lossy(),
            "backup_20261017_120000_000"
        );
    }

    #[test]
    fn test_create_never_reuses_directory() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let first = BackupManager::create(temp_dir.path(), now(), false).unwrap();
        let second = BackupManager::create(temp_dir.path(), now(), false).unwrap();

        assert_ne!(first.dir(), second.dir());
        assert!(second.stamp() > first.stamp());
    }

    #[test]
    fn test_create_in_missing_directory_fails() {
        let result = BackupManager::create(Path::new("/nonexistent/dir"), now(), false);
        assert!(matches!(result, Err(crate::Error::BackupDirCreate { .. })));
    }

    #[test]
    fn test_copy_to_backup_verifies() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let original = temp_dir.path().join("a.txt");
        fs::write(&original, "hello").unwrap();

        let manager = BackupManager::create(temp_dir.path(), now(), true).unwrap();
        let copy = manager.copy_to_backup(&original).unwrap();

        assert_eq!(copy.size, 5);
        assert_eq!(copy.path, manager.dir().join("a.txt"));
        assert_eq!(fs::read_to_string(&copy.path).unwrap(), "hello");
        assert!(copy.checksum.is_some());
    }

    #[test]
    fn test_at_path_rejects_target_directory() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let result = BackupManager::at_path(temp_dir.path(), temp_dir.path(), now(), true);
        assert!(matches!(result, Err(crate::Error::Validation(_))));
    }

    #[test]
    fn test_copy_never_overwrites_existing_backup() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let work = temp_dir.path().join("work");
        let saved = temp_dir.path().join("saved");
        fs::create_dir(&work).unwrap();
        fs::create_dir(&saved).unwrap();
        fs::write(saved.join("a.txt"), "earlier run").unwrap();
        fs::write(work.join("a.txt"), "later run").unwrap();

        let manager = BackupManager::at_path(&saved, &work, now(), true).unwrap();
        assert!(manager.copy_to_backup(&work.join("a.txt")).is_err());
        assert_eq!(fs::read_to_string(saved.join("a.txt")).unwrap(), "earlier run");
    }

    #[test]
    fn test_copy_missing_file_fails() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let manager = BackupManager::create(temp_dir.path(), now(), false).unwrap();
        assert!(manager.copy_to_backup(&temp_dir.path().join("missing.txt")).is_err());
    }
}
