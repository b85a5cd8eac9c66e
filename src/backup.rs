//! # Backup Ledger
//!
//! A backup is a sibling file at `path + suffix` holding the content the file
//! had before its first upgrade. Its existence is the record; the processed
//! file list (kept in a [`ProcessedFileStore`]) says which backups belong to
//! the runs this tool made.
//!
//! Per file: `Untouched -> Modified -> BackedUp -> (Restored | BackupDeleted)`.

use crate::errors::UpgradeError;
use crate::store::ProcessedFileStore;
use serde::Serialize;
use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileState {
    Untouched,
    Modified,
    BackedUp,
    Restored,
    BackupDeleted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Outcome of a batch backup operation. One failing file never stops the rest.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    /// Files that reached the operation's target state
    pub completed: Vec<PathBuf>,
    /// Tracked files that had no backup to act on
    pub skipped: Vec<PathBuf>,
    pub failures: Vec<BackupFailure>,
}

impl BatchReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    fn fail(&mut self, path: &Path, err: impl std::fmt::Display) {
        error!("{}: {}", path.display(), err);
        self.failures.push(BackupFailure {
            path: path.to_path_buf(),
            message: err.to_string(),
        });
    }
}

pub struct BackupLedger<S> {
    store: S,
    suffix: String,
}

impl<S: ProcessedFileStore> BackupLedger<S> {
    pub fn new(store: S, suffix: impl Into<String>) -> Self {
        Self {
            store,
            suffix: suffix.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn backup_path(&self, path: &Path) -> PathBuf {
        let mut backup: OsString = path.as_os_str().to_owned();
        backup.push(&self.suffix);
        PathBuf::from(backup)
    }

    /// Write `original` as the backup of `path` unless a backup already exists.
    ///
    /// Returns `Ok(false)` when an earlier backup was kept. The first backup
    /// always wins so repeated runs never lose the true original.
    pub fn create_backup(&self, path: &Path, original: &str) -> Result<bool, UpgradeError> {
        let backup_path = self.backup_path(path);
        let mut file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&backup_path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                debug!("Keeping existing backup {:?}", backup_path);
                return Ok(false);
            }
            Err(e) => return Err(UpgradeError::io(&backup_path, e)),
        };

        if let Err(e) = file.write_all(original.as_bytes()).and_then(|_| file.sync_all()) {
            drop(file);
            let _ = fs::remove_file(&backup_path);
            return Err(UpgradeError::io(&backup_path, e));
        }

        info!("Created backup at: {}", backup_path.display());
        Ok(true)
    }

    /// Remove a backup written moments ago for a rewrite that never landed.
    pub fn discard_backup(&self, path: &Path) -> Result<(), UpgradeError> {
        let backup_path = self.backup_path(path);
        fs::remove_file(&backup_path).map_err(|e| UpgradeError::io(&backup_path, e))?;
        debug!("Discarded backup {}", backup_path.display());
        Ok(())
    }

    pub fn has_backup(&self, path: &Path) -> bool {
        self.backup_path(path).is_file()
    }

    /// Current state of a file as far as the ledger can tell from disk.
    pub fn state_of(&self, path: &Path) -> Result<FileState, UpgradeError> {
        if self.has_backup(path) {
            return Ok(FileState::BackedUp);
        }
        let tracked = self.store.load()?.iter().any(|p| p == path);
        Ok(if tracked {
            FileState::Modified
        } else {
            FileState::Untouched
        })
    }

    pub fn processed_files(&self) -> Result<Vec<PathBuf>, UpgradeError> {
        self.store.load()
    }

    /// Merge a run's modified files into the processed list.
    ///
    /// Earlier entries are kept so their backups stay restorable.
    pub fn record_run(&mut self, modified: &[PathBuf]) -> Result<(), UpgradeError> {
        let mut files = self.store.load().unwrap_or_else(|e| {
            warn!("Starting a fresh processed-file list: {}", e);
            Vec::new()
        });
        for path in modified {
            if !files.contains(path) {
                files.push(path.clone());
            }
        }
        self.store.save(&files)
    }

    /// Whether any tracked file currently has a backup.
    pub fn has_backups(&self) -> Result<bool, UpgradeError> {
        Ok(self.store.load()?.iter().any(|path| self.has_backup(path)))
    }

    /// Copy the backup over `path`, then delete the backup.
    ///
    /// Returns `Ok(false)` when there is no backup to restore.
    pub fn restore_file(&self, path: &Path) -> Result<bool, UpgradeError> {
        let backup_path = self.backup_path(path);
        if !backup_path.is_file() {
            return Ok(false);
        }
        fs::copy(&backup_path, path).map_err(|e| UpgradeError::io(path, e))?;
        fs::remove_file(&backup_path).map_err(|e| UpgradeError::io(&backup_path, e))?;
        debug!("Restored {}", path.display());
        Ok(true)
    }

    /// Restore every tracked file, then clear the processed list.
    pub fn restore_processed(&mut self) -> Result<BatchReport, UpgradeError> {
        let files = self.store.load()?;
        let mut report = BatchReport::default();

        for path in &files {
            match self.restore_file(path) {
                Ok(true) => report.completed.push(path.clone()),
                Ok(false) => report.skipped.push(path.clone()),
                Err(e) => report.fail(path, format!("Error restoring: {e}")),
            }
        }

        self.clear_processed()?;
        Ok(report)
    }

    /// Delete the backups of tracked files only, then clear the processed list.
    pub fn delete_processed_backups(&mut self) -> Result<BatchReport, UpgradeError> {
        let files = self.store.load()?;
        let mut report = BatchReport::default();

        for path in &files {
            let backup_path = self.backup_path(path);
            if !backup_path.is_file() {
                report.skipped.push(path.clone());
                continue;
            }
            match fs::remove_file(&backup_path) {
                Ok(()) => {
                    info!("Deleted backup file: {}", backup_path.display());
                    report.completed.push(backup_path);
                }
                Err(e) => report.fail(&backup_path, format!("Error deleting backup: {e}")),
            }
        }

        self.clear_processed()?;
        Ok(report)
    }

    /// Delete every file under `root` carrying the backup suffix, tracked or not.
    ///
    /// There is no undo.
    pub fn delete_all_backups(&self, root: &Path) -> BatchReport {
        let mut report = BatchReport::default();

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().unwrap_or(root).to_path_buf();
                    report.fail(&path, e);
                    continue;
                }
            };
            let is_backup = entry.file_type().is_file()
                && entry.file_name().to_string_lossy().ends_with(&self.suffix);
            if !is_backup {
                continue;
            }
            match fs::remove_file(entry.path()) {
                Ok(()) => {
                    info!("Deleted: {}", entry.path().display());
                    report.completed.push(entry.into_path());
                }
                Err(e) => report.fail(entry.path(), format!("Error deleting: {e}")),
            }
        }

        report
    }

    fn clear_processed(&mut self) -> Result<(), UpgradeError> {
        self.store.save(&[])
    }
}
