//! # Upgrader
//!
//! Composition root of the engine: scanner -> indexer -> rewriter -> backup
//! ledger, file by file. This is the only entry point a host (CLI, editor
//! panel) needs.
//!
//! Files are processed strictly one after another. A failure on one file is
//! recorded on its result and the batch moves on; only an invalid rule set
//! stops a run, and it does so before any file is read.

use crate::analysis;
use crate::backup::BackupLedger;
use crate::config::UpgraderConfig;
use crate::errors::UpgradeError;
use crate::indexer::TypeUsageIndexer;
use crate::io::{read_text, write_text_atomic};
use crate::pattern::PatternCache;
use crate::rewriter::Rewriter;
use crate::rules::RuleSet;
use crate::scanner::Scanner;
use crate::store::ProcessedFileStore;
use crate::types::*;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

pub struct Upgrader<S> {
    config: UpgraderConfig,
    rules: RuleSet,
    scanner: Scanner,
    indexer: TypeUsageIndexer,
    rewriter: Rewriter,
    ledger: BackupLedger<S>,
}

impl<S: ProcessedFileStore> Upgrader<S> {
    /// Build an upgrader. Fails fast on an invalid rule set or exclude glob.
    pub fn new(config: UpgraderConfig, rules: RuleSet, store: S) -> Result<Self, UpgradeError> {
        rules.validate()?;
        let scanner = Scanner::from_config(&config)?;
        let patterns = PatternCache::with_capacity(config.pattern_cache_size);
        let ledger = BackupLedger::new(store, config.backup_suffix.clone());

        Ok(Self {
            scanner,
            indexer: TypeUsageIndexer::new(patterns.clone()),
            rewriter: Rewriter::new(patterns),
            ledger,
            config,
            rules,
        })
    }

    pub fn config(&self) -> &UpgraderConfig {
        &self.config
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn ledger(&self) -> &BackupLedger<S> {
        &self.ledger
    }

    /// Upgrade the configured root.
    pub fn run(&mut self) -> Result<RunReport, UpgradeError> {
        let root = self.config.root.clone();
        self.run_at(&root, self.config.recursive)
    }

    /// Upgrade every candidate script under `root`.
    ///
    /// The processed-file list is updated once, after the whole batch.
    pub fn run_at(&mut self, root: &Path, recursive: bool) -> Result<RunReport, UpgradeError> {
        self.rules.validate()?;

        let mut report = RunReport::default();
        info!("Upgrading scripts under {}", root.display());

        for item in self.scanner.scan(root, recursive) {
            match item {
                Ok(path) => {
                    let result = self.process_file(&path);
                    if result.error.is_some() {
                        report.errors_occurred = true;
                    }
                    if result.modified {
                        report.modified_files.push(path);
                    }
                    report.files.push(result);
                }
                Err(e) => {
                    error!("Error processing directory: {}", e);
                    report.errors_occurred = true;
                    report.scan_errors.push(e.to_string());
                }
            }
        }

        if let Err(e) = self.ledger.record_run(&report.modified_files) {
            error!("Failed to persist processed files: {}", e);
            report.errors_occurred = true;
            report.scan_errors.push(e.to_string());
        }

        info!(
            "Processed {} files, {} modified ({})",
            report.files.len(),
            report.modified_files.len(),
            report.summary()
        );
        Ok(report)
    }

    /// Rewrite a single file in place, backing it up first when configured.
    ///
    /// Never panics and never returns an error: failures are recorded on the
    /// result, and the file is left as it was.
    pub fn process_file(&self, path: &Path) -> FileTransformResult {
        if self.scanner.is_reserved(path) {
            return FileTransformResult {
                path: path.to_path_buf(),
                modified: false,
                backup_created: false,
                substitution_log: Vec::new(),
                error: None,
                error_message: None,
                original_hash: None,
            };
        }

        info!("Processing file: {}", path.display());
        let original = match read_text(path) {
            Ok(text) => text,
            Err(e) => return self.failed(path, e),
        };
        let original_hash = format!("sha256:{}", hex::encode(Sha256::digest(original.as_bytes())));

        let index = match self.indexer.index(&original, &self.rules.known_types) {
            Ok(index) => index,
            Err(e) => return self.failed(path, e),
        };
        let outcome = match self.rewriter.rewrite(&original, &self.rules, &index) {
            Ok(outcome) => outcome,
            Err(e) => return self.failed(path, e),
        };

        let mut result = FileTransformResult {
            path: path.to_path_buf(),
            modified: false,
            backup_created: false,
            substitution_log: outcome.log,
            error: None,
            error_message: None,
            original_hash: Some(original_hash),
        };
        if !outcome.modified {
            return result;
        }

        if self.config.backup_files {
            match self.ledger.create_backup(path, &original) {
                Ok(created) => result.backup_created = created,
                Err(e) => {
                    // The rewrite still goes ahead; the error is surfaced on the result.
                    error!("Error creating backup: {}", e);
                    result.error = Some(e.kind());
                    result.error_message = Some(e.to_string());
                }
            }
        }

        match write_text_atomic(path, &outcome.text) {
            Ok(()) => {
                result.modified = true;
                info!("Successfully processed and saved: {}", path.display());
            }
            Err(e) => {
                error!("Error processing file {}: {}", path.display(), e);
                // The file is not recorded as processed, so its fresh backup would be orphaned.
                if result.backup_created {
                    match self.ledger.discard_backup(path) {
                        Ok(()) => result.backup_created = false,
                        Err(discard) => warn!("Could not remove backup: {}", discard),
                    }
                }
                result.error = Some(e.kind());
                result.error_message = Some(e.to_string());
            }
        }
        result
    }

    /// Read-only report of which known types each script mentions.
    pub fn analyze(&self, root: &Path, recursive: bool) -> AnalysisReport {
        analysis::analyze(&self.scanner, root, recursive, &self.rules.known_types)
    }

    pub fn processed_files(&self) -> Result<Vec<PathBuf>, UpgradeError> {
        self.ledger.processed_files()
    }

    pub fn has_backups(&self) -> Result<bool, UpgradeError> {
        self.ledger.has_backups()
    }

    /// Restore every tracked file from its backup. The processed list is
    /// cleared afterwards whether or not every file could be restored.
    pub fn restore_backups(&mut self) -> Result<BackupReport, UpgradeError> {
        let batch = self.ledger.restore_processed()?;
        if !batch.is_complete() {
            warn!("Some files could not be restored");
        }
        Ok(BackupReport {
            operation: BackupOperation::Restore,
            batch,
        })
    }

    pub fn delete_processed_backups(&mut self) -> Result<BackupReport, UpgradeError> {
        let batch = self.ledger.delete_processed_backups()?;
        Ok(BackupReport {
            operation: BackupOperation::DeleteProcessed,
            batch,
        })
    }

    /// Delete every backup file under `root`, tracked or not.
    pub fn delete_all_backups(&self, root: &Path) -> BackupReport {
        BackupReport {
            operation: BackupOperation::DeleteAll,
            batch: self.ledger.delete_all_backups(root),
        }
    }

    fn failed(&self, path: &Path, err: UpgradeError) -> FileTransformResult {
        error!("Error processing file {}: {}", path.display(), err);
        FileTransformResult::failed(path.to_path_buf(), &err)
    }
}
