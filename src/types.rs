use crate::backup::BatchReport;
use crate::errors::{ErrorKind, UpgradeError};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

/// What happened to one scanned file. Produced once, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileTransformResult {
    pub path: PathBuf,
    pub modified: bool,
    pub backup_created: bool,
    pub substitution_log: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// `sha256:<hex>` of the content before rewriting
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_hash: Option<String>,
}

impl FileTransformResult {
    pub fn failed(path: PathBuf, err: &UpgradeError) -> Self {
        Self {
            path,
            modified: false,
            backup_created: false,
            substitution_log: Vec::new(),
            error: Some(err.kind()),
            error_message: Some(err.to_string()),
            original_hash: None,
        }
    }
}

/// Aggregate result of an upgrade run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// Files rewritten on disk, in scan order
    pub modified_files: Vec<PathBuf>,
    pub errors_occurred: bool,
    pub files: Vec<FileTransformResult>,
    /// Directory-level failures that did not map to a single file
    pub scan_errors: Vec<String>,
}

impl RunReport {
    pub fn summary(&self) -> OperationSummary {
        OperationSummary::from_errors(self.errors_occurred)
    }

    pub fn total_substitutions(&self) -> usize {
        self.files.iter().map(|f| f.substitution_log.len()).sum()
    }
}

/// Result of the read-only analysis pass: known type -> files mentioning it.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisReport {
    pub usage: BTreeMap<String, BTreeSet<PathBuf>>,
    pub errors_occurred: bool,
    pub errors: Vec<String>,
}

impl AnalysisReport {
    /// Number of (type, file) pairs found.
    pub fn total_files(&self) -> usize {
        self.usage.values().map(BTreeSet::len).sum()
    }

    pub fn summary(&self) -> OperationSummary {
        OperationSummary::from_errors(self.errors_occurred)
    }
}

/// Outcome of restoring backups or deleting them.
#[derive(Debug, Clone, Serialize)]
pub struct BackupReport {
    pub operation: BackupOperation,
    #[serde(flatten)]
    pub batch: BatchReport,
}

impl BackupReport {
    pub fn summary(&self) -> OperationSummary {
        OperationSummary::from_errors(!self.batch.is_complete())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackupOperation {
    Restore,
    DeleteProcessed,
    DeleteAll,
}

/// Three-way outcome shown to the user after each operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationSummary {
    Succeeded,
    SucceededWithErrors,
    Failed,
}

impl OperationSummary {
    pub fn from_errors(errors_occurred: bool) -> Self {
        if errors_occurred {
            OperationSummary::SucceededWithErrors
        } else {
            OperationSummary::Succeeded
        }
    }
}

impl fmt::Display for OperationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationSummary::Succeeded => write!(f, "succeeded"),
            OperationSummary::SucceededWithErrors => write!(f, "succeeded with errors - see log"),
            OperationSummary::Failed => write!(f, "failed"),
        }
    }
}
