//! # Error Types
//!
//! Error handling for the upgrader.
//! Every failure is classified into an [`ErrorKind`] so that per-file results
//! can record what went wrong without holding on to the error itself.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Error types that can occur while loading rules, scanning, rewriting or
/// managing backups.
#[derive(Debug)]
pub enum UpgradeError {
    /// Invalid or missing rule set data
    Config(String),
    /// I/O error tied to a specific path
    Io { path: PathBuf, source: std::io::Error },
    /// I/O error with no path attached
    IoBare(std::io::Error),
    /// Error walking directory trees during scanning
    WalkDir(walkdir::Error),
    /// Error parsing YAML rule sets
    SerdeYaml(serde_yaml::Error),
    /// Error parsing or writing JSON data
    SerdeJson(serde_json::Error),
    /// A match pattern built from rule data failed to compile
    Pattern(regex::Error),
    /// Exclude glob compilation error
    Glob(globset::Error),
    /// An external collaborator reported failure
    External(ExternalToolError),
}

/// Coarse classification of an [`UpgradeError`], stored on per-file results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Config,
    Io,
    Pattern,
    External,
}

impl UpgradeError {
    /// Attach a path to an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        UpgradeError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            UpgradeError::Config(_) | UpgradeError::SerdeYaml(_) | UpgradeError::Glob(_) => {
                ErrorKind::Config
            }
            UpgradeError::Io { .. }
            | UpgradeError::IoBare(_)
            | UpgradeError::WalkDir(_)
            | UpgradeError::SerdeJson(_) => ErrorKind::Io,
            UpgradeError::Pattern(_) => ErrorKind::Pattern,
            UpgradeError::External(_) => ErrorKind::External,
        }
    }
}

impl fmt::Display for UpgradeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpgradeError::Config(msg) => write!(f, "Configuration error: {msg}"),
            UpgradeError::Io { path, source } => {
                write!(f, "IO error on {}: {source}", path.display())
            }
            UpgradeError::IoBare(err) => write!(f, "IO error: {err}"),
            UpgradeError::WalkDir(err) => write!(f, "Directory traversal error: {err}"),
            UpgradeError::SerdeYaml(err) => write!(f, "YAML parsing error: {err}"),
            UpgradeError::SerdeJson(err) => write!(f, "JSON error: {err}"),
            UpgradeError::Pattern(err) => write!(f, "Pattern error: {err}"),
            UpgradeError::Glob(err) => write!(f, "Glob error: {err}"),
            UpgradeError::External(err) => write!(f, "External tool error: {err}"),
        }
    }
}

impl std::error::Error for UpgradeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UpgradeError::Io { source, .. } => Some(source),
            UpgradeError::IoBare(err) => Some(err),
            UpgradeError::WalkDir(err) => Some(err),
            UpgradeError::Pattern(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for UpgradeError {
    fn from(err: std::io::Error) -> Self {
        UpgradeError::IoBare(err)
    }
}

impl From<walkdir::Error> for UpgradeError {
    fn from(err: walkdir::Error) -> Self {
        UpgradeError::WalkDir(err)
    }
}

impl From<serde_yaml::Error> for UpgradeError {
    fn from(err: serde_yaml::Error) -> Self {
        UpgradeError::SerdeYaml(err)
    }
}

impl From<serde_json::Error> for UpgradeError {
    fn from(err: serde_json::Error) -> Self {
        UpgradeError::SerdeJson(err)
    }
}

impl From<regex::Error> for UpgradeError {
    fn from(err: regex::Error) -> Self {
        UpgradeError::Pattern(err)
    }
}

impl From<globset::Error> for UpgradeError {
    fn from(err: globset::Error) -> Self {
        UpgradeError::Glob(err)
    }
}

impl From<ExternalToolError> for UpgradeError {
    fn from(err: ExternalToolError) -> Self {
        UpgradeError::External(err)
    }
}

/// Failure reported by an external collaborator (package manager, structural
/// upgrade routine). Carries no data beyond a description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExternalToolError {
    /// The collaborator could not be located or started
    Unavailable(String),
    /// The collaborator ran and reported failure
    Failed(String),
}

impl fmt::Display for ExternalToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExternalToolError::Unavailable(msg) => write!(f, "unavailable: {msg}"),
            ExternalToolError::Failed(msg) => write!(f, "failed: {msg}"),
        }
    }
}

impl std::error::Error for ExternalToolError {}
