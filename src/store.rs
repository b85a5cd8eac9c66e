//! # Processed File Store
//!
//! Persistence for the list of files the last upgrade runs touched. The list
//! lives in a JSON settings file under [`PROCESSED_FILES_KEY`], wrapped as
//! `{ "items": [...] }`; other keys in the file are left alone.

use crate::config::PROCESSED_FILES_KEY;
use crate::errors::UpgradeError;
use crate::io::{read_text, write_text_atomic};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub trait ProcessedFileStore {
    fn load(&self) -> Result<Vec<PathBuf>, UpgradeError>;
    fn save(&mut self, files: &[PathBuf]) -> Result<(), UpgradeError>;
}

/// Serialized form of the processed-file list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedFileList {
    #[serde(default)]
    pub items: Vec<String>,
}

impl ProcessedFileList {
    pub fn from_paths(paths: &[PathBuf]) -> Self {
        Self {
            items: paths
                .iter()
                .map(|p| p.to_string_lossy().to_string())
                .collect(),
        }
    }

    pub fn into_paths(self) -> Vec<PathBuf> {
        self.items.into_iter().map(PathBuf::from).collect()
    }
}

/// Store backed by a JSON settings file on disk.
#[derive(Debug, Clone)]
pub struct JsonSettingsStore {
    path: PathBuf,
    key: String,
}

impl JsonSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            key: PROCESSED_FILES_KEY.to_string(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole settings object. A missing file is an empty object;
    /// a corrupt one is logged and treated as empty.
    fn read_settings(&self) -> Result<Map<String, Value>, UpgradeError> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let content = read_text(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) | Err(_) => {
                warn!("Ignoring unreadable settings file {:?}", self.path);
                Ok(Map::new())
            }
        }
    }
}

impl ProcessedFileStore for JsonSettingsStore {
    fn load(&self) -> Result<Vec<PathBuf>, UpgradeError> {
        let settings = self.read_settings()?;
        let Some(value) = settings.get(&self.key) else {
            return Ok(Vec::new());
        };
        match serde_json::from_value::<ProcessedFileList>(value.clone()) {
            Ok(list) => Ok(list.into_paths()),
            Err(e) => {
                warn!("Ignoring malformed processed-file list: {}", e);
                Ok(Vec::new())
            }
        }
    }

    fn save(&mut self, files: &[PathBuf]) -> Result<(), UpgradeError> {
        let mut settings = self.read_settings()?;
        settings.insert(
            self.key.clone(),
            serde_json::to_value(ProcessedFileList::from_paths(files))?,
        );

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| UpgradeError::io(parent, e))?;
        }
        let json = serde_json::to_string_pretty(&Value::Object(settings))?;
        write_text_atomic(&self.path, &json)
    }
}

/// In-process store, for embedding hosts that persist settings themselves.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    files: Vec<PathBuf>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProcessedFileStore for MemoryStore {
    fn load(&self) -> Result<Vec<PathBuf>, UpgradeError> {
        Ok(self.files.clone())
    }

    fn save(&mut self, files: &[PathBuf]) -> Result<(), UpgradeError> {
        self.files = files.to_vec();
        Ok(())
    }
}
