use std::path::PathBuf;

/// Settings key under which the processed-file list is persisted.
pub const PROCESSED_FILES_KEY: &str = "CinemachineUpgrader_ProcessedFiles";

/// Package identifier handed to the package manager collaborator.
pub const CINEMACHINE_PACKAGE_ID: &str = "com.unity.cinemachine";

#[derive(Debug, Clone)]
pub struct UpgraderConfig {
    /// Directory whose scripts are analyzed and upgraded
    pub root: PathBuf,
    /// Descend into subdirectories of `root`
    pub recursive: bool,
    /// Write a `.backup` sibling before overwriting a file
    pub backup_files: bool,
    /// Extension (without the dot) of files the scanner yields
    pub extension: String,
    /// File names starting with this prefix belong to the tool and are never touched
    pub reserved_prefix: String,
    /// Suffix appended to a file path to form its backup path
    pub backup_suffix: String,
    /// Optional path globs the scanner skips
    pub exclude_globs: Vec<String>,
    /// JSON settings file holding the processed-file list
    pub state_file: PathBuf,
    /// Maximum number of compiled patterns to cache (default: 256)
    pub pattern_cache_size: usize,
}

impl UpgraderConfig {
    /// Default location of the settings file: `~/.cinemachine-upgrader/settings.json`
    pub fn default_state_file() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".cinemachine-upgrader")
            .join("settings.json")
    }
}

impl Default for UpgraderConfig {
    fn default() -> Self {
        Self {
            root: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            recursive: true,
            backup_files: true,
            extension: "cs".to_string(),
            reserved_prefix: "CinemachineUpgrade".to_string(),
            backup_suffix: ".backup".to_string(),
            exclude_globs: Vec::new(),
            state_file: Self::default_state_file(),
            pattern_cache_size: 256,
        }
    }
}
