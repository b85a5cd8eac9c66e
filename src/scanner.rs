//! # Script Scanner
//!
//! Walks a directory tree and yields the scripts the upgrader should look at.

use crate::config::UpgraderConfig;
use crate::errors::UpgradeError;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

#[derive(Debug, Clone)]
pub struct Scanner {
    extension: String,
    reserved_prefix: String,
    excludes: GlobSet,
}

impl Scanner {
    pub fn new(extension: impl Into<String>, reserved_prefix: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
            reserved_prefix: reserved_prefix.into(),
            excludes: GlobSet::empty(),
        }
    }

    /// Build a scanner from the configured extension, reserved prefix and exclude globs.
    pub fn from_config(config: &UpgraderConfig) -> Result<Self, UpgradeError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &config.exclude_globs {
            builder.add(Glob::new(pattern)?);
        }
        Ok(Self {
            extension: config.extension.clone(),
            reserved_prefix: config.reserved_prefix.clone(),
            excludes: builder.build()?,
        })
    }

    /// Lazily walk `root`, yielding candidate script paths in file-name order.
    ///
    /// Directory read failures are yielded as errors; the walk carries on with
    /// the remaining siblings. Calling `scan` again starts a fresh walk.
    pub fn scan<'a>(
        &'a self,
        root: &'a Path,
        recursive: bool,
    ) -> impl Iterator<Item = Result<PathBuf, UpgradeError>> + 'a {
        let max_depth = if recursive { usize::MAX } else { 1 };

        WalkDir::new(root)
            .min_depth(1)
            .max_depth(max_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| !self.is_excluded(root, entry))
            .filter_map(move |entry| match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() && self.is_candidate(entry.path()) {
                        Some(Ok(entry.into_path()))
                    } else {
                        None
                    }
                }
                Err(err) => Some(Err(UpgradeError::from(err))),
            })
    }

    /// Whether a file name belongs to the tool itself.
    pub fn is_reserved(&self, path: &Path) -> bool {
        path.file_name()
            .map(|name| name.to_string_lossy().starts_with(&self.reserved_prefix))
            .unwrap_or(false)
    }

    /// Extension matches and the name is not reserved.
    pub fn is_candidate(&self, path: &Path) -> bool {
        let extension_matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.extension));

        extension_matches && !self.is_reserved(path)
    }

    fn is_excluded(&self, root: &Path, entry: &DirEntry) -> bool {
        if self.excludes.is_empty() {
            return false;
        }
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        self.excludes.is_match(relative)
    }
}
