//! File I/O primitives that attach the offending path to every error.

use crate::errors::UpgradeError;
use std::fs;
use std::path::{Path, PathBuf};

pub fn read_text(path: &Path) -> Result<String, UpgradeError> {
    fs::read_to_string(path).map_err(|e| UpgradeError::io(path, e))
}

/// Write content atomically (write to a `.tmp` sibling, then rename).
///
/// Readers see either the old content or the new content, never a partial write.
pub fn write_text_atomic(path: &Path, content: &str) -> Result<(), UpgradeError> {
    let tmp_path = tmp_sibling(path)?;

    if let Err(e) = fs::write(&tmp_path, content) {
        let _ = fs::remove_file(&tmp_path);
        return Err(UpgradeError::io(&tmp_path, e));
    }

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        UpgradeError::io(path, e)
    })
}

fn tmp_sibling(path: &Path) -> Result<PathBuf, UpgradeError> {
    let file_name = path.file_name().ok_or_else(|| {
        UpgradeError::io(
            path,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
        )
    })?;
    Ok(path.with_file_name(format!("{}.tmp", file_name.to_string_lossy())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write_replaces_content_and_leaves_no_tmp() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("Rig.cs");
        fs::write(&path, "old").unwrap();

        write_text_atomic(&path, "new").unwrap();

        assert_eq!(read_text(&path).unwrap(), "new");
        assert!(!temp_dir.path().join("Rig.cs.tmp").exists());
    }

    #[test]
    fn test_read_missing_file_reports_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.cs");
        match read_text(&path) {
            Err(UpgradeError::Io { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected Io error, got {other:?}"),
        }
    }
}
