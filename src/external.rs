//! # External Collaborators
//!
//! The package manager and the structural (scene/prefab) upgrade routine live
//! outside this crate. Both are black boxes that either succeed or fail.

use crate::config::CINEMACHINE_PACKAGE_ID;
use crate::errors::{ExternalToolError, UpgradeError};
use std::process::Command;
use tracing::{debug, error, info};

pub trait PackageManager {
    /// Add or update the package with the given id.
    fn add(&self, package_id: &str) -> Result<(), ExternalToolError>;
}

pub trait StructuralUpgrader {
    fn apply_structural_upgrade(&self) -> Result<(), ExternalToolError>;
}

/// Runs an external program. Extra arguments (the package id) are appended
/// after the configured ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTool {
    program: String,
    args: Vec<String>,
}

impl CommandTool {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Split a command line on whitespace. Returns `None` for a blank line.
    pub fn parse(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self::new(program, parts.collect()))
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn invoke(&self, extra: &[&str]) -> Result<(), ExternalToolError> {
        debug!("Running {} {:?} {:?}", self.program, self.args, extra);
        let output = Command::new(&self.program)
            .args(&self.args)
            .args(extra)
            .output()
            .map_err(|e| ExternalToolError::Unavailable(format!("{}: {e}", self.program)))?;

        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        let detail = stderr.trim();
        Err(ExternalToolError::Failed(if detail.is_empty() {
            format!("{} exited with {}", self.program, output.status)
        } else {
            format!("{}: {detail}", self.program)
        }))
    }
}

impl PackageManager for CommandTool {
    fn add(&self, package_id: &str) -> Result<(), ExternalToolError> {
        self.invoke(&[package_id])
    }
}

impl StructuralUpgrader for CommandTool {
    fn apply_structural_upgrade(&self) -> Result<(), ExternalToolError> {
        self.invoke(&[])
    }
}

/// Ask the package manager to move the project to the 3.x package.
pub fn update_package(manager: &dyn PackageManager) -> Result<(), UpgradeError> {
    info!("Requesting package update for {}", CINEMACHINE_PACKAGE_ID);
    manager.add(CINEMACHINE_PACKAGE_ID).map_err(|e| {
        error!("Error updating Cinemachine package: {}", e);
        UpgradeError::from(e)
    })
}

/// Run the structural upgrade of scenes and prefabs.
pub fn upgrade_components(upgrader: &dyn StructuralUpgrader) -> Result<(), UpgradeError> {
    info!("Starting component upgrade");
    upgrader.apply_structural_upgrade().map_err(|e| {
        error!("Error during component upgrade: {}", e);
        UpgradeError::from(e)
    })?;
    info!("Component upgrade completed.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct RecordingManager {
        requested: RefCell<Vec<String>>,
    }

    impl PackageManager for RecordingManager {
        fn add(&self, package_id: &str) -> Result<(), ExternalToolError> {
            self.requested.borrow_mut().push(package_id.to_string());
            Ok(())
        }
    }

    struct BrokenUpgrader;

    impl StructuralUpgrader for BrokenUpgrader {
        fn apply_structural_upgrade(&self) -> Result<(), ExternalToolError> {
            Err(ExternalToolError::Unavailable(
                "CinemachineUpgradeManager not found".to_string(),
            ))
        }
    }

    #[test]
    fn test_update_package_uses_package_id() {
        let manager = RecordingManager {
            requested: RefCell::new(Vec::new()),
        };
        update_package(&manager).unwrap();
        assert_eq!(*manager.requested.borrow(), vec!["com.unity.cinemachine"]);
    }

    #[test]
    fn test_upgrade_components_failure_is_external() {
        let err = upgrade_components(&BrokenUpgrader).unwrap_err();
        assert_eq!(err.kind(), crate::errors::ErrorKind::External);
    }

    #[test]
    fn test_parse_command_line() {
        let tool = CommandTool::parse("unity -batchmode  -quit").unwrap();
        assert_eq!(tool.program(), "unity");
        assert_eq!(tool.args, vec!["-batchmode", "-quit"]);
        assert!(CommandTool::parse("   ").is_none());
    }

    #[test]
    fn test_missing_program_is_unavailable() {
        let tool = CommandTool::new("definitely-not-a-real-program-4821", Vec::new());
        assert!(matches!(
            tool.apply_structural_upgrade(),
            Err(ExternalToolError::Unavailable(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_status_maps_to_result() {
        assert!(CommandTool::new("true", Vec::new()).add("com.unity.cinemachine").is_ok());
        assert!(matches!(
            CommandTool::new("false", Vec::new()).apply_structural_upgrade(),
            Err(ExternalToolError::Failed(_))
        ));
    }
}
