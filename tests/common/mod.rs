// Common test utilities
#![allow(dead_code)]

use cinemachine_upgrader::{JsonSettingsStore, RuleSet, Upgrader, UpgraderConfig};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const RIG_SCRIPT: &str = "using Cinemachine;\r\n\r\npublic class Rig : MonoBehaviour\r\n{\r\n    public CinemachineVirtualCamera vcam;\r\n}\r\n";

pub const RIG_UPGRADED: &str = "using Unity.Cinemachine;\r\n\r\npublic class Rig : MonoBehaviour\r\n{\r\n    public CinemachineCamera vcam;\r\n}\r\n";

pub const CART_SCRIPT: &str = r#"public class Mover : MonoBehaviour
{
    CinemachineDollyCart cart;

    void Update()
    {
        cart.m_Position += Time.deltaTime;
    }
}
"#;

pub const CART_UPGRADED: &str = r#"public class Mover : MonoBehaviour
{
    CinemachineSplineCart cart;

    void Update()
    {
        cart.SplinePosition += Time.deltaTime;
    }
}
"#;

pub const PLAIN_SCRIPT: &str = "public class Plain : MonoBehaviour { }\n";

/// A project directory plus a separate directory for the settings file.
pub struct TestProject {
    pub root: TempDir,
    pub state: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        Self {
            root: TempDir::new().unwrap(),
            state: TempDir::new().unwrap(),
        }
    }

    /// Project with a camera rig, a dolly cart mover, an unrelated script,
    /// the tool's own data script and a nested script.
    pub fn with_scripts() -> Self {
        let project = Self::new();
        project.write("Rig.cs", RIG_SCRIPT);
        project.write("Mover.cs", CART_SCRIPT);
        project.write("Plain.cs", PLAIN_SCRIPT);
        project.write("CinemachineUpgradeData.cs", RIG_SCRIPT);
        project.write("Nested/Deep.cs", RIG_SCRIPT);
        project.write("Notes.txt", RIG_SCRIPT);
        project
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.path().join(relative)
    }

    pub fn write(&self, relative: &str, content: &str) {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path(relative)).unwrap()
    }

    pub fn state_file(&self) -> PathBuf {
        self.state.path().join("settings.json")
    }

    pub fn config(&self) -> UpgraderConfig {
        UpgraderConfig {
            root: self.root.path().to_path_buf(),
            state_file: self.state_file(),
            ..UpgraderConfig::default()
        }
    }

    pub fn upgrader(&self) -> Upgrader<JsonSettingsStore> {
        self.upgrader_with(self.config(), RuleSet::with_defaults())
    }

    pub fn upgrader_with(
        &self,
        config: UpgraderConfig,
        rules: RuleSet,
    ) -> Upgrader<JsonSettingsStore> {
        let store = JsonSettingsStore::new(self.state_file());
        Upgrader::new(config, rules, store).unwrap()
    }
}

pub fn backup_of(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".backup");
    PathBuf::from(name)
}
