mod common;

use cinemachine_upgrader::{
    ErrorKind, OperationSummary, RuleSet, TypeRenameRule, UpgradeError, Upgrader,
    UpgraderConfig, store::MemoryStore, store::ProcessedFileStore,
};
use common::*;
use std::fs;
use std::path::PathBuf;

#[test]
fn test_run_upgrades_candidate_scripts() {
    let project = TestProject::with_scripts();
    let mut upgrader = project.upgrader();

    let report = upgrader.run().unwrap();

    assert!(!report.errors_occurred);
    assert_eq!(report.summary(), OperationSummary::Succeeded);
    assert_eq!(project.read("Rig.cs"), RIG_UPGRADED);
    assert_eq!(project.read("Mover.cs"), CART_UPGRADED);
    assert_eq!(project.read("Nested/Deep.cs"), RIG_UPGRADED);
    assert_eq!(project.read("Plain.cs"), PLAIN_SCRIPT);

    let mut modified = report.modified_files.clone();
    modified.sort();
    let mut expected = vec![
        project.path("Mover.cs"),
        project.path("Nested/Deep.cs"),
        project.path("Rig.cs"),
    ];
    expected.sort();
    assert_eq!(modified, expected);
}

#[test]
fn test_reserved_and_foreign_files_are_untouched() {
    let project = TestProject::with_scripts();
    let mut upgrader = project.upgrader();

    let report = upgrader.run().unwrap();

    assert_eq!(project.read("CinemachineUpgradeData.cs"), RIG_SCRIPT);
    assert_eq!(project.read("Notes.txt"), RIG_SCRIPT);
    assert!(!backup_of(&project.path("CinemachineUpgradeData.cs")).exists());
    assert!(
        report
            .files
            .iter()
            .all(|f| f.path != project.path("CinemachineUpgradeData.cs"))
    );
}

#[test]
fn test_process_file_skips_reserved_file() {
    let project = TestProject::with_scripts();
    let upgrader = project.upgrader();

    let result = upgrader.process_file(&project.path("CinemachineUpgradeData.cs"));
    assert!(!result.modified);
    assert!(result.substitution_log.is_empty());
    assert_eq!(project.read("CinemachineUpgradeData.cs"), RIG_SCRIPT);
}

#[test]
fn test_substitution_log_and_hash() {
    let project = TestProject::new();
    project.write("Mover.cs", CART_SCRIPT);
    let mut upgrader = project.upgrader();

    let report = upgrader.run().unwrap();
    let result = &report.files[0];

    assert!(result.modified);
    assert!(result.backup_created);
    assert_eq!(
        result.substitution_log,
        vec![
            "Replaced component: CinemachineDollyCart -> CinemachineSplineCart".to_string(),
            "Replaced field: cart.m_Position -> cart.SplinePosition".to_string(),
        ]
    );
    let hash = result.original_hash.as_deref().unwrap();
    assert!(hash.starts_with("sha256:"));
    assert_eq!(hash.len(), "sha256:".len() + 64);
    assert_eq!(report.total_substitutions(), 2);
}

#[test]
fn test_second_run_is_a_no_op() {
    let project = TestProject::with_scripts();
    let mut upgrader = project.upgrader();

    upgrader.run().unwrap();
    let second = upgrader.run().unwrap();

    assert!(second.modified_files.is_empty());
    assert!(!second.errors_occurred);
    assert!(second.files.iter().all(|f| f.substitution_log.is_empty()));
    assert_eq!(project.read("Rig.cs"), RIG_UPGRADED);
}

#[test]
fn test_backup_holds_true_original_across_runs() {
    let project = TestProject::new();
    project.write("Rig.cs", RIG_SCRIPT);
    let mut upgrader = project.upgrader();
    upgrader.run().unwrap();

    // The user adds more legacy code after the first upgrade.
    let edited = format!("{RIG_UPGRADED}// CinemachineFreeLook follow;\n");
    project.write("Rig.cs", &edited);
    let report = upgrader.run().unwrap();

    assert_eq!(report.modified_files, vec![project.path("Rig.cs")]);
    assert!(!report.files[0].backup_created);
    assert_eq!(
        fs::read_to_string(backup_of(&project.path("Rig.cs"))).unwrap(),
        RIG_SCRIPT
    );
}

#[test]
fn test_failing_file_does_not_stop_the_batch() {
    let project = TestProject::new();
    project.write("Rig.cs", RIG_SCRIPT);
    fs::write(project.path("Broken.cs"), [0xff, 0xfe, 0x00, 0x43]).unwrap();
    let mut upgrader = project.upgrader();

    let report = upgrader.run().unwrap();

    assert!(report.errors_occurred);
    assert_eq!(report.summary(), OperationSummary::SucceededWithErrors);
    assert_eq!(report.modified_files, vec![project.path("Rig.cs")]);

    let broken = report
        .files
        .iter()
        .find(|f| f.path == project.path("Broken.cs"))
        .unwrap();
    assert_eq!(broken.error, Some(ErrorKind::Io));
    assert!(!broken.modified);
    assert_eq!(fs::read(project.path("Broken.cs")).unwrap(), [0xff, 0xfe, 0x00, 0x43]);
}

#[test]
fn test_invalid_rule_set_fails_before_touching_files() {
    let project = TestProject::with_scripts();
    let mut rules = RuleSet::with_defaults();
    rules.legacy_prefix = String::new();

    let result = Upgrader::new(project.config(), rules, MemoryStore::new());

    assert!(matches!(result, Err(UpgradeError::Config(_))));
    assert_eq!(project.read("Rig.cs"), RIG_SCRIPT);
}

#[test]
fn test_non_recursive_run_stays_at_root() {
    let project = TestProject::with_scripts();
    let config = UpgraderConfig {
        recursive: false,
        ..project.config()
    };
    let mut upgrader = project.upgrader_with(config, RuleSet::with_defaults());

    upgrader.run().unwrap();

    assert_eq!(project.read("Rig.cs"), RIG_UPGRADED);
    assert_eq!(project.read("Nested/Deep.cs"), RIG_SCRIPT);
}

#[test]
fn test_exclude_globs_skip_paths() {
    let project = TestProject::with_scripts();
    let config = UpgraderConfig {
        exclude_globs: vec!["Nested/**".to_string()],
        ..project.config()
    };
    let mut upgrader = project.upgrader_with(config, RuleSet::with_defaults());

    upgrader.run().unwrap();

    assert_eq!(project.read("Rig.cs"), RIG_UPGRADED);
    assert_eq!(project.read("Nested/Deep.cs"), RIG_SCRIPT);
}

#[test]
fn test_without_backups() {
    let project = TestProject::new();
    project.write("Rig.cs", RIG_SCRIPT);
    let config = UpgraderConfig {
        backup_files: false,
        ..project.config()
    };
    let mut upgrader = project.upgrader_with(config, RuleSet::with_defaults());

    let report = upgrader.run().unwrap();

    assert_eq!(report.modified_files.len(), 1);
    assert!(!report.files[0].backup_created);
    assert!(!backup_of(&project.path("Rig.cs")).exists());
    assert!(!upgrader.has_backups().unwrap());
}

#[test]
fn test_custom_rule_set() {
    let project = TestProject::new();
    project.write(
        "Camera.cs",
        "LegacyCam cam;\nvoid Start() { cam.m_Lens = 2; }\n",
    );
    let rules = RuleSet {
        known_types: vec!["LegacyCam".to_string()],
        type_renames: vec![TypeRenameRule::new("LegacyCam", "ModernCam").with_field("Lens", "Optics")],
        namespace_renames: Vec::new(),
        method_renames: Vec::new(),
        legacy_prefix: "m_".to_string(),
    };
    let mut upgrader = project.upgrader_with(project.config(), rules);

    upgrader.run().unwrap();

    assert_eq!(
        project.read("Camera.cs"),
        "ModernCam cam;\nvoid Start() { cam.Optics = 2; }\n"
    );
}

#[test]
fn test_processed_list_is_persisted_and_merged() {
    let project = TestProject::new();
    project.write("Rig.cs", RIG_SCRIPT);
    let mut upgrader = project.upgrader();
    upgrader.run().unwrap();

    project.write("Mover.cs", CART_SCRIPT);
    upgrader.run().unwrap();

    let store = cinemachine_upgrader::JsonSettingsStore::new(project.state_file());
    assert_eq!(
        store.load().unwrap(),
        vec![project.path("Rig.cs"), project.path("Mover.cs")]
    );

    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(project.state_file()).unwrap()).unwrap();
    assert!(raw["CinemachineUpgrader_ProcessedFiles"]["items"].is_array());
}

#[test]
fn test_analyze_reports_without_writing() {
    let project = TestProject::with_scripts();
    let upgrader = project.upgrader();

    let report = upgrader.analyze(project.root.path(), true);

    assert!(!report.errors_occurred);
    let cameras = &report.usage["CinemachineVirtualCamera"];
    assert_eq!(
        cameras.iter().cloned().collect::<Vec<PathBuf>>(),
        vec![project.path("Nested/Deep.cs"), project.path("Rig.cs")]
    );
    assert!(report.usage.contains_key("CinemachineDollyCart"));
    assert_eq!(project.read("Rig.cs"), RIG_SCRIPT);
    assert!(upgrader.processed_files().unwrap().is_empty());
}

#[cfg(unix)]
#[test]
fn test_unreadable_directory_is_reported_and_siblings_processed() {
    use std::os::unix::fs::PermissionsExt;

    let project = TestProject::new();
    project.write("Locked/Inner.cs", RIG_SCRIPT);
    project.write("Open/Rig.cs", RIG_SCRIPT);
    let locked = project.path("Locked");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
    if fs::read_dir(&locked).is_ok() {
        // Permission bits do not apply to this user.
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }
    let mut upgrader = project.upgrader();

    let report = upgrader.run().unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    assert!(report.errors_occurred);
    assert_eq!(report.summary(), OperationSummary::SucceededWithErrors);
    assert_eq!(report.scan_errors.len(), 1);
    assert_eq!(report.modified_files, vec![project.path("Open/Rig.cs")]);
    assert_eq!(project.read("Open/Rig.cs"), RIG_UPGRADED);
    assert_eq!(project.read("Locked/Inner.cs"), RIG_SCRIPT);
}

#[test]
fn test_failed_write_discards_fresh_backup() {
    let project = TestProject::new();
    project.write("Rig.cs", RIG_SCRIPT);
    // The temporary sibling cannot be written while a directory holds its name.
    fs::create_dir(project.path("Rig.cs.tmp")).unwrap();
    let mut upgrader = project.upgrader();

    let report = upgrader.run().unwrap();

    assert!(report.errors_occurred);
    assert!(report.modified_files.is_empty());
    let rig = report
        .files
        .iter()
        .find(|f| f.path == project.path("Rig.cs"))
        .unwrap();
    assert_eq!(rig.error, Some(ErrorKind::Io));
    assert!(!rig.modified);
    assert!(!rig.backup_created);
    assert!(!backup_of(&project.path("Rig.cs")).exists());
    assert_eq!(fs::read(project.path("Rig.cs")).unwrap(), RIG_SCRIPT.as_bytes());
    assert!(upgrader.processed_files().unwrap().is_empty());
}
