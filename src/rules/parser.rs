use super::types::RuleSet;
use crate::errors::UpgradeError;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Parse a rule set from YAML, falling back to JSON.
pub fn parse_rule_set(content: &str) -> Result<RuleSet, UpgradeError> {
    let yaml_error = match serde_yaml::from_str::<RuleSet>(content) {
        Ok(rules) => return Ok(rules),
        Err(e) => e,
    };

    if let Ok(rules) = serde_json::from_str::<RuleSet>(content) {
        return Ok(rules);
    }

    Err(UpgradeError::Config(format!(
        "Rule set must be valid YAML or JSON: {yaml_error}"
    )))
}

/// Load a rule set from disk, fill in any empty collections with defaults
/// and validate it.
pub fn load_rule_set(path: &Path) -> Result<RuleSet, UpgradeError> {
    let content = fs::read_to_string(path).map_err(|e| UpgradeError::io(path, e))?;
    let mut rules = parse_rule_set(&content)?;
    rules.populate_defaults();
    rules.validate()?;

    debug!(
        "Loaded rule set from {:?}: {} known types, {} type renames",
        path,
        rules.known_types.len(),
        rules.type_renames.len()
    );
    Ok(rules)
}

/// Write a rule set as YAML, creating parent directories as needed.
pub fn save_rule_set(path: &Path, rules: &RuleSet) -> Result<(), UpgradeError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| UpgradeError::io(parent, e))?;
    }
    let yaml = serde_yaml::to_string(rules)?;
    fs::write(path, yaml).map_err(|e| UpgradeError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::types::TokenRenameRule;

    #[test]
    fn test_parse_yaml_with_compact_tokens() {
        let yaml = r#"
knownTypes:
  - CinemachineDollyCart
typeRenames:
  - oldName: CinemachineDollyCart
    newName: CinemachineSplineCart
    fieldRenames:
      - oldFieldName: Position
        newFieldName: SplinePosition
namespaceRenames:
  - "using Cinemachine;|using Unity.Cinemachine;"
methodRenames:
  - old: GetCinemachineComponent
    new: GetComponent
"#;
        let rules = parse_rule_set(yaml).unwrap();
        assert_eq!(rules.known_types, vec!["CinemachineDollyCart"]);
        assert_eq!(rules.type_renames[0].field_renames[0].new_field_name, "SplinePosition");
        assert_eq!(
            rules.namespace_renames[0],
            TokenRenameRule::new("using Cinemachine;", "using Unity.Cinemachine;")
        );
        assert_eq!(rules.method_renames[0].new, "GetComponent");
        assert_eq!(rules.legacy_prefix, "m_");
    }

    #[test]
    fn test_parse_json() {
        let json = r#"{"typeRenames":[{"oldName":"A","newName":"B"}],"legacyPrefix":"_"}"#;
        let rules = parse_rule_set(json).unwrap();
        assert_eq!(rules.type_renames[0].old_name, "A");
        assert!(rules.type_renames[0].field_renames.is_empty());
        assert_eq!(rules.legacy_prefix, "_");
    }

    #[test]
    fn test_parse_rejects_bad_compact_token() {
        let yaml = "methodRenames:\n  - \"only-one-part\"\n";
        assert!(matches!(parse_rule_set(yaml), Err(UpgradeError::Config(_))));
    }

    #[test]
    fn test_save_then_load_preserves_defaults() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("rules").join("upgrade.yaml");
        let rules = RuleSet::with_defaults();
        save_rule_set(&path, &rules).unwrap();
        assert_eq!(load_rule_set(&path).unwrap(), rules);
    }
}
