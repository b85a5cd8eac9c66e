use crate::errors::UpgradeError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Rename of one field on a component, e.g. `m_Position` -> `SplinePosition`.
///
/// `old_field_name` is stored without the legacy prefix; matching tries both
/// the bare name and the prefixed form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRenameRule {
    pub old_field_name: String,
    pub new_field_name: String,
}

impl FieldRenameRule {
    pub fn new(old_field_name: impl Into<String>, new_field_name: impl Into<String>) -> Self {
        Self {
            old_field_name: old_field_name.into(),
            new_field_name: new_field_name.into(),
        }
    }

    /// The legacy serialized form of the old field, e.g. `m_Position`.
    ///
    /// Rules may spell the old name with or without the prefix.
    pub fn legacy_name(&self, legacy_prefix: &str) -> String {
        if self.old_field_name.starts_with(legacy_prefix) {
            self.old_field_name.clone()
        } else {
            format!("{legacy_prefix}{}", self.old_field_name)
        }
    }

    /// Whether a member segment refers to this field, either as written in the
    /// rule or in its legacy-prefixed form.
    pub fn matches_segment(&self, segment: &str, legacy_prefix: &str) -> bool {
        segment == self.old_field_name || segment == self.legacy_name(legacy_prefix)
    }
}

/// Rename of a component type, with the field renames that go with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeRenameRule {
    pub old_name: String,
    pub new_name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub field_renames: Vec<FieldRenameRule>,
}

impl TypeRenameRule {
    pub fn new(old_name: impl Into<String>, new_name: impl Into<String>) -> Self {
        Self {
            old_name: old_name.into(),
            new_name: new_name.into(),
            field_renames: Vec::new(),
        }
    }

    pub fn with_field(mut self, old_field: impl Into<String>, new_field: impl Into<String>) -> Self {
        self.field_renames.push(FieldRenameRule::new(old_field, new_field));
        self
    }

    /// First field rename whose old name matches `segment`.
    pub fn field_for_segment(&self, segment: &str, legacy_prefix: &str) -> Option<&FieldRenameRule> {
        self.field_renames
            .iter()
            .find(|field| field.matches_segment(segment, legacy_prefix))
    }
}

/// Whole-token rename used for namespaces and methods.
///
/// Deserializes from either `{ old: .., new: .. }` or the compact `"old|new"` form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TokenRuleRepr")]
pub struct TokenRenameRule {
    pub old: String,
    pub new: String,
}

pub type NamespaceRenameRule = TokenRenameRule;
pub type MethodRenameRule = TokenRenameRule;

impl TokenRenameRule {
    pub fn new(old: impl Into<String>, new: impl Into<String>) -> Self {
        Self {
            old: old.into(),
            new: new.into(),
        }
    }

    /// Parse the compact `"old|new"` form. Anything other than exactly two parts is rejected.
    pub fn parse_compact(text: &str) -> Result<Self, String> {
        let parts: Vec<&str> = text.split('|').collect();
        match parts.as_slice() {
            [old, new] => Ok(Self::new(*old, *new)),
            _ => Err(format!("expected 'old|new', got '{text}'")),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TokenRuleRepr {
    Compact(String),
    Full { old: String, new: String },
}

impl TryFrom<TokenRuleRepr> for TokenRenameRule {
    type Error = String;

    fn try_from(repr: TokenRuleRepr) -> Result<Self, Self::Error> {
        match repr {
            TokenRuleRepr::Compact(text) => Self::parse_compact(&text),
            TokenRuleRepr::Full { old, new } => Ok(Self::new(old, new)),
        }
    }
}

fn default_legacy_prefix() -> String {
    "m_".to_string()
}

/// The full set of rename rules for one upgrade.
///
/// Read-only during a run; the engine never mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSet {
    /// Types whose variables are tracked and whose call sites are normalized
    #[serde(default)]
    pub known_types: Vec<String>,
    #[serde(default)]
    pub type_renames: Vec<TypeRenameRule>,
    #[serde(default)]
    pub namespace_renames: Vec<NamespaceRenameRule>,
    #[serde(default)]
    pub method_renames: Vec<MethodRenameRule>,
    /// Marker prefix of legacy serialized fields
    #[serde(default = "default_legacy_prefix")]
    pub legacy_prefix: String,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            known_types: Vec::new(),
            type_renames: Vec::new(),
            namespace_renames: Vec::new(),
            method_renames: Vec::new(),
            legacy_prefix: default_legacy_prefix(),
        }
    }
}

impl RuleSet {
    /// A rule set holding the built-in Cinemachine 2.x -> 3.x vocabulary.
    pub fn with_defaults() -> Self {
        let mut rules = Self::default();
        rules.populate_defaults();
        rules
    }

    /// Fill each collection with its defaults, but only when it is empty.
    ///
    /// Calling this twice never duplicates entries.
    pub fn populate_defaults(&mut self) {
        if self.known_types.is_empty() {
            self.known_types = super::defaults::known_types();
        }
        if self.type_renames.is_empty() {
            self.type_renames = super::defaults::type_renames();
        }
        if self.namespace_renames.is_empty() {
            self.namespace_renames = super::defaults::namespace_renames();
        }
        if self.method_renames.is_empty() {
            self.method_renames = super::defaults::method_renames();
        }
    }

    /// Reject rule sets the rewriter cannot apply safely.
    pub fn validate(&self) -> Result<(), UpgradeError> {
        if self.legacy_prefix.is_empty() {
            return Err(UpgradeError::Config(
                "legacy field prefix must not be empty".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for (index, rule) in self.type_renames.iter().enumerate() {
            if rule.old_name.trim().is_empty() {
                return Err(UpgradeError::Config(format!(
                    "type rename #{index} has an empty old name"
                )));
            }
            if !seen.insert(rule.old_name.as_str()) {
                return Err(UpgradeError::Config(format!(
                    "type rename for '{}' is defined more than once",
                    rule.old_name
                )));
            }
            if let Some(field) = rule
                .field_renames
                .iter()
                .find(|field| field.old_field_name.is_empty())
            {
                return Err(UpgradeError::Config(format!(
                    "field rename '{}' on '{}' has an empty old name",
                    field.new_field_name, rule.old_name
                )));
            }
        }

        for (kind, rules) in [
            ("namespace", &self.namespace_renames),
            ("method", &self.method_renames),
        ] {
            if let Some(rule) = rules.iter().find(|rule| rule.old.is_empty()) {
                return Err(UpgradeError::Config(format!(
                    "{kind} rename to '{}' has an empty old token",
                    rule.new
                )));
            }
        }

        Ok(())
    }

    /// Old and new names of every type rule, in rule order.
    pub fn renamed_types(&self) -> impl Iterator<Item = (&str, &str)> {
        self.type_renames
            .iter()
            .map(|rule| (rule.old_name.as_str(), rule.new_name.as_str()))
    }
}
