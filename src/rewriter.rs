//! # Rewriter
//!
//! The text transformation pipeline. Passes run in a fixed order, each on the
//! output of the previous one:
//!
//! 1. namespace renames (plain substring replacement)
//! 2. per type rule: chained access rooted at the old type name, type
//!    rename, indexed field renames
//! 3. method renames
//! 4. `GetComponent<T>().m_Field` call-site normalization
//!
//! The rewriter holds no per-file state; everything it learns about a file
//! comes in through the [`VariableTypeIndex`].

use crate::errors::UpgradeError;
use crate::indexer::VariableTypeIndex;
use crate::pattern::PatternCache;
use crate::rules::{RuleSet, TypeRenameRule};
use regex::{Captures, NoExpand};
use std::borrow::Cow;
use std::collections::HashMap;
use tracing::debug;

/// Accessor whose typed call results get their legacy field access normalized.
const CALL_SITE_ACCESSOR: &str = "GetComponent";

/// Result of rewriting one file's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOutcome {
    pub text: String,
    /// True iff `text` differs from the input
    pub modified: bool,
    /// One entry per substitution, in application order
    pub log: Vec<String>,
}

#[derive(Clone, Default)]
pub struct Rewriter {
    patterns: PatternCache,
}

/// Working state of a single rewrite.
struct Pass {
    text: String,
    log: Vec<String>,
}

impl Pass {
    fn record(&mut self, entry: String) {
        debug!("{}", entry);
        self.log.push(entry);
    }

    /// Swap in replaced text. Returns whether anything changed.
    fn replace_with(&mut self, replaced: Option<String>) -> bool {
        match replaced {
            Some(text) if text != self.text => {
                self.text = text;
                true
            }
            _ => false,
        }
    }
}

/// `replace_all` only allocates when something matched.
fn owned(replaced: Cow<'_, str>) -> Option<String> {
    match replaced {
        Cow::Owned(text) => Some(text),
        Cow::Borrowed(_) => None,
    }
}

impl Rewriter {
    pub fn new(patterns: PatternCache) -> Self {
        Self { patterns }
    }

    /// Apply every pass to `text`.
    ///
    /// Fails only when a pattern built from rule data does not compile; the
    /// caller then leaves the file untouched.
    pub fn rewrite(
        &self,
        text: &str,
        rules: &RuleSet,
        index: &VariableTypeIndex,
    ) -> Result<RewriteOutcome, UpgradeError> {
        let mut pass = Pass {
            text: text.to_string(),
            log: Vec::new(),
        };

        self.rename_namespaces(&mut pass, rules);

        for rule in &rules.type_renames {
            // Chains are rooted at the old name, so they run before the type rename.
            self.rename_chains(&mut pass, rule, &rules.legacy_prefix)?;
            self.rename_type(&mut pass, rule)?;
            self.rename_fields(&mut pass, rule, index, &rules.legacy_prefix)?;
        }

        self.rename_methods(&mut pass, rules)?;
        self.normalize_call_site_fields(&mut pass, rules)?;

        let modified = pass.text != text;
        Ok(RewriteOutcome {
            text: pass.text,
            modified,
            log: pass.log,
        })
    }

    fn rename_namespaces(&self, pass: &mut Pass, rules: &RuleSet) {
        for rule in &rules.namespace_renames {
            if rule.old == rule.new || !pass.text.contains(rule.old.as_str()) {
                continue;
            }
            pass.text = pass.text.replace(rule.old.as_str(), &rule.new);
            pass.record(format!("Replaced namespace: {} -> {}", rule.old, rule.new));
        }
    }

    fn rename_type(&self, pass: &mut Pass, rule: &TypeRenameRule) -> Result<(), UpgradeError> {
        if rule.old_name == rule.new_name || !pass.text.contains(rule.old_name.as_str()) {
            return Ok(());
        }

        let regex = self.patterns.whole_word(&rule.old_name)?;
        let replaced = owned(regex.replace_all(&pass.text, NoExpand(&rule.new_name)));
        if pass.replace_with(replaced) {
            pass.record(format!(
                "Replaced component: {} -> {}",
                rule.old_name, rule.new_name
            ));
        }
        Ok(())
    }

    /// `ident.m_Old` -> `ident.New` for identifiers declared as the rule's old type.
    fn rename_fields(
        &self,
        pass: &mut Pass,
        rule: &TypeRenameRule,
        index: &VariableTypeIndex,
        legacy_prefix: &str,
    ) -> Result<(), UpgradeError> {
        if rule.field_renames.is_empty() {
            return Ok(());
        }

        for identifier in index.identifiers_of(&rule.old_name) {
            for field in &rule.field_renames {
                let legacy_name = field.legacy_name(legacy_prefix);
                let pattern = format!(
                    r"\b{}\.{}\b",
                    regex::escape(identifier),
                    regex::escape(&legacy_name)
                );
                let regex = self.patterns.get_or_compile(&pattern)?;
                let replacement = format!("{identifier}.{}", field.new_field_name);

                let replaced = owned(regex.replace_all(&pass.text, NoExpand(&replacement)));
                if pass.replace_with(replaced) {
                    pass.record(format!(
                        "Replaced field: {identifier}.{legacy_name} -> {replacement}"
                    ));
                }
            }
        }
        Ok(())
    }

    /// Normalize chains such as `CinemachineDollyCart>().m_Position.m_Units`.
    ///
    /// A chain is rooted at the rule's old type name and ends in one or two
    /// legacy-prefixed segments; a root segment equal to the old name is
    /// renamed along the way. Deeper chains are finished by a later run.
    fn rename_chains(
        &self,
        pass: &mut Pass,
        rule: &TypeRenameRule,
        legacy_prefix: &str,
    ) -> Result<(), UpgradeError> {
        if !pass.text.contains(legacy_prefix) || !pass.text.contains(rule.old_name.as_str()) {
            return Ok(());
        }

        let type_name = regex::escape(&rule.old_name);
        let prefix = regex::escape(legacy_prefix);
        let pattern = format!(
            r"(?:\b\w+\.)?\b{type_name}\b[\w.<>()\[\]]*?\.{prefix}\w+(?:\.{prefix}\w+)?"
        );
        let regex = self.patterns.get_or_compile(&pattern)?;

        let mut processed: HashMap<String, String> = HashMap::new();
        let mut entries = Vec::new();
        let replaced = owned(regex.replace_all(&pass.text, |caps: &Captures| {
            let original = &caps[0];
            if let Some(done) = processed.get(original) {
                return done.clone();
            }
            let rewritten = rewrite_chain(original, rule, legacy_prefix, &mut entries);
            if rewritten != original {
                entries.push(format!("Replaced chain: {original} -> {rewritten}"));
            }
            processed.insert(original.to_string(), rewritten.clone());
            rewritten
        }));

        pass.replace_with(replaced);
        for entry in entries {
            pass.record(entry);
        }
        Ok(())
    }

    fn rename_methods(&self, pass: &mut Pass, rules: &RuleSet) -> Result<(), UpgradeError> {
        for rule in &rules.method_renames {
            if rule.old == rule.new || !pass.text.contains(rule.old.as_str()) {
                continue;
            }
            let regex = self.patterns.whole_word(&rule.old)?;
            let replaced = owned(regex.replace_all(&pass.text, NoExpand(&rule.new)));
            if pass.replace_with(replaced) {
                pass.record(format!("Replaced method: {} -> {}", rule.old, rule.new));
            }
        }
        Ok(())
    }

    /// `GetComponent<T>().m_Field` -> `GetComponent<T>().Field` for known types
    /// and for the new names of renamed types. Field names are not renamed here.
    fn normalize_call_site_fields(
        &self,
        pass: &mut Pass,
        rules: &RuleSet,
    ) -> Result<(), UpgradeError> {
        if !pass.text.contains(CALL_SITE_ACCESSOR) {
            return Ok(());
        }

        let mut type_names: Vec<&str> = rules.known_types.iter().map(String::as_str).collect();
        for (_, new_name) in rules.renamed_types() {
            if !type_names.contains(&new_name) {
                type_names.push(new_name);
            }
        }

        let prefix = regex::escape(&rules.legacy_prefix);
        for type_name in type_names {
            if !pass.text.contains(type_name) {
                continue;
            }
            let pattern = format!(
                r"({}\s*<\s*{}\s*>\s*\(\s*\)\.){prefix}(\w+)",
                CALL_SITE_ACCESSOR,
                regex::escape(type_name)
            );
            let regex = self.patterns.get_or_compile(&pattern)?;

            let mut entries = Vec::new();
            let replaced = owned(regex.replace_all(&pass.text, |caps: &Captures| {
                let normalized = format!("{}{}", &caps[1], &caps[2]);
                entries.push(format!(
                    "Replaced GetComponent field: {} -> {normalized}",
                    &caps[0]
                ));
                normalized
            }));
            pass.replace_with(replaced);
            for entry in entries {
                pass.record(entry);
            }
        }
        Ok(())
    }
}

/// Rewrite one matched chain segment by segment.
fn rewrite_chain(
    chain: &str,
    rule: &TypeRenameRule,
    legacy_prefix: &str,
    entries: &mut Vec<String>,
) -> String {
    chain
        .split('.')
        .map(|segment| {
            if segment == rule.old_name {
                entries.push(format!(
                    "Replaced chained component: {segment} -> {}",
                    rule.new_name
                ));
                return rule.new_name.clone();
            }

            let Some(stripped) = segment.strip_prefix(legacy_prefix) else {
                return segment.to_string();
            };
            match rule.field_for_segment(segment, legacy_prefix) {
                Some(field) => {
                    entries.push(format!(
                        "Replaced chained field: {segment} -> {}",
                        field.new_field_name
                    ));
                    field.new_field_name.clone()
                }
                None => stripped.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}
