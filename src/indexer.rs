//! # Type Usage Indexer
//!
//! Naive declaration inference: every `KnownType identifier` occurrence in a
//! file marks `identifier` as possibly holding that type. An identifier may
//! end up with several candidate types; field renames apply if any of them
//! matches.

use crate::errors::UpgradeError;
use crate::pattern::PatternCache;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Identifier -> candidate known types, for a single file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableTypeIndex {
    entries: BTreeMap<String, BTreeSet<String>>,
}

impl VariableTypeIndex {
    pub fn insert(&mut self, identifier: impl Into<String>, type_name: impl Into<String>) {
        self.entries
            .entry(identifier.into())
            .or_default()
            .insert(type_name.into());
    }

    pub fn candidates(&self, identifier: &str) -> Option<&BTreeSet<String>> {
        self.entries.get(identifier)
    }

    /// Identifiers with `type_name` among their candidates, in name order.
    pub fn identifiers_of<'a>(&'a self, type_name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |(_, types)| types.contains(type_name))
            .map(|(identifier, _)| identifier.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Clone, Default)]
pub struct TypeUsageIndexer {
    patterns: PatternCache,
}

impl TypeUsageIndexer {
    pub fn new(patterns: PatternCache) -> Self {
        Self { patterns }
    }

    /// Build the index for one file's text.
    pub fn index(
        &self,
        text: &str,
        known_types: &[String],
    ) -> Result<VariableTypeIndex, UpgradeError> {
        let mut index = VariableTypeIndex::default();

        for type_name in known_types {
            // Cheap pre-check before running the regex
            if !text.contains(type_name.as_str()) {
                continue;
            }

            let pattern = format!(r"\b{}\s+(\w+)\b", regex::escape(type_name));
            let regex = self.patterns.get_or_compile(&pattern)?;

            for captures in regex.captures_iter(text) {
                if let Some(identifier) = captures.get(1) {
                    debug!("Found component variable: {} {}", type_name, identifier.as_str());
                    index.insert(identifier.as_str(), type_name.as_str());
                }
            }
        }

        Ok(index)
    }
}
