//! Raw per-file, per-rule aggregation.
//!
//! Only failing or skipped rules are recorded. A (file, rule) pair with no
//! entry passed; pass counts are derived arithmetically in [`crate::summary`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Where in the source a violation was found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureLocation {
    /// Instance location (JSON pointer) the position was resolved from
    pub schema_path: String,
    pub line: usize,
    pub column: usize,
}

/// Outcome of one rule against one configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Occurrence {
    pub metadata_name: String,
    pub kind: String,
    /// Number of violations the predicate reported
    pub occurrences: usize,
    pub is_skipped: bool,
    #[serde(default)]
    pub skip_message: String,
    #[serde(default)]
    pub failure_locations: Vec<FailureLocation>,
}

/// A rule that failed or was skipped somewhere in one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedRule {
    pub name: String,
    pub documentation_url: String,
    pub message_on_failure: String,
    pub configurations: Vec<Occurrence>,
}

impl FailedRule {
    /// Append another fragment's occurrences.
    pub fn merge(&mut self, other: FailedRule) {
        self.configurations.extend(other.configurations);
    }

    pub fn total(&self) -> usize {
        self.configurations.len()
    }

    pub fn skipped(&self) -> usize {
        self.configurations.iter().filter(|o| o.is_skipped).count()
    }
}

/// `file name -> rule identifier -> FailedRule`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FailedRulesByFiles(BTreeMap<String, BTreeMap<String, FailedRule>>);

impl FailedRulesByFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a fragment in. An existing entry accumulates occurrences.
    pub fn add(&mut self, file_name: &str, rule_id: &str, fragment: FailedRule) {
        let rules = self.0.entry(file_name.to_string()).or_default();
        match rules.get_mut(rule_id) {
            Some(existing) => existing.merge(fragment),
            None => {
                rules.insert(rule_id.to_string(), fragment);
            }
        }
    }

    /// Fold every entry of another aggregation into this one.
    pub fn merge(&mut self, other: FailedRulesByFiles) {
        for (file_name, rules) in other.0 {
            for (rule_id, fragment) in rules {
                self.add(&file_name, &rule_id, fragment);
            }
        }
    }

    pub fn get(&self, file_name: &str) -> Option<&BTreeMap<String, FailedRule>> {
        self.0.get(file_name)
    }

    pub fn rule(&self, file_name: &str, rule_id: &str) -> Option<&FailedRule> {
        self.0.get(file_name)?.get(rule_id)
    }

    /// Files in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeMap<String, FailedRule>)> {
        self.0.iter()
    }

    pub fn files_count(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
