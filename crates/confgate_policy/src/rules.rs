//! Rules and the built-in rule catalog.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{PolicyError, PolicyResult};

const BUILTIN_CATALOG: &str = include_str!("default_rules.yaml");

/// A validation rule with an opaque predicate.
///
/// Identity is `identifier`; the remaining fields are display metadata and
/// may repeat across rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub identifier: String,
    pub name: String,
    /// JSON schema the configuration payload is checked against.
    pub schema: Value,
    pub message_on_failure: String,
    #[serde(default)]
    pub documentation_url: String,
}

impl Rule {
    pub fn new(identifier: impl Into<String>, name: impl Into<String>, schema: Value) -> Self {
        Self {
            identifier: identifier.into(),
            name: name.into(),
            schema,
            message_on_failure: String::new(),
            documentation_url: String::new(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message_on_failure = message.into();
        self
    }

    pub fn with_documentation_url(mut self, url: impl Into<String>) -> Self {
        self.documentation_url = url.into();
        self
    }

    /// Identifier/name pair used by reports that enumerate enabled rules.
    pub fn data(&self) -> RuleData {
        RuleData {
            identifier: self.identifier.clone(),
            name: self.name.clone(),
        }
    }
}

/// Identifier and display name of an enabled rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleData {
    #[serde(rename = "ruleIdentifier")]
    pub identifier: String,
    #[serde(rename = "ruleName")]
    pub name: String,
}

/// A rule as it is declared in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleDefinition {
    pub id: u32,
    pub name: String,
    pub unique_name: String,
    #[serde(default)]
    pub enabled_by_default: bool,
    #[serde(default)]
    pub documentation_url: String,
    pub message_on_failure: String,
    #[serde(default)]
    pub category: String,
    pub schema: Value,
}

impl RuleDefinition {
    /// Materialize the definition as a rule, optionally overriding its message.
    pub fn to_rule(&self, message_on_failure: Option<&str>) -> Rule {
        let message = message_on_failure
            .filter(|m| !m.is_empty())
            .unwrap_or(&self.message_on_failure);

        Rule::new(&self.unique_name, &self.name, self.schema.clone())
            .with_message(message)
            .with_documentation_url(&self.documentation_url)
    }
}

/// The catalog of rules that policies may reference by identifier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleCatalog {
    #[serde(default)]
    pub api_version: String,
    pub rules: Vec<RuleDefinition>,
}

impl RuleCatalog {
    /// Load the catalog compiled into the binary.
    pub fn builtin() -> PolicyResult<Self> {
        Self::from_yaml(BUILTIN_CATALOG)
    }

    /// Parse a catalog from YAML.
    pub fn from_yaml(yaml: &str) -> PolicyResult<Self> {
        let catalog: Self = serde_yaml::from_str(yaml)?;
        debug!("Loaded rule catalog with {} rules", catalog.rules.len());
        Ok(catalog)
    }

    /// Load a catalog from a YAML file.
    pub fn from_file(path: &Path) -> PolicyResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Find a definition by its unique name.
    pub fn get(&self, identifier: &str) -> Option<&RuleDefinition> {
        self.rules.iter().find(|r| r.unique_name == identifier)
    }

    /// Definitions that are enabled when no policy selects rules explicitly.
    pub fn enabled_by_default(&self) -> impl Iterator<Item = &RuleDefinition> {
        self.rules.iter().filter(|r| r.enabled_by_default)
    }

    /// Reject catalogs that reuse a unique name.
    pub fn validate(&self) -> PolicyResult<()> {
        let mut seen = std::collections::HashSet::new();
        for rule in &self.rules {
            if !seen.insert(rule.unique_name.as_str()) {
                return Err(PolicyError::DuplicateIdentifier(rule.unique_name.clone()));
            }
        }
        Ok(())
    }
}
