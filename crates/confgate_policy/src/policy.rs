//! Policies and policy-as-code documents.
//!
//! A [`Policy`] is the resolved, immutable set of rules evaluated in one run.
//! Policies are either built from the catalog defaults or resolved from a
//! [`PolicyDocument`] loaded from YAML.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{PolicyError, PolicyResult};
use crate::rules::{Rule, RuleCatalog, RuleData};

/// Supported policy document version.
pub const POLICY_API_VERSION: &str = "v1";

/// Name of the policy built from catalog defaults.
pub const BUILTIN_POLICY_NAME: &str = "Default";

/// A named, ordered collection of rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    pub name: String,
    pub rules: Vec<Rule>,
}

impl Policy {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
        }
    }

    /// Add a rule to the policy.
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Policy containing every catalog rule that is enabled by default.
    pub fn builtin(catalog: &RuleCatalog) -> Self {
        let rules = catalog
            .enabled_by_default()
            .map(|definition| definition.to_rule(None))
            .collect();

        Self {
            name: BUILTIN_POLICY_NAME.to_string(),
            rules,
        }
    }

    pub fn rules_count(&self) -> usize {
        self.rules.len()
    }

    pub fn rule(&self, identifier: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.identifier == identifier)
    }

    /// Enabled rules as identifier/name pairs, in policy order.
    pub fn rules_data(&self) -> Vec<RuleData> {
        self.rules.iter().map(Rule::data).collect()
    }
}

/// A rule defined inside a policy document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomRule {
    pub identifier: String,
    pub name: String,
    #[serde(default)]
    pub default_message_on_failure: String,
    /// Schema written inline as YAML.
    #[serde(default)]
    pub schema: Option<Value>,
    /// Schema written as a JSON string.
    #[serde(default)]
    pub json_schema: Option<String>,
}

impl CustomRule {
    /// The rule's schema, preferring the inline form.
    pub fn resolved_schema(&self) -> PolicyResult<Value> {
        if let Some(schema) = &self.schema {
            return Ok(schema.clone());
        }
        match &self.json_schema {
            Some(text) => Ok(serde_json::from_str(text)?),
            None => Err(PolicyError::MissingSchema(self.identifier.clone())),
        }
    }
}

/// Reference from a policy to a custom or catalog rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRuleRef {
    pub identifier: String,
    #[serde(default)]
    pub message_on_failure: String,
}

/// A policy entry of a policy document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyEntry {
    pub name: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub rules: Vec<PolicyRuleRef>,
}

/// A policy-as-code document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyDocument {
    pub api_version: String,
    #[serde(default)]
    pub custom_rules: Vec<CustomRule>,
    pub policies: Vec<PolicyEntry>,
}

impl PolicyDocument {
    /// Parse a policy document from YAML without validating it.
    pub fn from_yaml(yaml: &str) -> PolicyResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a policy document from a file.
    pub fn from_file(path: &Path) -> PolicyResult<Self> {
        debug!("Loading policy document from {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Check the document's structure against the catalog it will resolve with.
    pub fn validate(&self, catalog: &RuleCatalog) -> PolicyResult<()> {
        if self.api_version != POLICY_API_VERSION {
            return Err(PolicyError::InvalidConfiguration(format!(
                "unsupported apiVersion '{}', expected '{}'",
                self.api_version, POLICY_API_VERSION
            )));
        }

        let defaults = self.policies.iter().filter(|p| p.is_default).count();
        if defaults != 1 {
            return Err(PolicyError::InvalidConfiguration(format!(
                "exactly one policy must be marked isDefault, found {}",
                defaults
            )));
        }

        let mut custom_ids = HashSet::new();
        for custom in &self.custom_rules {
            if !custom_ids.insert(custom.identifier.as_str()) {
                return Err(PolicyError::DuplicateIdentifier(custom.identifier.clone()));
            }
            if catalog.get(&custom.identifier).is_some() {
                return Err(PolicyError::DefaultRuleIdentifier(custom.identifier.clone()));
            }
            custom.resolved_schema()?;
        }

        let mut names = HashSet::new();
        for entry in &self.policies {
            if !names.insert(entry.name.as_str()) {
                return Err(PolicyError::InvalidConfiguration(format!(
                    "policy name '{}' is used more than once",
                    entry.name
                )));
            }
            let mut seen = HashSet::new();
            for rule_ref in &entry.rules {
                if !seen.insert(rule_ref.identifier.as_str()) {
                    return Err(PolicyError::DuplicateRuleInPolicy {
                        policy: entry.name.clone(),
                        identifier: rule_ref.identifier.clone(),
                    });
                }
                let known = custom_ids.contains(rule_ref.identifier.as_str())
                    || catalog.get(&rule_ref.identifier).is_some();
                if !known {
                    return Err(PolicyError::UnknownRule(rule_ref.identifier.clone()));
                }
            }
        }

        Ok(())
    }

    /// The default policy entry, if any.
    pub fn default_policy(&self) -> Option<&PolicyEntry> {
        self.policies.iter().find(|p| p.is_default)
    }

    /// Resolve a named policy (or the default one) into a [`Policy`].
    pub fn resolve(&self, name: Option<&str>, catalog: &RuleCatalog) -> PolicyResult<Policy> {
        let entry = match name {
            Some(name) => self.policies.iter().find(|p| p.name == name),
            None => self.default_policy(),
        }
        .ok_or_else(|| PolicyError::PolicyNotFound(name.unwrap_or("<default>").to_string()))?;

        let mut policy = Policy::new(&entry.name);
        for rule_ref in &entry.rules {
            if policy.rule(&rule_ref.identifier).is_some() {
                return Err(PolicyError::DuplicateRuleInPolicy {
                    policy: entry.name.clone(),
                    identifier: rule_ref.identifier.clone(),
                });
            }
            policy.rules.push(self.resolve_rule(rule_ref, catalog)?);
        }

        info!(
            "Resolved policy '{}' with {} rules",
            policy.name,
            policy.rules_count()
        );
        Ok(policy)
    }

    fn resolve_rule(&self, rule_ref: &PolicyRuleRef, catalog: &RuleCatalog) -> PolicyResult<Rule> {
        let message = Some(rule_ref.message_on_failure.as_str()).filter(|m| !m.is_empty());

        if let Some(custom) = self
            .custom_rules
            .iter()
            .find(|c| c.identifier == rule_ref.identifier)
        {
            let schema = custom.resolved_schema()?;
            let message = message.unwrap_or(&custom.default_message_on_failure);
            return Ok(Rule::new(&custom.identifier, &custom.name, schema).with_message(message));
        }

        catalog
            .get(&rule_ref.identifier)
            .map(|definition| definition.to_rule(message))
            .ok_or_else(|| PolicyError::UnknownRule(rule_ref.identifier.clone()))
    }
}
