//! Run report and its structured (non-interactive) projection.
//!
//! [`FormattedOutput`] is the wire contract for json, yaml and xml output.
//! Field names are stable.

use serde::{Deserialize, Serialize};

use confgate_eval::{Occurrence, PolicyCheckResult};

/// Default target of the "See all rules in policy" summary row.
pub const RULES_DOCUMENTATION_URL: &str = "https://github.com/confgate/confgate/blob/main/docs/rules.md";

/// Validation stage that ran before the policy check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStage {
    Yaml,
    K8s,
}

impl ValidationStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yaml => "yaml",
            Self::K8s => "k8s",
        }
    }
}

/// A file rejected before the policy check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidFile {
    pub path: String,
    pub stage: ValidationStage,
    pub errors: Vec<String>,
}

impl InvalidFile {
    pub fn yaml(path: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            path: path.into(),
            stage: ValidationStage::Yaml,
            errors,
        }
    }

    pub fn k8s(path: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            path: path.into(),
            stage: ValidationStage::K8s,
            errors,
        }
    }
}

/// One failing or skipped rule in one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleResult {
    pub identifier: String,
    pub name: String,
    pub message_on_failure: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation_url: Option<String>,
    pub occurrences_details: Vec<Occurrence>,
}

/// Rule results for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResults {
    pub file_name: String,
    pub rule_results: Vec<RuleResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicySummary {
    pub policy_name: String,
    pub total_rules_in_policy: usize,
    pub total_skipped_rules: usize,
    pub total_rules_failed: usize,
    pub total_passed_count: i64,
}

/// Counts across every validation stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationSummary {
    pub configs_count: usize,
    pub files_count: usize,
    pub passed_yaml_validation_count: usize,
    /// `"passed/total"`
    pub k8s_validation: String,
    pub passed_policy_validation_count: usize,
}

impl EvaluationSummary {
    /// Derive stage counts from the number of input files and the rejected ones.
    pub fn compute(files_count: usize, invalid_files: &[InvalidFile], check: &PolicyCheckResult) -> Self {
        let invalid_yaml = invalid_files
            .iter()
            .filter(|f| f.stage == ValidationStage::Yaml)
            .count();
        let invalid_k8s = invalid_files
            .iter()
            .filter(|f| f.stage == ValidationStage::K8s)
            .count();
        let passed_yaml = files_count.saturating_sub(invalid_yaml);
        let passed_k8s = passed_yaml.saturating_sub(invalid_k8s);

        Self {
            configs_count: check.configurations_count(),
            files_count,
            passed_yaml_validation_count: passed_yaml,
            k8s_validation: format!("{}/{}", passed_k8s, files_count),
            passed_policy_validation_count: check
                .formatted
                .as_ref()
                .map_or(0, |f| f.summary.files_passed_count),
        }
    }
}

/// The structured report tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename = "FormattedOutput", rename_all = "camelCase")]
pub struct FormattedOutput {
    pub policy_validation_results: Vec<FileResults>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_summary: Option<PolicySummary>,
    pub evaluation_summary: EvaluationSummary,
    pub upstream_validation_results: Vec<InvalidFile>,
}

/// Everything needed to render one run in any output format.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub policy_name: String,
    pub check: PolicyCheckResult,
    pub invalid_files: Vec<InvalidFile>,
    pub evaluation_summary: EvaluationSummary,
    pub verbose: bool,
    pub rules_url: String,
}

impl RunReport {
    pub fn new(policy_name: impl Into<String>, check: PolicyCheckResult, evaluation_summary: EvaluationSummary) -> Self {
        Self {
            policy_name: policy_name.into(),
            check,
            invalid_files: Vec::new(),
            evaluation_summary,
            verbose: false,
            rules_url: RULES_DOCUMENTATION_URL.to_string(),
        }
    }

    pub fn with_invalid_files(mut self, invalid_files: Vec<InvalidFile>) -> Self {
        self.invalid_files = invalid_files;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_rules_url(mut self, url: impl Into<String>) -> Self {
        self.rules_url = url.into();
        self
    }

    pub fn invalid_files(&self, stage: ValidationStage) -> impl Iterator<Item = &InvalidFile> {
        self.invalid_files.iter().filter(move |f| f.stage == stage)
    }

    /// Whether the run should be reported as failing.
    pub fn has_failures(&self) -> bool {
        self.check.has_failures() || !self.invalid_files.is_empty()
    }

    /// Project the run into the structured report tree.
    pub fn formatted_output(&self) -> FormattedOutput {
        let Some(formatted) = &self.check.formatted else {
            return FormattedOutput {
                policy_validation_results: Vec::new(),
                policy_summary: None,
                evaluation_summary: self.evaluation_summary.clone(),
                upstream_validation_results: self.invalid_files.clone(),
            };
        };

        let policy_validation_results = formatted
            .files()
            .map(|(file_name, rules)| FileResults {
                file_name: file_name.clone(),
                rule_results: rules
                    .values()
                    .map(|view| RuleResult {
                        identifier: view.identifier.clone(),
                        name: view.name.clone(),
                        message_on_failure: view.message_on_failure.clone(),
                        documentation_url: self.verbose.then(|| view.documentation_url.clone()),
                        occurrences_details: view.occurrences_details.clone(),
                    })
                    .collect(),
            })
            .collect();

        FormattedOutput {
            policy_validation_results,
            policy_summary: Some(PolicySummary {
                policy_name: self.policy_name.clone(),
                total_rules_in_policy: self.check.rules_count,
                total_skipped_rules: formatted.summary.total_skipped_rules,
                total_rules_failed: formatted.summary.total_failed_rules,
                total_passed_count: formatted.summary.total_passed_rules,
            }),
            evaluation_summary: self.evaluation_summary.clone(),
            upstream_validation_results: self.invalid_files.clone(),
        }
    }
}
