//! Policy evaluation engine.
//!
//! Evaluates every rule of a policy against every configuration of every
//! file. Files are independent: each is folded into a private partial
//! aggregation, and the partials are merged sequentially afterwards.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use confgate_policy::{Policy, RuleData};

use crate::aggregate::FailedRulesByFiles;
use crate::config::EvaluatorConfig;
use crate::configuration::FileConfigurations;
use crate::error::EvalResult;
use crate::locate::{PositionResolver, YamlPositionResolver};
use crate::matcher::match_rule;
use crate::predicate::{CompiledRule, JsonSchemaCompiler, PredicateCompiler};
use crate::skip::extract_skip_annotations;
use crate::summary::{summarize, EvaluationResults};

/// A file that went through the policy check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileData {
    pub filepath: String,
    pub configurations_count: usize,
}

/// Everything one evaluation run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyCheckResult {
    /// `None` when there was nothing to evaluate
    pub formatted: Option<EvaluationResults>,
    pub raw: FailedRulesByFiles,
    pub rules_data: Vec<RuleData>,
    pub files_data: Vec<FileData>,
    pub rules_count: usize,
}

impl PolicyCheckResult {
    pub fn is_empty(&self) -> bool {
        self.formatted.is_none()
    }

    pub fn has_failures(&self) -> bool {
        self.formatted.as_ref().is_some_and(EvaluationResults::has_failures)
    }

    pub fn configurations_count(&self) -> usize {
        self.files_data.iter().map(|f| f.configurations_count).sum()
    }
}

/// Policy evaluation engine.
pub struct Evaluator {
    config: EvaluatorConfig,
    compiler: Box<dyn PredicateCompiler>,
    resolver: Box<dyn PositionResolver>,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(EvaluatorConfig::default())
    }
}

impl Evaluator {
    /// Create an evaluator using JSON schema predicates and YAML positions.
    pub fn new(config: EvaluatorConfig) -> Self {
        Self {
            config,
            compiler: Box::new(JsonSchemaCompiler),
            resolver: Box::new(YamlPositionResolver::new()),
        }
    }

    /// Replace the predicate compiler.
    pub fn with_compiler(mut self, compiler: impl PredicateCompiler + 'static) -> Self {
        self.compiler = Box::new(compiler);
        self
    }

    /// Replace the position resolver.
    pub fn with_resolver(mut self, resolver: impl PositionResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Evaluate a policy against a set of files.
    ///
    /// Any predicate error aborts the whole run.
    pub fn evaluate(&self, policy: &Policy, files: &[FileConfigurations]) -> EvalResult<PolicyCheckResult> {
        let configurations: usize = files.iter().map(|f| f.configurations.len()).sum();
        if configurations == 0 {
            info!("No configurations to evaluate");
            return Ok(PolicyCheckResult::default());
        }

        info!(
            "Evaluating policy '{}' ({} rules) against {} files",
            policy.name,
            policy.rules_count(),
            files.len()
        );

        let rules = CompiledRule::compile_policy(policy, self.compiler.as_ref())?;

        let partials: Vec<FailedRulesByFiles> = if self.config.parallel {
            files
                .par_iter()
                .map(|file| self.evaluate_file(&rules, file))
                .collect::<EvalResult<_>>()?
        } else {
            files
                .iter()
                .map(|file| self.evaluate_file(&rules, file))
                .collect::<EvalResult<_>>()?
        };

        let mut raw = FailedRulesByFiles::new();
        for partial in partials {
            raw.merge(partial);
        }

        let formatted = summarize(&raw, files.len(), policy.rules_count());
        info!(
            "Evaluation complete: {} failed, {} skipped, {} passed",
            formatted.summary.total_failed_rules,
            formatted.summary.total_skipped_rules,
            formatted.summary.total_passed_rules
        );

        Ok(PolicyCheckResult {
            formatted: Some(formatted),
            raw,
            rules_data: policy.rules_data(),
            files_data: files
                .iter()
                .map(|f| FileData {
                    filepath: f.file_name.clone(),
                    configurations_count: f.configurations.len(),
                })
                .collect(),
            rules_count: policy.rules_count(),
        })
    }

    fn evaluate_file(&self, rules: &[CompiledRule], file: &FileConfigurations) -> EvalResult<FailedRulesByFiles> {
        let resolver = self
            .config
            .resolve_locations
            .then_some(self.resolver.as_ref());
        let mut partial = FailedRulesByFiles::new();

        for configuration in &file.configurations {
            let skips = extract_skip_annotations(&configuration.annotations, &self.config.skip_prefix);
            for rule in rules {
                if let Some(fragment) = match_rule(rule, configuration, &skips, resolver)? {
                    partial.add(&file.file_name, &rule.rule.identifier, fragment);
                }
            }
        }

        debug!(
            "Evaluated {} ({} configurations, {} rules recorded)",
            file.file_name,
            file.configurations.len(),
            partial.get(&file.file_name).map_or(0, |r| r.len())
        );
        Ok(partial)
    }
}
