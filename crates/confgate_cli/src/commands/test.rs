//! Test command - Check configuration files against a policy.
//!
//! Files pass through YAML validation and the Kubernetes shape check before
//! the policy evaluation runs on the ones that made it through.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use confgate_eval::Evaluator;
use confgate_policy::{Policy, PolicyDocument, PolicyError, RuleCatalog, BUILTIN_POLICY_NAME};
use confgate_report::{render, EvaluationSummary, PlainPrinter, RunReport};

use crate::error::ViolationsFound;
use crate::extract::{expand_patterns, extract};
use crate::settings::{FileSettings, Overrides, Settings};

#[derive(Args, Debug)]
pub struct TestArgs {
    /// Files or glob patterns to check
    #[arg(required = true)]
    pub patterns: Vec<String>,

    /// Policy-as-code file (defaults to the built-in policy)
    #[arg(long, env = "CONFGATE_POLICY")]
    pub policy: Option<PathBuf>,

    /// Policy to use from the policy file (defaults to its default policy)
    #[arg(long, env = "CONFGATE_POLICY_NAME")]
    pub policy_name: Option<String>,

    /// Output format (simple, json, yaml, xml, junit, sarif)
    #[arg(short, long, env = "CONFGATE_OUTPUT")]
    pub output: Option<String>,

    /// Ignore files that are not Kubernetes manifests
    #[arg(long)]
    pub only_k8s_files: bool,

    /// Evaluate files one at a time
    #[arg(long)]
    pub no_parallel: bool,
}

impl TestArgs {
    fn overrides(&self, verbose: bool) -> Overrides {
        Overrides {
            policy: self.policy.clone(),
            policy_name: self.policy_name.clone(),
            output: self.output.clone(),
            verbose,
            no_parallel: self.no_parallel,
            only_k8s_files: self.only_k8s_files,
        }
    }
}

pub async fn execute(args: TestArgs, verbose: bool) -> Result<()> {
    let current_dir = std::env::current_dir()?;
    let file = FileSettings::discover(&current_dir)?;
    let settings = Settings::resolve(file, args.overrides(verbose))?;

    let report = run(&settings, &args.patterns).await?;
    print!("{}", render(&report, settings.output, &PlainPrinter)?);

    if report.has_failures() {
        let failed_rules = report
            .check
            .formatted
            .as_ref()
            .map_or(0, |f| f.summary.total_failed_rules);
        return Err(ViolationsFound {
            failed_rules,
            invalid_files: report.invalid_files.len(),
        }
        .into());
    }

    Ok(())
}

/// Discover, extract and evaluate; everything short of printing.
pub async fn run(settings: &Settings, patterns: &[String]) -> Result<RunReport> {
    let policy = load_policy(settings.policy.as_deref(), settings.policy_name.as_deref())?;

    let paths = expand_patterns(patterns)?;
    if paths.is_empty() {
        anyhow::bail!("No files found for the given patterns");
    }
    info!("Checking {} files", paths.len());

    let extraction = extract(&paths, settings.only_k8s_files)?;

    let evaluator = Evaluator::new(settings.evaluator_config());
    let files = extraction.files;
    let (policy, check) = tokio::task::spawn_blocking(move || {
        let check = evaluator.evaluate(&policy, &files);
        (policy, check)
    })
    .await
    .context("Evaluation task failed")?;
    let check = check.context("Policy evaluation failed")?;

    let summary = EvaluationSummary::compute(extraction.files_count, &extraction.invalid_files, &check);
    Ok(RunReport::new(policy.name, check, summary)
        .with_invalid_files(extraction.invalid_files)
        .with_verbose(settings.verbose))
}

/// The policy named in a policy file, or the built-in one.
pub fn load_policy(path: Option<&Path>, name: Option<&str>) -> Result<Policy> {
    let catalog = RuleCatalog::builtin().context("Failed to load built-in rules")?;

    let Some(path) = path else {
        if let Some(name) = name.filter(|n| *n != BUILTIN_POLICY_NAME) {
            return Err(PolicyError::PolicyNotFound(name.to_string()).into());
        }
        return Ok(Policy::builtin(&catalog));
    };

    let document =
        PolicyDocument::from_file(path).with_context(|| format!("Failed to load policy file {:?}", path))?;
    document
        .validate(&catalog)
        .with_context(|| format!("Policy file {:?} is invalid", path))?;
    Ok(document.resolve(name, &catalog)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use confgate_report::{OutputFormat, ValidationStage};
    use tempfile::TempDir;

    const POLICY: &str = r#"
apiVersion: v1
customRules:
  - identifier: REPLICAS
    name: Ensure replicas
    defaultMessageOnFailure: Set spec.replicas
    schema:
      properties:
        spec:
          required: [replicas]
policies:
  - name: Strict
    isDefault: true
    rules:
      - identifier: REPLICAS
      - identifier: WORKLOAD_INCORRECT_NAMESPACE_VALUE_DEFAULT
"#;

    const MANIFESTS: &str = r#"apiVersion: apps/v1
kind: Deployment
metadata:
  name: api
  namespace: default
spec:
  replicas: 2
---
apiVersion: apps/v1
kind: Deployment
metadata:
  name: worker
  namespace: jobs
  annotations:
    confgate.skip/REPLICAS: scaled by HPA
spec: {}
"#;

    fn workspace() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("policy.yaml"), POLICY).unwrap();
        std::fs::write(dir.path().join("app.yaml"), MANIFESTS).unwrap();
        std::fs::write(dir.path().join("notes.yaml"), "title: notes\n").unwrap();
        dir
    }

    fn pattern(dir: &TempDir, name: &str) -> String {
        dir.path().join(name).to_string_lossy().into_owned()
    }

    #[test]
    fn test_builtin_policy_by_default() {
        let policy = load_policy(None, None).unwrap();
        assert_eq!(policy.name, BUILTIN_POLICY_NAME);
        assert!(policy.rules_count() > 0);
        assert!(load_policy(None, Some("Default")).is_ok());
    }

    #[test]
    fn test_unknown_builtin_policy_name() {
        let err = load_policy(None, Some("Strict")).unwrap_err();
        assert!(err.to_string().contains("Strict"));
    }

    #[test]
    fn test_policy_from_file() {
        let dir = workspace();
        let policy = load_policy(Some(&dir.path().join("policy.yaml")), None).unwrap();
        assert_eq!(policy.name, "Strict");
        assert_eq!(policy.rules_count(), 2);
    }

    #[tokio::test]
    async fn test_run_with_policy_file() {
        let dir = workspace();
        let settings = Settings {
            policy: Some(dir.path().join("policy.yaml")),
            ..Settings::default()
        };

        let report = run(&settings, &[pattern(&dir, "*.yaml")]).await.unwrap();
        assert!(report.has_failures());
        assert_eq!(report.policy_name, "Strict");
        assert_eq!(report.evaluation_summary.files_count, 3);
        assert_eq!(report.evaluation_summary.configs_count, 2);

        // policy.yaml and notes.yaml have no `kind`
        let rejected: Vec<_> = report.invalid_files(ValidationStage::K8s).map(|f| f.path.clone()).collect();
        assert_eq!(rejected.len(), 2);

        let formatted = report.check.formatted.as_ref().unwrap();
        assert_eq!(formatted.summary.total_failed_rules, 1);
        assert_eq!(formatted.summary.total_skipped_rules, 1);
    }

    #[tokio::test]
    async fn test_run_only_k8s_files() {
        let dir = workspace();
        let settings = Settings {
            policy: Some(dir.path().join("policy.yaml")),
            only_k8s_files: true,
            parallel: false,
            ..Settings::default()
        };

        let report = run(&settings, &[pattern(&dir, "*.yaml")]).await.unwrap();
        assert!(report.invalid_files.is_empty());
        assert_eq!(report.evaluation_summary.files_count, 1);

        let json = render(&report, OutputFormat::Json, &PlainPrinter).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["policySummary"]["policyName"], "Strict");
        assert_eq!(value["evaluationSummary"]["k8sValidation"], "1/1");
    }

    #[tokio::test]
    async fn test_run_resolves_source_lines() {
        let dir = workspace();
        let settings = Settings {
            policy: Some(dir.path().join("policy.yaml")),
            only_k8s_files: true,
            ..Settings::default()
        };

        let report = run(&settings, &[pattern(&dir, "app.yaml")]).await.unwrap();
        let namespace = report
            .check
            .raw
            .rule(&pattern(&dir, "app.yaml"), "WORKLOAD_INCORRECT_NAMESPACE_VALUE_DEFAULT")
            .unwrap();
        let location = &namespace.configurations[0].failure_locations[0];
        assert_eq!((location.line, location.column), (5, 3));
    }

    #[tokio::test]
    async fn test_no_matching_files() {
        let dir = TempDir::new().unwrap();
        let result = run(&Settings::default(), &[pattern(&dir, "*.yaml")]).await;
        assert!(result.is_err());
    }
}
