//! End-to-end rendering of a real evaluation.

use serde_json::json;

use confgate_eval::{Configuration, Evaluator, EvaluatorConfig, FileConfigurations};
use confgate_policy::{Policy, Rule};
use confgate_report::{
    render, EvaluationSummary, InvalidFile, JUnitOutput, OutputFormat, PlainPrinter, RunReport,
};

fn policy() -> Policy {
    Policy::new("Ci")
        .with_rule(
            Rule::new(
                "REPLICAS",
                "Ensure replicas",
                json!({"properties": {"spec": {"required": ["replicas"]}}}),
            )
            .with_message("Set spec.replicas")
            .with_documentation_url("https://docs.example/replicas"),
        )
        .with_rule(Rule::new(
            "NAMESPACE",
            "Ensure namespace",
            json!({"properties": {"metadata": {"required": ["namespace"]}}}),
        ))
}

fn deployment(name: &str, replicas: bool, skip_replicas: bool) -> Configuration {
    let mut doc = json!({
        "apiVersion": "apps/v1",
        "kind": "Deployment",
        "metadata": {"name": name, "namespace": "prod"},
        "spec": {}
    });
    if replicas {
        doc["spec"]["replicas"] = json!(2);
    }
    if skip_replicas {
        doc["metadata"]["annotations"] = json!({"confgate.skip/REPLICAS": "scaled by HPA"});
    }
    Configuration::from_document(doc, "")
}

fn report() -> RunReport {
    let files = vec![
        FileConfigurations::new("ok.yaml", vec![deployment("good", true, false)]),
        FileConfigurations::new(
            "bad.yaml",
            vec![deployment("web", false, false), deployment("batch", false, true)],
        ),
    ];
    let evaluator = Evaluator::new(EvaluatorConfig::default().with_locations(false));
    let check = evaluator.evaluate(&policy(), &files).unwrap();

    let invalid = vec![InvalidFile::yaml("broken.yaml", vec!["mapping values are not allowed".into()])];
    let summary = EvaluationSummary::compute(3, &invalid, &check);
    RunReport::new("Ci", check, summary).with_invalid_files(invalid)
}

#[test]
fn test_structured_summary_matches_evaluation() {
    let output = report().formatted_output();
    let summary = output.policy_summary.unwrap();
    assert_eq!(summary.total_rules_in_policy, 2);
    assert_eq!(summary.total_rules_failed, 1);
    assert_eq!(summary.total_skipped_rules, 1);
    assert_eq!(summary.total_passed_count, 2);

    assert_eq!(output.evaluation_summary.configs_count, 3);
    assert_eq!(output.evaluation_summary.passed_yaml_validation_count, 2);
    assert_eq!(output.evaluation_summary.k8s_validation, "2/3");
    assert_eq!(output.evaluation_summary.passed_policy_validation_count, 1);
    assert_eq!(output.upstream_validation_results.len(), 1);
}

#[test]
fn test_text_report() {
    let report = report();
    assert!(report.has_failures());

    let text = render(&report, OutputFormat::Simple, &PlainPrinter).unwrap();
    assert!(text.contains(">>  File: broken.yaml"));
    assert!(text.contains("[X] mapping values are not allowed"));
    assert!(text.contains("[X] Ensure replicas [1 occurrence]"));
    assert!(text.contains("[*] scaled by HPA"));
    assert!(text.contains("- Passing YAML validation: 2/3"));
    assert!(!text.contains(">>  File: ok.yaml"));
}

#[test]
fn test_junit_has_case_for_passing_file() {
    let junit = JUnitOutput::from_report(&report());
    let ok = junit.test_suites.iter().find(|s| s.name == "ok.yaml").unwrap();
    assert_eq!(ok.test_cases.len(), 2);
    assert!(ok.test_cases.iter().all(|c| c.failure.is_none()));
    assert_eq!(junit.test_suites[0].name, "broken.yaml");
}

#[test]
fn test_sarif_levels_and_unresolved_regions() {
    let sarif = render(&report(), OutputFormat::Sarif, &PlainPrinter).unwrap();
    let value: serde_json::Value = serde_json::from_str(&sarif).unwrap();
    let results = value["runs"][0]["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);

    let levels: Vec<_> = results.iter().map(|r| r["level"].as_str().unwrap()).collect();
    assert_eq!(levels, vec!["note", "error"]);
    assert_eq!(results[0]["locations"][0]["physicalLocation"]["region"]["startLine"], 1);
}

#[test]
fn test_json_round_trips_through_value() {
    let json = render(&report(), OutputFormat::Json, &PlainPrinter).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let results = value["policyValidationResults"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["fileName"], "bad.yaml");
    assert_eq!(value["upstreamValidationResults"][0]["stage"], "yaml");
}
