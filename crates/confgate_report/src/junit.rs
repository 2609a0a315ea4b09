//! JUnit XML projection.
//!
//! Each file that ran the policy check becomes a `<testsuite>` with one
//! `<testcase>` per enabled rule. Upstream validation failures get their own
//! suites, and two trailing suites carry the summaries as properties.

use serde::Serialize;

use confgate_eval::Occurrence;
use confgate_policy::RuleData;

use crate::error::{ReportError, ReportResult};
use crate::structured::{FileResults, FormattedOutput, InvalidFile, RuleResult, RunReport, ValidationStage};

pub const ALL_SKIPPED_MESSAGE: &str = "All failing configs skipped";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename = "testsuites")]
pub struct JUnitOutput {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@tests")]
    pub tests: usize,
    #[serde(rename = "@failures")]
    pub failures: usize,
    #[serde(rename = "@skipped")]
    pub skipped: usize,
    #[serde(rename = "testsuite")]
    pub test_suites: Vec<TestSuite>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestSuite {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,
    #[serde(rename = "testcase")]
    pub test_cases: Vec<TestCase>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Properties {
    pub property: Vec<Property>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Property {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@value")]
    pub value: String,
}

impl Property {
    fn new(name: &str, value: impl ToString) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestCase {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@classname")]
    pub class_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<Skipped>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<Failure>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skipped {
    #[serde(rename = "@message")]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    #[serde(rename = "@message")]
    pub message: String,
    #[serde(rename = "$text")]
    pub content: String,
}

impl JUnitOutput {
    /// Build the JUnit tree for a run.
    pub fn from_report(report: &RunReport) -> Self {
        let output = report.formatted_output();

        let mut junit = match &output.policy_summary {
            Some(summary) => Self {
                name: summary.policy_name.clone(),
                tests: summary.total_rules_in_policy,
                failures: summary.total_rules_failed,
                skipped: summary.total_skipped_rules,
                test_suites: Vec::new(),
            },
            None => Self {
                name: String::new(),
                tests: 0,
                failures: 0,
                skipped: 0,
                test_suites: Vec::new(),
            },
        };

        junit
            .test_suites
            .extend(report.invalid_files(ValidationStage::Yaml).map(invalid_yaml_suite));
        junit
            .test_suites
            .extend(report.invalid_files(ValidationStage::K8s).map(invalid_k8s_suite));

        for file in &report.check.files_data {
            let results = output
                .policy_validation_results
                .iter()
                .find(|r| r.file_name == file.filepath);
            junit
                .test_suites
                .push(file_suite(&file.filepath, results, &report.check.rules_data));
        }

        if let Some(suite) = policy_summary_suite(&output) {
            junit.test_suites.push(suite);
        }
        junit.test_suites.push(evaluation_summary_suite(&output));

        junit
    }

    /// Serialize as indented XML with a declaration header.
    pub fn to_xml(&self) -> ReportResult<String> {
        to_indented_xml(self)
    }
}

pub(crate) fn to_indented_xml<T: Serialize>(value: &T) -> ReportResult<String> {
    let mut body = String::new();
    let mut serializer = quick_xml::se::Serializer::new(&mut body);
    serializer.indent('\t', 1);
    value
        .serialize(serializer)
        .map_err(|e| ReportError::Xml(e.to_string()))?;

    Ok(format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{}\n", body))
}

fn invalid_yaml_suite(file: &InvalidFile) -> TestSuite {
    TestSuite {
        name: file.path.clone(),
        properties: None,
        test_cases: vec![TestCase {
            name: "invalid yaml file".into(),
            class_name: "yaml validation".into(),
            skipped: None,
            failure: Some(Failure {
                message: "Invalid yaml file".into(),
                content: file.errors.first().cloned().unwrap_or_default(),
            }),
        }],
    }
}

fn invalid_k8s_suite(file: &InvalidFile) -> TestSuite {
    TestSuite {
        name: file.path.clone(),
        properties: None,
        test_cases: file
            .errors
            .iter()
            .map(|error| TestCase {
                name: "invalid k8s file".into(),
                class_name: "k8s validation".into(),
                skipped: None,
                failure: Some(Failure {
                    message: "Invalid k8s file".into(),
                    content: error.clone(),
                }),
            })
            .collect(),
    }
}

fn file_suite(file_name: &str, results: Option<&FileResults>, rules: &[RuleData]) -> TestSuite {
    let test_cases = rules
        .iter()
        .map(|rule| {
            let result = results.and_then(|r| r.rule_results.iter().find(|rr| rr.identifier == rule.identifier));
            rule_test_case(rule, result)
        })
        .collect();

    TestSuite {
        name: file_name.to_string(),
        properties: None,
        test_cases,
    }
}

fn rule_test_case(rule: &RuleData, result: Option<&RuleResult>) -> TestCase {
    let mut test_case = TestCase {
        name: rule.name.clone(),
        class_name: rule.identifier.clone(),
        skipped: None,
        failure: None,
    };

    if let Some(result) = result {
        test_case.failure = Some(Failure {
            message: result.message_on_failure.clone(),
            content: failure_content(&result.occurrences_details),
        });
        if result.occurrences_details.iter().all(|o| o.is_skipped) {
            test_case.skipped = Some(Skipped {
                message: ALL_SKIPPED_MESSAGE.to_string(),
            });
        }
    }

    test_case
}

/// `"<N> occurrences"` with one line per configuration, then the skipped ones.
fn failure_content(occurrences: &[Occurrence]) -> String {
    let mut total = 0;
    let mut lines = String::new();
    let mut skipped = 0;
    let mut skip_lines = String::new();

    for occurrence in occurrences {
        let line = format!(
            "- metadata.name: {} (kind: {})\n",
            occurrence.metadata_name, occurrence.kind
        );
        total += occurrence.occurrences;
        lines.push_str(&line);
        if occurrence.is_skipped {
            skipped += 1;
            skip_lines.push_str(&line);
        }
    }

    format!("{} occurrences\n{}{} skipped\n{}", total, lines, skipped, skip_lines)
}

fn policy_summary_suite(output: &FormattedOutput) -> Option<TestSuite> {
    let summary = output.policy_summary.as_ref()?;
    Some(TestSuite {
        name: "policySummary".into(),
        properties: Some(Properties {
            property: vec![
                Property::new("policyName", &summary.policy_name),
                Property::new("totalRulesInPolicy", summary.total_rules_in_policy),
                Property::new("totalSkippedRules", summary.total_skipped_rules),
                Property::new("totalRulesFailed", summary.total_rules_failed),
                Property::new("totalPassedCount", summary.total_passed_count),
            ],
        }),
        test_cases: Vec::new(),
    })
}

fn evaluation_summary_suite(output: &FormattedOutput) -> TestSuite {
    let summary = &output.evaluation_summary;
    TestSuite {
        name: "evaluationSummary".into(),
        properties: Some(Properties {
            property: vec![
                Property::new("configsCount", summary.configs_count),
                Property::new("filesCount", summary.files_count),
                Property::new("passedYamlValidationCount", summary.passed_yaml_validation_count),
                Property::new("k8sValidation", &summary.k8s_validation),
                Property::new("passedPolicyValidationCount", summary.passed_policy_validation_count),
            ],
        }),
        test_cases: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_report;

    fn suite<'a>(junit: &'a JUnitOutput, name: &str) -> &'a TestSuite {
        junit.test_suites.iter().find(|s| s.name == name).unwrap()
    }

    #[test]
    fn test_root_and_suite_order() {
        let report = sample_report().with_invalid_files(vec![
            InvalidFile::k8s("notes.yaml", vec!["missing 'kind' key".into(), "second".into()]),
            InvalidFile::yaml("broken.yaml", vec!["bad indent".into()]),
        ]);
        let junit = JUnitOutput::from_report(&report);

        assert_eq!(junit.name, "Default");
        assert_eq!(junit.tests, 3);
        assert_eq!(junit.failures, 2);
        assert_eq!(junit.skipped, 2);

        let names: Vec<_> = junit.test_suites.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "broken.yaml",
                "notes.yaml",
                "pod.yaml",
                "deploy.yaml",
                "policySummary",
                "evaluationSummary"
            ]
        );
        assert_eq!(suite(&junit, "notes.yaml").test_cases.len(), 2);
        assert_eq!(
            suite(&junit, "broken.yaml").test_cases[0].failure.as_ref().unwrap().content,
            "bad indent"
        );
    }

    #[test]
    fn test_one_case_per_enabled_rule() {
        let junit = JUnitOutput::from_report(&sample_report());
        let deploy = suite(&junit, "deploy.yaml");
        let classes: Vec<_> = deploy.test_cases.iter().map(|c| c.class_name.as_str()).collect();
        assert_eq!(classes, vec!["IMAGE_TAG", "CPU_LIMIT", "PROBES"]);

        let probes = &deploy.test_cases[2];
        assert!(probes.failure.is_none());
        assert!(probes.skipped.is_none());

        let cpu = &deploy.test_cases[1];
        assert!(cpu.skipped.is_none());
        assert_eq!(
            cpu.failure.as_ref().unwrap().content,
            "3 occurrences\n- metadata.name: api (kind: Deployment)\n- metadata.name: worker (kind: Deployment)\n1 skipped\n- metadata.name: worker (kind: Deployment)\n"
        );
    }

    #[test]
    fn test_fully_skipped_rule_is_skipped_and_failed() {
        let junit = JUnitOutput::from_report(&sample_report());
        let cpu = &suite(&junit, "pod.yaml").test_cases[1];
        assert_eq!(cpu.skipped.as_ref().unwrap().message, ALL_SKIPPED_MESSAGE);
        assert!(cpu.failure.is_some());
    }

    #[test]
    fn test_xml_rendering() {
        let xml = JUnitOutput::from_report(&sample_report()).to_xml().unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<testsuites"));
        assert!(xml.contains(r#"name="Default""#));
        assert!(xml.contains(r#"classname="CPU_LIMIT""#));
        assert!(xml.contains(r#"<skipped message="All failing configs skipped"/>"#));
        assert!(xml.contains(r#"<property name="totalRulesInPolicy" value="3"/>"#));
        assert!(xml.contains(r#"<property name="k8sValidation" value="2/2"/>"#));
    }
}
