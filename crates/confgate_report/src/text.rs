//! Human-readable text report.
//!
//! The report is first projected into [`Warning`]s and a [`SummaryTable`];
//! a [`Printer`] turns those into text.

use std::fmt::Write;

use crate::structured::{EvaluationSummary, RunReport, ValidationStage};

/// One offending configuration under a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccurrenceLine {
    pub metadata_name: String,
    pub kind: String,
    pub skip_message: String,
}

/// A rule as shown under a file warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarningRule {
    pub name: String,
    /// Violations across non-skipped occurrences
    pub occurrences: usize,
    pub suggestion: String,
    /// Empty unless verbose
    pub documentation_url: String,
    pub occurrences_details: Vec<OccurrenceLine>,
}

/// Everything printed for one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Warning {
    pub title: String,
    pub failed_rules: Vec<WarningRule>,
    pub skipped_rules: Vec<WarningRule>,
    pub invalid_yaml_errors: Vec<String>,
    pub invalid_k8s_errors: Vec<String>,
    pub extra_messages: Vec<String>,
}

/// Styling hint for a summary row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStyle {
    Plain,
    Skipped,
    Failed,
    Passed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub left: String,
    pub right: String,
    pub style: RowStyle,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryTable {
    pub rows: Vec<SummaryRow>,
}

/// Renders text report parts.
pub trait Printer {
    fn warnings_text(&self, warnings: &[Warning]) -> String;
    fn evaluation_summary_text(&self, summary: &EvaluationSummary) -> String;
    fn summary_table_text(&self, table: &SummaryTable) -> String;
}

const NON_K8S_HINT: &str = "A non-K8s file was passed, and therefore the K8s schema validation step failed.\nUse the `--only-k8s-files` flag to ignore non-K8s files.";

impl RunReport {
    /// Upstream-invalid files first, then files with policy results in name order.
    pub fn warnings(&self) -> Vec<Warning> {
        let mut warnings = Vec::new();

        for invalid in self.invalid_files(ValidationStage::Yaml) {
            warnings.push(Warning {
                title: invalid.path.clone(),
                invalid_yaml_errors: invalid.errors.clone(),
                ..Default::default()
            });
        }

        for invalid in self.invalid_files(ValidationStage::K8s) {
            let extra_messages = invalid
                .errors
                .iter()
                .any(|e| e.contains("missing 'kind' key"))
                .then(|| NON_K8S_HINT.to_string())
                .into_iter()
                .collect();
            warnings.push(Warning {
                title: invalid.path.clone(),
                invalid_k8s_errors: invalid.errors.clone(),
                extra_messages,
                ..Default::default()
            });
        }

        let Some(formatted) = &self.check.formatted else {
            return warnings;
        };

        for (file_name, rules) in formatted.files() {
            let mut warning = Warning {
                title: file_name.clone(),
                ..Default::default()
            };

            for view in rules.values() {
                let rule = |details: Vec<OccurrenceLine>| WarningRule {
                    name: view.name.clone(),
                    occurrences: view.failed_occurrences_count(),
                    suggestion: view.message_on_failure.clone(),
                    documentation_url: if self.verbose {
                        view.documentation_url.clone()
                    } else {
                        String::new()
                    },
                    occurrences_details: details,
                };

                let skipped: Vec<_> = view
                    .skipped_occurrences()
                    .map(|o| OccurrenceLine {
                        metadata_name: o.metadata_name.clone(),
                        kind: o.kind.clone(),
                        skip_message: o.skip_message.clone(),
                    })
                    .collect();
                let failed: Vec<_> = view
                    .failed_occurrences()
                    .map(|o| OccurrenceLine {
                        metadata_name: o.metadata_name.clone(),
                        kind: o.kind.clone(),
                        skip_message: String::new(),
                    })
                    .collect();

                if !skipped.is_empty() {
                    warning.skipped_rules.push(rule(skipped));
                }
                if !failed.is_empty() {
                    warning.failed_rules.push(rule(failed));
                }
            }

            warnings.push(warning);
        }

        warnings
    }

    pub fn summary_table(&self) -> SummaryTable {
        let files_checked = self.check.files_data.len();
        let (failed, skipped, passed) = self.check.formatted.as_ref().map_or((0, 0, 0), |f| {
            (
                f.summary.total_failed_rules,
                f.summary.total_skipped_rules,
                f.summary.total_passed_rules,
            )
        });
        let evaluated = if self.check.formatted.is_some() {
            self.check.rules_count * files_checked
        } else {
            0
        };

        let row = |left: String, right: String, style| SummaryRow { left, right, style };
        SummaryTable {
            rows: vec![
                row(
                    format!("Enabled rules in policy \"{}\"", self.policy_name),
                    self.check.rules_count.to_string(),
                    RowStyle::Plain,
                ),
                row(
                    "Configs tested against policy".into(),
                    self.evaluation_summary.configs_count.to_string(),
                    RowStyle::Plain,
                ),
                row("Total rules evaluated".into(), evaluated.to_string(), RowStyle::Plain),
                row("Total rules skipped".into(), skipped.to_string(), RowStyle::Skipped),
                row("Total rules failed".into(), failed.to_string(), RowStyle::Failed),
                row("Total rules passed".into(), passed.to_string(), RowStyle::Passed),
                row("See all rules in policy".into(), self.rules_url.clone(), RowStyle::Plain),
            ],
        }
    }

    /// Render the full text report.
    pub fn text(&self, printer: &dyn Printer) -> String {
        let mut out = printer.warnings_text(&self.warnings());
        out.push_str(&printer.evaluation_summary_text(&self.evaluation_summary));
        out.push_str(&printer.summary_table_text(&self.summary_table()));
        out
    }
}

/// Uncolored, deterministic printer.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainPrinter;

impl PlainPrinter {
    const ERROR: &'static str = "[X]";
    const SKIP: &'static str = "[~]";
    const SUGGESTION: &'static str = "[*]";

    fn or_not_available(value: &str) -> &str {
        if value.is_empty() {
            "N/A"
        } else {
            value
        }
    }

    fn write_policy_results(out: &mut String, warning: &Warning) {
        out.push_str("[V] YAML validation\n");
        out.push_str("[V] Kubernetes schema validation\n\n");
        out.push_str("[X] Policy check\n\n");

        if !warning.skipped_rules.is_empty() {
            out.push_str("SKIPPED\n\n");
        }
        for rule in &warning.skipped_rules {
            let _ = writeln!(out, "{} {}", Self::SKIP, rule.name);
            if !rule.documentation_url.is_empty() {
                let _ = writeln!(out, "    How to fix: {}", rule.documentation_url);
            }
            for occurrence in &rule.occurrences_details {
                let _ = writeln!(
                    out,
                    "    - metadata.name: {} (kind: {})",
                    Self::or_not_available(&occurrence.metadata_name),
                    Self::or_not_available(&occurrence.kind)
                );
                let _ = writeln!(out, "{} {}", Self::SUGGESTION, occurrence.skip_message);
            }
            out.push('\n');
        }

        for rule in &warning.failed_rules {
            let plural = if rule.occurrences > 1 { "s" } else { "" };
            let _ = writeln!(
                out,
                "{} {} [{} occurrence{}]",
                Self::ERROR,
                rule.name,
                rule.occurrences,
                plural
            );
            if !rule.documentation_url.is_empty() {
                let _ = writeln!(out, "    How to fix: {}", rule.documentation_url);
            }
            for occurrence in &rule.occurrences_details {
                let _ = writeln!(
                    out,
                    "    - metadata.name: {} (kind: {})",
                    Self::or_not_available(&occurrence.metadata_name),
                    Self::or_not_available(&occurrence.kind)
                );
            }
            let _ = writeln!(out, "{} {}", Self::SUGGESTION, rule.suggestion);
            out.push('\n');
        }
    }
}

impl Printer for PlainPrinter {
    fn warnings_text(&self, warnings: &[Warning]) -> String {
        let mut out = String::new();

        for warning in warnings {
            let _ = writeln!(out, ">>  File: {}\n", warning.title);

            if !warning.invalid_yaml_errors.is_empty() {
                out.push_str("[X] YAML validation\n\n");
                for error in &warning.invalid_yaml_errors {
                    let _ = writeln!(out, "{} {}", Self::ERROR, error);
                }
                out.push_str("\n[?] Kubernetes schema validation didn't run for this file\n");
                out.push_str("[?] Policy check didn't run for this file\n\n");
            } else if !warning.invalid_k8s_errors.is_empty() {
                out.push_str("[V] YAML validation\n");
                out.push_str("[X] Kubernetes schema validation\n\n");
                for error in &warning.invalid_k8s_errors {
                    let _ = writeln!(out, "{} {}", Self::ERROR, error);
                }
                for message in &warning.extra_messages {
                    let _ = writeln!(out, "{}", message);
                }
                out.push_str("\n[?] Policy check didn't run for this file\n\n");
            } else {
                Self::write_policy_results(&mut out, warning);
            }
        }

        out.push('\n');
        out
    }

    fn evaluation_summary_text(&self, summary: &EvaluationSummary) -> String {
        let mut out = String::from("(Summary)\n\n");
        let _ = writeln!(
            out,
            "- Passing YAML validation: {}/{}\n",
            summary.passed_yaml_validation_count, summary.files_count
        );
        let _ = writeln!(
            out,
            "- Passing Kubernetes schema validation: {}\n",
            summary.k8s_validation
        );
        let _ = writeln!(
            out,
            "- Passing policy check: {}/{}\n",
            summary.passed_policy_validation_count, summary.files_count
        );
        out
    }

    fn summary_table_text(&self, table: &SummaryTable) -> String {
        let left = table.rows.iter().map(|r| r.left.chars().count()).max().unwrap_or(0);
        let right = table.rows.iter().map(|r| r.right.chars().count()).max().unwrap_or(0);
        let border = format!("+{}+{}+\n", "-".repeat(left + 2), "-".repeat(right + 2));

        let mut out = border.clone();
        for row in &table.rows {
            let _ = writeln!(out, "| {:<left$} | {:<right$} |", row.left, row.right);
        }
        out.push_str(&border);
        out
    }
}
