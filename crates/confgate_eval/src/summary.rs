//! Summary counters and the display-shaped view of an evaluation.
//!
//! The raw aggregation holds no pass records. `total_passed_rules` is the
//! number of possible checks (`rules_count * files_count`) minus the recorded
//! failed and skipped classifications. A partially skipped rule is counted
//! as both failed and skipped, so the passed count can go negative.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::aggregate::{FailedRulesByFiles, Occurrence};

/// How a recorded rule counts toward the summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleClassification {
    Failed,
    Skipped,
    FailedAndSkipped,
}

impl RuleClassification {
    pub fn classify(total: usize, skipped: usize) -> Self {
        if skipped == total {
            Self::Skipped
        } else if skipped > 0 {
            Self::FailedAndSkipped
        } else {
            Self::Failed
        }
    }

    pub fn counts_as_failed(&self) -> bool {
        matches!(self, Self::Failed | Self::FailedAndSkipped)
    }

    pub fn counts_as_skipped(&self) -> bool {
        matches!(self, Self::Skipped | Self::FailedAndSkipped)
    }
}

/// A failing or skipped rule within one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleView {
    pub identifier: String,
    pub name: String,
    pub message_on_failure: String,
    pub documentation_url: String,
    pub occurrences_details: Vec<Occurrence>,
}

impl RuleView {
    pub fn classification(&self) -> RuleClassification {
        let skipped = self.skipped_occurrences().count();
        RuleClassification::classify(self.occurrences_details.len(), skipped)
    }

    /// Sum of violation counts over non-skipped occurrences.
    pub fn failed_occurrences_count(&self) -> usize {
        self.failed_occurrences().map(|o| o.occurrences).sum()
    }

    pub fn failed_occurrences(&self) -> impl Iterator<Item = &Occurrence> {
        self.occurrences_details.iter().filter(|o| !o.is_skipped)
    }

    pub fn skipped_occurrences(&self) -> impl Iterator<Item = &Occurrence> {
        self.occurrences_details.iter().filter(|o| o.is_skipped)
    }

    /// Sort occurrences by metadata name then kind.
    fn sort(&mut self) {
        self.occurrences_details.sort_by(|a, b| {
            (&a.metadata_name, &a.kind, a.is_skipped).cmp(&(&b.metadata_name, &b.kind, b.is_skipped))
        });
    }
}

/// Run-wide counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResultsSummary {
    pub total_failed_rules: usize,
    pub total_skipped_rules: usize,
    pub total_passed_rules: i64,
    pub files_count: usize,
    pub files_passed_count: usize,
}

/// `file name -> rule identifier -> RuleView` plus the summary counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResults {
    pub file_name_rule_mapper: BTreeMap<String, BTreeMap<String, RuleView>>,
    pub summary: EvaluationResultsSummary,
}

impl EvaluationResults {
    /// Files in name order, each with its rules in identifier order.
    pub fn files(&self) -> impl Iterator<Item = (&String, &BTreeMap<String, RuleView>)> {
        self.file_name_rule_mapper.iter()
    }

    pub fn has_failures(&self) -> bool {
        self.summary.total_failed_rules > 0
    }
}

/// Derive the summary and display view from the raw aggregation.
pub fn summarize(raw: &FailedRulesByFiles, files_count: usize, rules_count: usize) -> EvaluationResults {
    let mut mapper = BTreeMap::new();
    let mut total_failed = 0usize;
    let mut total_skipped = 0usize;
    let mut failed_files = 0usize;

    for (file_name, rules) in raw.iter() {
        let mut views = BTreeMap::new();
        let mut file_failed = false;

        for (rule_id, failed_rule) in rules {
            let mut view = RuleView {
                identifier: rule_id.clone(),
                name: failed_rule.name.clone(),
                message_on_failure: failed_rule.message_on_failure.clone(),
                documentation_url: failed_rule.documentation_url.clone(),
                occurrences_details: failed_rule.configurations.clone(),
            };
            view.sort();

            let classification = view.classification();
            if classification.counts_as_failed() {
                total_failed += 1;
                file_failed = true;
            }
            if classification.counts_as_skipped() {
                total_skipped += 1;
            }
            views.insert(rule_id.clone(), view);
        }

        if file_failed {
            failed_files += 1;
        }
        mapper.insert(file_name.clone(), views);
    }

    let possible = (rules_count * files_count) as i64;
    let summary = EvaluationResultsSummary {
        total_failed_rules: total_failed,
        total_skipped_rules: total_skipped,
        total_passed_rules: possible - total_failed as i64 - total_skipped as i64,
        files_count,
        files_passed_count: files_count.saturating_sub(failed_files),
    };

    EvaluationResults {
        file_name_rule_mapper: mapper,
        summary,
    }
}
