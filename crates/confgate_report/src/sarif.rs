//! SARIF 2.1.0 projection.

use std::collections::BTreeMap;

use serde_json::{json, Value};

use crate::structured::{FormattedOutput, RULES_DOCUMENTATION_URL};

const TOOL_NAME: &str = "confgate";
const TOOL_URI: &str = "https://github.com/confgate/confgate";

/// Build a SARIF log with one result per failure location.
pub fn sarif_log(output: &FormattedOutput) -> Value {
    let mut rules: BTreeMap<&str, Value> = BTreeMap::new();
    let mut results = Vec::new();

    for file in &output.policy_validation_results {
        for rule in &file.rule_results {
            let help_url = rule
                .documentation_url
                .as_deref()
                .filter(|url| !url.is_empty())
                .unwrap_or(RULES_DOCUMENTATION_URL);
            let how_to_fix = format!(
                "For information on how to fix this issue, see: [{}]({})",
                help_url, help_url
            );

            for occurrence in &rule.occurrences_details {
                for location in &occurrence.failure_locations {
                    rules.entry(rule.identifier.as_str()).or_insert_with(|| {
                        json!({
                            "id": rule.identifier,
                            "shortDescription": { "text": rule.name },
                            "fullDescription": { "text": rule.name },
                            "help": { "text": how_to_fix, "markdown": how_to_fix },
                            "helpUri": help_url
                        })
                    });

                    results.push(json!({
                        "ruleId": rule.identifier,
                        "level": if occurrence.is_skipped { "note" } else { "error" },
                        "message": { "text": rule.message_on_failure },
                        "locations": [{
                            "physicalLocation": {
                                "artifactLocation": { "uri": file.file_name },
                                "region": {
                                    "startLine": location.line.max(1),
                                    "startColumn": location.column.max(1)
                                }
                            }
                        }]
                    }));
                }
            }
        }
    }

    json!({
        "version": "2.1.0",
        "$schema": "https://json.schemastore.org/sarif-2.1.0.json",
        "runs": [{
            "tool": {
                "driver": {
                    "name": TOOL_NAME,
                    "informationUri": TOOL_URI,
                    "semanticVersion": env!("CARGO_PKG_VERSION"),
                    "rules": rules.into_values().collect::<Vec<_>>()
                }
            },
            "results": results
        }]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_report;

    #[test]
    fn test_one_result_per_location() {
        let log = sarif_log(&sample_report().formatted_output());
        assert_eq!(log["version"], "2.1.0");

        let results = log["runs"][0]["results"].as_array().unwrap();
        assert_eq!(results.len(), 4);
        assert_eq!(results[0]["ruleId"], "CPU_LIMIT");
        assert_eq!(
            results[0]["locations"][0]["physicalLocation"]["artifactLocation"]["uri"],
            "deploy.yaml"
        );

        let rules = log["runs"][0]["tool"]["driver"]["rules"].as_array().unwrap();
        let ids: Vec<_> = rules.iter().map(|r| r["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["CPU_LIMIT", "IMAGE_TAG"]);
    }

    #[test]
    fn test_unknown_position_clamped() {
        let log = sarif_log(&sample_report().formatted_output());
        let region = &log["runs"][0]["results"][0]["locations"][0]["physicalLocation"]["region"];
        assert_eq!(region["startLine"], 1);
        assert_eq!(region["startColumn"], 1);
    }

    #[test]
    fn test_help_links_documentation_when_verbose() {
        let log = sarif_log(&sample_report().with_verbose(true).formatted_output());
        let rule = &log["runs"][0]["tool"]["driver"]["rules"][0];
        assert_eq!(rule["helpUri"], "https://docs.example/cpu");
    }
}
