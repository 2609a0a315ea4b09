//! Matches one compiled rule against one configuration.

use tracing::debug;

use crate::aggregate::{FailedRule, FailureLocation, Occurrence};
use crate::configuration::Configuration;
use crate::error::EvalResult;
use crate::locate::PositionResolver;
use crate::predicate::CompiledRule;
use crate::skip::SkipDirectives;

/// Evaluate `rule` against `configuration`.
///
/// Returns `None` when the rule passes and is not skipped. A skip directive
/// always produces a skipped occurrence, whether or not the predicate failed.
pub fn match_rule(
    rule: &CompiledRule,
    configuration: &Configuration,
    skips: &SkipDirectives,
    resolver: Option<&dyn PositionResolver>,
) -> EvalResult<Option<FailedRule>> {
    let violations = rule.evaluate(&configuration.payload)?;
    let skip = skips.get(&rule.rule.identifier);

    if violations.is_empty() && skip.is_none() {
        return Ok(None);
    }

    if let Some(message) = skip {
        debug!(
            "Rule {} skipped for {} ({}): {}",
            rule.rule.identifier, configuration.metadata_name, configuration.kind, message
        );
    }

    let failure_locations = violations
        .iter()
        .map(|violation| {
            let position = resolver
                .map(|r| r.locate(&violation.instance_location, &configuration.source))
                .unwrap_or_default();
            FailureLocation {
                schema_path: violation.instance_location.clone(),
                line: position.line,
                column: position.column,
            }
        })
        .collect();

    let occurrence = Occurrence {
        metadata_name: configuration.metadata_name.clone(),
        kind: configuration.kind.clone(),
        occurrences: violations.len(),
        is_skipped: skip.is_some(),
        skip_message: skip.cloned().unwrap_or_default(),
        failure_locations,
    };

    Ok(Some(FailedRule {
        name: rule.rule.name.clone(),
        documentation_url: rule.rule.documentation_url.clone(),
        message_on_failure: rule.rule.message_on_failure.clone(),
        configurations: vec![occurrence],
    }))
}
