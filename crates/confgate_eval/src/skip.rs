//! Skip directives read from configuration annotations.

use std::collections::{BTreeMap, HashMap};

use serde_json::Value;
use tracing::warn;

/// Rule identifier to operator-supplied skip reason.
pub type SkipDirectives = HashMap<String, String>;

/// Extract skip directives from a configuration's annotations.
///
/// A key is a directive when it starts with `prefix`; the remainder of the key
/// is the rule identifier. Directives with non-string values are dropped.
pub fn extract_skip_annotations(annotations: &BTreeMap<String, Value>, prefix: &str) -> SkipDirectives {
    let mut directives = SkipDirectives::new();

    for (key, value) in annotations {
        let Some(rule_id) = key.strip_prefix(prefix) else {
            continue;
        };
        if rule_id.is_empty() {
            continue;
        }
        match value.as_str() {
            Some(message) => {
                directives.insert(rule_id.to_string(), message.to_string());
            }
            None => warn!("Ignoring skip annotation '{}': value is not a string", key),
        }
    }

    directives
}
