//! Configurations extracted from input files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One resource document extracted from a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    pub kind: String,
    pub metadata_name: String,
    /// Raw `metadata.annotations`; values are not guaranteed to be strings.
    #[serde(default)]
    pub annotations: BTreeMap<String, Value>,
    pub payload: Value,
    /// Source text of the document, used to locate failures.
    #[serde(default)]
    pub source: String,
}

impl Configuration {
    /// Build a configuration from a decoded document and its source text.
    pub fn from_document(payload: Value, source: impl Into<String>) -> Self {
        let kind = payload
            .get("kind")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let metadata = payload.get("metadata");
        let metadata_name = metadata
            .and_then(|m| m.get("name"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let annotations = metadata
            .and_then(|m| m.get("annotations"))
            .and_then(Value::as_object)
            .map(|map| map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default();

        Self {
            kind,
            metadata_name,
            annotations,
            payload,
            source: source.into(),
        }
    }
}

/// A file and the configurations it contains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileConfigurations {
    pub file_name: String,
    pub configurations: Vec<Configuration>,
}

impl FileConfigurations {
    pub fn new(file_name: impl Into<String>, configurations: Vec<Configuration>) -> Self {
        Self {
            file_name: file_name.into(),
            configurations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_document() {
        let doc = json!({
            "apiVersion": "v1",
            "kind": "Pod",
            "metadata": {
                "name": "web",
                "annotations": {"confgate.skip/RULE": "ok", "replicas": 3}
            }
        });
        let configuration = Configuration::from_document(doc, "kind: Pod\n");
        assert_eq!(configuration.kind, "Pod");
        assert_eq!(configuration.metadata_name, "web");
        assert_eq!(configuration.annotations.len(), 2);
        assert_eq!(configuration.annotations["replicas"], json!(3));
    }

    #[test]
    fn test_from_document_without_metadata() {
        let configuration = Configuration::from_document(json!({"kind": 5}), "");
        assert!(configuration.kind.is_empty());
        assert!(configuration.metadata_name.is_empty());
        assert!(configuration.annotations.is_empty());
    }
}
