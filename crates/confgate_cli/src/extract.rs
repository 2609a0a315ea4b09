//! File discovery and configuration extraction.
//!
//! Each file goes through two stages before the policy check: YAML decoding,
//! then a minimal Kubernetes shape check (every document needs a `kind`).

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{debug, warn};

use confgate_eval::{Configuration, FileConfigurations};
use confgate_report::InvalidFile;

pub const MISSING_KIND_ERROR: &str = "missing 'kind' key";

/// Expand glob patterns into a sorted, duplicate-free file list.
///
/// A pattern without glob metacharacters is taken as a literal path.
pub fn expand_patterns(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = BTreeSet::new();

    for pattern in patterns {
        let mut matched = false;
        for entry in glob::glob(pattern).with_context(|| format!("Invalid pattern '{}'", pattern))? {
            match entry {
                Ok(path) if path.is_file() => {
                    matched = true;
                    paths.insert(path);
                }
                Ok(_) => {}
                Err(e) => warn!("Skipping unreadable path: {}", e),
            }
        }
        if !matched {
            warn!("No files matched '{}'", pattern);
        }
    }

    Ok(paths.into_iter().collect())
}

/// One decoded YAML document and the source text it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub value: Value,
    /// Document text, preceded by blank lines so line numbers match the file
    pub source: String,
}

/// Split a multi-document YAML stream on `---` separator lines.
///
/// Returns each chunk with the zero-based line it starts on.
pub fn split_documents(content: &str) -> Vec<(usize, String)> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut current = String::new();

    for (number, line) in content.lines().enumerate() {
        if line == "---" || line.starts_with("--- ") {
            chunks.push((start, std::mem::take(&mut current)));
            start = number + 1;
            continue;
        }
        current.push_str(line);
        current.push('\n');
    }
    chunks.push((start, current));
    chunks
}

/// Decode every document of a file. Empty documents are dropped.
pub fn parse_documents(content: &str) -> Result<Vec<Document>, String> {
    let mut documents = Vec::new();

    for (start, chunk) in split_documents(content) {
        if is_blank(&chunk) {
            continue;
        }
        let value: Value = serde_yaml::from_str(&chunk).map_err(|e| e.to_string())?;
        if value.is_null() {
            continue;
        }
        documents.push(Document {
            value,
            source: format!("{}{}", "\n".repeat(start), chunk),
        });
    }

    Ok(documents)
}

/// Kubernetes shape errors for a file's documents, empty when all are valid.
pub fn k8s_errors(documents: &[Document]) -> Vec<String> {
    documents
        .iter()
        .filter(|d| !d.value.get("kind").is_some_and(Value::is_string))
        .map(|_| MISSING_KIND_ERROR.to_string())
        .collect()
}

/// Files ready for the policy check plus the ones rejected on the way.
#[derive(Debug, Default)]
pub struct Extraction {
    pub files: Vec<FileConfigurations>,
    pub invalid_files: Vec<InvalidFile>,
    /// Files counted in the evaluation summary
    pub files_count: usize,
}

/// Read and validate every path.
///
/// With `only_k8s_files`, files failing the shape check are dropped
/// without being reported or counted.
pub fn extract(paths: &[PathBuf], only_k8s_files: bool) -> Result<Extraction> {
    let mut extraction = Extraction::default();

    for path in paths {
        let name = display_name(path);
        let content = std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;

        let documents = match parse_documents(&content) {
            Ok(documents) => documents,
            Err(error) => {
                debug!("{} failed YAML validation: {}", name, error);
                extraction.files_count += 1;
                extraction.invalid_files.push(InvalidFile::yaml(name, vec![error]));
                continue;
            }
        };

        let errors = k8s_errors(&documents);
        if !errors.is_empty() {
            if only_k8s_files {
                debug!("Ignoring non-K8s file {}", name);
                continue;
            }
            extraction.files_count += 1;
            extraction.invalid_files.push(InvalidFile::k8s(name, errors));
            continue;
        }

        extraction.files_count += 1;
        let configurations = documents
            .into_iter()
            .map(|d| Configuration::from_document(d.value, d.source))
            .collect();
        extraction.files.push(FileConfigurations::new(name, configurations));
    }

    Ok(extraction)
}

fn is_blank(chunk: &str) -> bool {
    chunk.lines().map(str::trim).all(|l| l.is_empty() || l.starts_with('#'))
}

fn display_name(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
