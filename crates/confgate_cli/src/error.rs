//! CLI error types.

use thiserror::Error;

/// The run completed but found something to report.
///
/// Carried through `anyhow` so `main` can map it to its own exit code.
#[derive(Error, Debug)]
#[error("{failed_rules} rule(s) failed, {invalid_files} file(s) rejected before the policy check")]
pub struct ViolationsFound {
    pub failed_rules: usize,
    pub invalid_files: usize,
}
