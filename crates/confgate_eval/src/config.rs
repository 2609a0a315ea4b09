//! Evaluator configuration.

/// Annotation key prefix that marks a skip directive.
pub const DEFAULT_SKIP_PREFIX: &str = "confgate.skip/";

/// Configuration for the policy evaluator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluatorConfig {
    /// Annotation prefix; the remainder of a matching key is a rule identifier
    pub skip_prefix: String,
    /// Evaluate files on the rayon thread pool
    pub parallel: bool,
    /// Resolve failure locations to source line/column
    pub resolve_locations: bool,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            skip_prefix: DEFAULT_SKIP_PREFIX.to_string(),
            parallel: true,
            resolve_locations: true,
        }
    }
}

impl EvaluatorConfig {
    /// Use a custom skip annotation prefix.
    pub fn with_skip_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.skip_prefix = prefix.into();
        self
    }

    /// Enable or disable parallel evaluation.
    pub fn with_parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    /// Enable or disable source position resolution.
    pub fn with_locations(mut self, enabled: bool) -> Self {
        self.resolve_locations = enabled;
        self
    }
}
