//! Static predicates for testing.
//!
//! Provides a [`PredicateCompiler`] whose predicates return canned violations
//! instead of evaluating schemas, so evaluation can be tested without writing
//! real rule schemas.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::Value;

use confgate_policy::Rule;

use crate::error::{EvalError, EvalResult};
use crate::predicate::{Predicate, PredicateCompiler, Violation};

/// Predefined behaviour for one rule.
#[derive(Debug, Clone)]
enum Canned {
    Violations {
        violations: Vec<Violation>,
        kind: Option<String>,
    },
    Failure(String),
}

/// Predicate returning fixed violations.
#[derive(Debug, Clone)]
pub struct StaticPredicate {
    rule_id: String,
    canned: Option<Canned>,
    calls: Arc<AtomicUsize>,
}

impl Predicate for StaticPredicate {
    fn evaluate(&self, document: &Value) -> EvalResult<Vec<Violation>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.canned {
            None => Ok(Vec::new()),
            Some(Canned::Failure(message)) => Err(EvalError::predicate(&self.rule_id, message)),
            Some(Canned::Violations { violations, kind }) => {
                let applies = match kind {
                    Some(kind) => document.get("kind").and_then(Value::as_str) == Some(kind.as_str()),
                    None => true,
                };
                Ok(if applies { violations.clone() } else { Vec::new() })
            }
        }
    }
}

/// Compiler handing out [`StaticPredicate`]s.
///
/// Rules without canned behaviour always pass.
#[derive(Debug, Clone, Default)]
pub struct StaticCompiler {
    canned: HashMap<String, Canned>,
    /// Number of predicate evaluations across all compiled rules.
    calls: Arc<AtomicUsize>,
}

impl StaticCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `rule_id` report `violations` for every document.
    pub fn violating(mut self, rule_id: impl Into<String>, violations: Vec<Violation>) -> Self {
        self.canned.insert(
            rule_id.into(),
            Canned::Violations {
                violations,
                kind: None,
            },
        );
        self
    }

    /// Make `rule_id` report `violations` only for documents of `kind`.
    pub fn violating_kind(
        mut self,
        rule_id: impl Into<String>,
        kind: impl Into<String>,
        violations: Vec<Violation>,
    ) -> Self {
        self.canned.insert(
            rule_id.into(),
            Canned::Violations {
                violations,
                kind: Some(kind.into()),
            },
        );
        self
    }

    /// Make evaluating `rule_id` fail.
    pub fn failing(mut self, rule_id: impl Into<String>, message: impl Into<String>) -> Self {
        self.canned.insert(rule_id.into(), Canned::Failure(message.into()));
        self
    }

    /// Get the number of predicate evaluations made.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PredicateCompiler for StaticCompiler {
    fn compile(&self, rule: &Rule) -> EvalResult<Box<dyn Predicate>> {
        Ok(Box::new(StaticPredicate {
            rule_id: rule.identifier.clone(),
            canned: self.canned.get(&rule.identifier).cloned(),
            calls: Arc::clone(&self.calls),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_filter() {
        let compiler = StaticCompiler::new().violating_kind("R", "Service", vec![Violation::new("", "x")]);
        let predicate = compiler.compile(&Rule::new("R", "R", json!({}))).unwrap();

        assert!(predicate.evaluate(&json!({"kind": "Pod"})).unwrap().is_empty());
        assert_eq!(predicate.evaluate(&json!({"kind": "Service"})).unwrap().len(), 1);
        assert_eq!(compiler.call_count(), 2);
    }

    #[test]
    fn test_unknown_rule_passes() {
        let compiler = StaticCompiler::new().failing("OTHER", "boom");
        let predicate = compiler.compile(&Rule::new("R", "R", json!({}))).unwrap();
        assert!(predicate.evaluate(&json!({})).unwrap().is_empty());
    }
}
