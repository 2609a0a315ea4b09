//! Predicate evaluation seam.
//!
//! Rules carry an opaque schema. A [`PredicateCompiler`] turns a rule into a
//! [`Predicate`] once per run; the evaluator only ever sees [`CompiledRule`]s.

use jsonschema::JSONSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use confgate_policy::{Policy, Rule};

use crate::error::{EvalError, EvalResult};

/// A single predicate violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    /// JSON pointer into the evaluated document
    pub instance_location: String,
    /// JSON pointer into the rule schema
    #[serde(default)]
    pub schema_path: String,
    pub message: String,
}

impl Violation {
    pub fn new(instance_location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            instance_location: instance_location.into(),
            schema_path: String::new(),
            message: message.into(),
        }
    }

    pub fn with_schema_path(mut self, schema_path: impl Into<String>) -> Self {
        self.schema_path = schema_path.into();
        self
    }
}

/// Checks a document and reports every violation. An empty list is a pass.
pub trait Predicate: Send + Sync {
    fn evaluate(&self, document: &Value) -> EvalResult<Vec<Violation>>;
}

/// Builds predicates from rule schemas.
pub trait PredicateCompiler: Send + Sync {
    fn compile(&self, rule: &Rule) -> EvalResult<Box<dyn Predicate>>;
}

/// A rule paired with its own compiled predicate.
pub struct CompiledRule {
    pub rule: Rule,
    predicate: Box<dyn Predicate>,
}

impl std::fmt::Debug for CompiledRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledRule")
            .field("rule", &self.rule.identifier)
            .finish_non_exhaustive()
    }
}

impl CompiledRule {
    pub fn new(rule: Rule, predicate: Box<dyn Predicate>) -> Self {
        Self { rule, predicate }
    }

    pub fn compile(rule: &Rule, compiler: &dyn PredicateCompiler) -> EvalResult<Self> {
        let predicate = compiler.compile(rule)?;
        Ok(Self::new(rule.clone(), predicate))
    }

    /// Compile every rule of a policy, in policy order.
    pub fn compile_policy(policy: &Policy, compiler: &dyn PredicateCompiler) -> EvalResult<Vec<Self>> {
        let compiled = policy
            .rules
            .iter()
            .map(|rule| Self::compile(rule, compiler))
            .collect::<EvalResult<Vec<_>>>()?;
        debug!("Compiled {} rules for policy '{}'", compiled.len(), policy.name);
        Ok(compiled)
    }

    pub fn evaluate(&self, document: &Value) -> EvalResult<Vec<Violation>> {
        self.predicate.evaluate(document)
    }
}

/// Compiles rule schemas with the `jsonschema` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSchemaCompiler;

impl PredicateCompiler for JsonSchemaCompiler {
    fn compile(&self, rule: &Rule) -> EvalResult<Box<dyn Predicate>> {
        let schema = JSONSchema::options()
            .compile(&rule.schema)
            .map_err(|e| EvalError::invalid_schema(&rule.identifier, e.to_string()))?;
        Ok(Box::new(JsonSchemaPredicate { schema }))
    }
}

struct JsonSchemaPredicate {
    schema: JSONSchema,
}

impl Predicate for JsonSchemaPredicate {
    fn evaluate(&self, document: &Value) -> EvalResult<Vec<Violation>> {
        let violations = match self.schema.validate(document) {
            Ok(()) => Vec::new(),
            Err(errors) => errors
                .map(|error| {
                    Violation::new(error.instance_path.to_string(), error.to_string())
                        .with_schema_path(error.schema_path.to_string())
                })
                .collect(),
        };
        Ok(violations)
    }
}
