//! # confgate_eval
//!
//! Policy evaluation and result aggregation for confgate.
//!
//! This crate provides:
//! - **Skip Directives**: per-configuration annotations that waive a rule
//! - **Rule Matching**: one compiled rule against one configuration
//! - **Aggregation**: per-file, per-rule failure records merged across configurations
//! - **Summary**: failed/skipped/passed counters and a sorted display view
//!
//! ## Example
//!
//! ```rust,ignore
//! use confgate_eval::{Evaluator, EvaluatorConfig, FileConfigurations};
//! use confgate_policy::{Policy, RuleCatalog};
//!
//! let policy = Policy::builtin(&RuleCatalog::builtin()?);
//! let evaluator = Evaluator::new(EvaluatorConfig::default());
//! let result = evaluator.evaluate(&policy, &files)?;
//!
//! if let Some(formatted) = &result.formatted {
//!     println!("{} rules failed", formatted.summary.total_failed_rules);
//! }
//! ```

pub mod aggregate;
pub mod config;
pub mod configuration;
pub mod error;
pub mod evaluator;
pub mod locate;
pub mod matcher;
pub mod mock;
pub mod predicate;
pub mod skip;
pub mod summary;

pub use aggregate::{FailedRule, FailedRulesByFiles, FailureLocation, Occurrence};
pub use config::{EvaluatorConfig, DEFAULT_SKIP_PREFIX};
pub use configuration::{Configuration, FileConfigurations};
pub use error::{EvalError, EvalResult};
pub use evaluator::{Evaluator, FileData, PolicyCheckResult};
pub use locate::{Position, PositionResolver, YamlPositionResolver};
pub use matcher::match_rule;
pub use mock::{StaticCompiler, StaticPredicate};
pub use predicate::{CompiledRule, JsonSchemaCompiler, Predicate, PredicateCompiler, Violation};
pub use skip::{extract_skip_annotations, SkipDirectives};
pub use summary::{summarize, EvaluationResults, EvaluationResultsSummary, RuleClassification, RuleView};
