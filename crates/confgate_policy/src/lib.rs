//! # confgate_policy
//!
//! Policy and rule model for confgate.
//!
//! This crate provides:
//! - **Rules**: identified checks carrying an opaque JSON schema and display metadata
//! - **Rule Catalog**: the built-in rules shipped with the binary
//! - **Policy Documents**: policy-as-code files with custom rules and named policies
//!
//! ## Example
//!
//! ```rust,ignore
//! use confgate_policy::{Policy, PolicyDocument, RuleCatalog};
//! use std::path::Path;
//!
//! let catalog = RuleCatalog::builtin()?;
//! let document = PolicyDocument::from_file(Path::new("policies.yaml"))?;
//! document.validate(&catalog)?;
//!
//! let policy = document.resolve(Some("Production"), &catalog)?;
//! println!("{} enabled rules", policy.rules_count());
//! ```

pub mod error;
pub mod policy;
pub mod rules;

pub use error::{PolicyError, PolicyResult};
pub use policy::{
    CustomRule, Policy, PolicyDocument, PolicyEntry, PolicyRuleRef, BUILTIN_POLICY_NAME,
    POLICY_API_VERSION,
};
pub use rules::{Rule, RuleCatalog, RuleData, RuleDefinition};
