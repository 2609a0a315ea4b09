//! # confgate_report
//!
//! Turns a policy check into something a person or a pipeline can read.
//!
//! - [`RunReport`] bundles the check result with upstream validation failures
//! - [`FormattedOutput`] is the structured tree behind json, yaml and xml
//! - [`JUnitOutput`] and [`sarif_log`] target CI systems
//! - [`Printer`] renders the text report
//!
//! ## Example
//!
//! ```rust,ignore
//! use confgate_report::{render, OutputFormat, PlainPrinter, RunReport};
//!
//! let report = RunReport::new("Default", check, summary);
//! print!("{}", render(&report, OutputFormat::Json, &PlainPrinter)?);
//! ```

pub mod error;
pub mod format;
pub mod junit;
pub mod sarif;
pub mod structured;
pub mod text;

pub use error::{ReportError, ReportResult};
pub use format::{render, OutputFormat};
pub use junit::{JUnitOutput, TestCase, TestSuite, ALL_SKIPPED_MESSAGE};
pub use sarif::sarif_log;
pub use structured::{
    EvaluationSummary, FileResults, FormattedOutput, InvalidFile, PolicySummary, RuleResult, RunReport,
    ValidationStage, RULES_DOCUMENTATION_URL,
};
pub use text::{OccurrenceLine, PlainPrinter, Printer, RowStyle, SummaryRow, SummaryTable, Warning, WarningRule};
