//! Output format selection and rendering.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::error::{ReportError, ReportResult};
use crate::junit::{to_indented_xml, JUnitOutput};
use crate::sarif::sarif_log;
use crate::structured::RunReport;
use crate::text::Printer;

/// Supported output encodings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Simple,
    Json,
    Yaml,
    Xml,
    JUnit,
    Sarif,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 6] = [
        Self::Simple,
        Self::Json,
        Self::Yaml,
        Self::Xml,
        Self::JUnit,
        Self::Sarif,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Xml => "xml",
            Self::JUnit => "junit",
            Self::Sarif => "sarif",
        }
    }

    /// Whether the output is meant for machines.
    pub fn is_structured(&self) -> bool {
        !matches!(self, Self::Simple)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "simple" => Ok(Self::Simple),
            "json" => Ok(Self::Json),
            "yaml" => Ok(Self::Yaml),
            "xml" => Ok(Self::Xml),
            "junit" => Ok(Self::JUnit),
            "sarif" => Ok(Self::Sarif),
            _ => Err(ReportError::UnknownFormat(s.to_string())),
        }
    }
}

/// Encode a run in the requested format.
///
/// `printer` is only consulted for [`OutputFormat::Simple`].
pub fn render(report: &RunReport, format: OutputFormat, printer: &dyn Printer) -> ReportResult<String> {
    debug!("Rendering report as {}", format);

    let rendered = match format {
        OutputFormat::Simple => report.text(printer),
        OutputFormat::Json => {
            let mut json = serde_json::to_string(&report.formatted_output())?;
            json.push('\n');
            json
        }
        OutputFormat::Yaml => serde_yaml::to_string(&report.formatted_output())?,
        OutputFormat::Xml => to_indented_xml(&report.formatted_output())?,
        OutputFormat::JUnit => JUnitOutput::from_report(report).to_xml()?,
        OutputFormat::Sarif => {
            let mut sarif = serde_json::to_string_pretty(&sarif_log(&report.formatted_output()))?;
            sarif.push('\n');
            sarif
        }
    };

    Ok(rendered)
}
