//! Run settings.
//!
//! Sources, lowest precedence first: defaults, `confgate.toml` in the working
//! directory, environment variables, command-line flags. Environment variables
//! are read by clap together with the flags they back.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use confgate_eval::{EvaluatorConfig, DEFAULT_SKIP_PREFIX};
use confgate_report::OutputFormat;

pub const SETTINGS_FILE_NAME: &str = "confgate.toml";

/// Contents of `confgate.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileSettings {
    pub policy: Option<PathBuf>,
    pub policy_name: Option<String>,
    pub output: Option<String>,
    pub verbose: Option<bool>,
    pub parallel: Option<bool>,
    pub only_k8s_files: Option<bool>,
    pub skip_prefix: Option<String>,
}

impl FileSettings {
    /// Load `confgate.toml` from `dir`, or defaults when there is none.
    pub fn discover(dir: &Path) -> Result<Self> {
        let path = dir.join(SETTINGS_FILE_NAME);
        if !path.is_file() {
            return Ok(Self::default());
        }

        debug!("Loading settings from {:?}", path);
        let content = std::fs::read_to_string(&path).with_context(|| format!("Failed to read {:?}", path))?;
        Self::from_toml(&content).with_context(|| format!("Invalid settings file {:?}", path))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// Values given on the command line (or through their environment variables).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub policy: Option<PathBuf>,
    pub policy_name: Option<String>,
    pub output: Option<String>,
    pub verbose: bool,
    pub no_parallel: bool,
    pub only_k8s_files: bool,
}

/// Effective settings for a `test` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub policy: Option<PathBuf>,
    pub policy_name: Option<String>,
    pub output: OutputFormat,
    pub verbose: bool,
    pub parallel: bool,
    pub only_k8s_files: bool,
    pub skip_prefix: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            policy: None,
            policy_name: None,
            output: OutputFormat::Simple,
            verbose: false,
            parallel: true,
            only_k8s_files: false,
            skip_prefix: DEFAULT_SKIP_PREFIX.to_string(),
        }
    }
}

impl Settings {
    /// Layer the file settings and the overrides on top of the defaults.
    ///
    /// Boolean flags can only switch a behavior on; they never undo the file.
    pub fn resolve(file: FileSettings, overrides: Overrides) -> Result<Self> {
        let defaults = Self::default();

        let output = match overrides.output.or(file.output) {
            Some(name) => name
                .parse::<OutputFormat>()
                .with_context(|| format!("Invalid output format '{}'", name))?,
            None => defaults.output,
        };

        let skip_prefix = file.skip_prefix.unwrap_or(defaults.skip_prefix);
        if skip_prefix.is_empty() {
            return Err(anyhow::anyhow!("skip_prefix is empty"))
                .context("Invalid skip_prefix in settings file");
        }

        Ok(Self {
            policy: overrides.policy.or(file.policy),
            policy_name: overrides.policy_name.or(file.policy_name),
            output,
            verbose: overrides.verbose || file.verbose.unwrap_or(defaults.verbose),
            parallel: !overrides.no_parallel && file.parallel.unwrap_or(defaults.parallel),
            only_k8s_files: overrides.only_k8s_files || file.only_k8s_files.unwrap_or(defaults.only_k8s_files),
            skip_prefix,
        })
    }

    pub fn evaluator_config(&self) -> EvaluatorConfig {
        EvaluatorConfig::default()
            .with_skip_prefix(&self.skip_prefix)
            .with_parallel(self.parallel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        assert_eq!(FileSettings::discover(dir.path()).unwrap(), FileSettings::default());
    }

    #[test]
    fn test_discover_reads_toml() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE_NAME),
            "policy = \"policies/ci.yaml\"\npolicy_name = \"Strict\"\noutput = \"junit\"\nparallel = false\n",
        )
        .unwrap();

        let file = FileSettings::discover(dir.path()).unwrap();
        assert_eq!(file.policy, Some(PathBuf::from("policies/ci.yaml")));
        assert_eq!(file.policy_name.as_deref(), Some("Strict"));
        assert_eq!(file.parallel, Some(false));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE_NAME), "colour = true\n").unwrap();
        assert!(FileSettings::discover(dir.path()).is_err());
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::resolve(FileSettings::default(), Overrides::default()).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.evaluator_config(), EvaluatorConfig::default());
    }

    #[test]
    fn test_overrides_win_over_file() {
        let file = FileSettings {
            policy: Some("file.yaml".into()),
            policy_name: Some("FromFile".into()),
            output: Some("yaml".into()),
            skip_prefix: Some("acme.io/skip-".into()),
            ..Default::default()
        };
        let overrides = Overrides {
            policy_name: Some("FromFlag".into()),
            output: Some("SARIF".into()),
            no_parallel: true,
            ..Default::default()
        };

        let settings = Settings::resolve(file, overrides).unwrap();
        assert_eq!(settings.policy, Some(PathBuf::from("file.yaml")));
        assert_eq!(settings.policy_name.as_deref(), Some("FromFlag"));
        assert_eq!(settings.output, OutputFormat::Sarif);
        assert!(!settings.parallel);
        assert_eq!(settings.evaluator_config().skip_prefix, "acme.io/skip-");
    }

    #[test]
    fn test_invalid_output_format() {
        let overrides = Overrides {
            output: Some("csv".into()),
            ..Default::default()
        };
        assert!(Settings::resolve(FileSettings::default(), overrides).is_err());
    }

    #[test]
    fn test_empty_skip_prefix_rejected() {
        let file = FileSettings {
            skip_prefix: Some(String::new()),
            ..Default::default()
        };
        let err = Settings::resolve(file, Overrides::default()).unwrap_err();
        assert!(err.to_string().contains("skip_prefix"));
    }
}
