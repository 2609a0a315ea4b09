//! CLI command definitions.
//!
//! Each subcommand maps to one workflow: checking files against a policy,
//! validating a policy-as-code document, or listing the built-in rules.

use clap::{Parser, Subcommand};

pub mod rules;
pub mod test;
pub mod validate_policy;

/// confgate - policy checks for configuration files
#[derive(Parser, Debug)]
#[command(name = "confgate")]
#[command(version, about = "confgate - policy checks for configuration files")]
#[command(long_about = r#"
confgate evaluates Kubernetes manifests against a policy: a set of rules,
each a JSON schema plus a message. A configuration can waive a rule with an
annotation such as `confgate.skip/CONTAINERS_MISSING_CPU_LIMIT_KEY: "reason"`.

WORKFLOWS:
  test             → Check files against a policy
  validate-policy  → Validate a policy-as-code file
  rules            → List the built-in rules

SETTINGS:
  confgate.toml in the working directory, then CONFGATE_* environment
  variables, then flags.

EXIT CODES:
  0 - Success
  1 - Error
  2 - Rules failed or files were rejected
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check files against a policy
    Test(test::TestArgs),

    /// Validate a policy-as-code file
    #[command(name = "validate-policy")]
    ValidatePolicy(validate_policy::ValidatePolicyArgs),

    /// List the built-in rules
    Rules(rules::RulesArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_test_command() {
        let cli = Cli::try_parse_from([
            "confgate",
            "test",
            "manifests/*.yaml",
            "other.yaml",
            "--policy-name",
            "Strict",
            "--output",
            "json",
            "--only-k8s-files",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        let Commands::Test(args) = cli.command else {
            panic!("expected test command");
        };
        assert_eq!(args.patterns, vec!["manifests/*.yaml", "other.yaml"]);
        assert_eq!(args.policy_name.as_deref(), Some("Strict"));
        assert_eq!(args.output.as_deref(), Some("json"));
        assert!(args.only_k8s_files);
        assert!(!args.no_parallel);
    }

    #[test]
    fn test_test_requires_patterns() {
        assert!(Cli::try_parse_from(["confgate", "test"]).is_err());
    }

    #[test]
    fn test_parse_validate_policy() {
        let cli = Cli::try_parse_from(["confgate", "validate-policy", "policy.yaml"]).unwrap();
        assert!(matches!(cli.command, Commands::ValidatePolicy(_)));
    }
}
