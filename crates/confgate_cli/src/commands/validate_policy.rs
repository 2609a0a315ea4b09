//! Validate-policy command - Check a policy-as-code file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use confgate_policy::{PolicyDocument, RuleCatalog};

#[derive(Args, Debug)]
pub struct ValidatePolicyArgs {
    /// Policy file to validate
    path: PathBuf,
}

pub async fn execute(args: ValidatePolicyArgs) -> Result<()> {
    info!("Validating policy file {:?}", args.path);

    let catalog = RuleCatalog::builtin().context("Failed to load built-in rules")?;
    let document = PolicyDocument::from_file(&args.path)
        .with_context(|| format!("Failed to load policy file {:?}", args.path))?;
    document
        .validate(&catalog)
        .with_context(|| format!("Policy file {:?} is invalid", args.path))?;

    for entry in &document.policies {
        document
            .resolve(Some(&entry.name), &catalog)
            .with_context(|| format!("Failed to resolve policy '{}'", entry.name))?;
    }

    println!("Policy file {} is valid", args.path.display());
    if !document.custom_rules.is_empty() {
        println!("Custom rules: {}", document.custom_rules.len());
    }
    for entry in &document.policies {
        let default = if entry.is_default { " (default)" } else { "" };
        println!("  - {}{}: {} rules", entry.name, default, entry.rules.len());
    }

    Ok(())
}
