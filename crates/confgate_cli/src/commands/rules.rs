//! Rules command - List the built-in rule catalog.

use anyhow::{Context, Result};
use clap::Args;

use confgate_policy::RuleCatalog;

#[derive(Args, Debug)]
pub struct RulesArgs {
    /// Only list rules enabled in the built-in policy
    #[arg(long)]
    enabled: bool,

    /// Print the catalog as JSON
    #[arg(long)]
    json: bool,
}

pub async fn execute(args: RulesArgs) -> Result<()> {
    let catalog = RuleCatalog::builtin().context("Failed to load built-in rules")?;

    let rules: Vec<_> = catalog
        .rules
        .iter()
        .filter(|r| !args.enabled || r.enabled_by_default)
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rules)?);
        return Ok(());
    }

    let width = rules.iter().map(|r| r.unique_name.len()).max().unwrap_or(0);
    for rule in rules {
        let marker = if rule.enabled_by_default { "[on] " } else { "[off]" };
        println!("{} {:<width$}  {}", marker, rule.unique_name, rule.name);
    }

    Ok(())
}
