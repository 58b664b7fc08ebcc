//! Show-rules command implementation.

use anyhow::{Context, Result};

use crate::config_resolver::ConfigSource;

/// Runs the show-rules command.
pub fn run(source: &ConfigSource) -> Result<()> {
    let config = source.load()?;
    let rules = config
        .rule_set()
        .context("Invalid forbidden-imports configuration")?;

    match source.path() {
        Some(p) => println!("Rules from {}:\n", p.display()),
        None => println!("No configuration file found.\n"),
    }

    if rules.is_empty() {
        println!("No forbidden imports configured.");
        return Ok(());
    }

    println!("{:<30} Forbidden trees", "Restricted tree");
    println!("{}", "-".repeat(80));

    for rule in rules.rules() {
        let forbidden: Vec<&str> = rule.forbidden().iter().map(|t| t.as_str()).collect();
        println!("{:<30} {}", rule.restricted(), forbidden.join(", "));
    }

    println!(
        "\nMode: {}",
        if config.recurse {
            "transitive (recurse = true)"
        } else {
            "direct (recurse = false)"
        }
    );
    println!("Normalized: {rules}");

    Ok(())
}
