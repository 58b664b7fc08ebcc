//! Init command implementation.

use anyhow::{bail, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# import-fence configuration

[analyzer]
# Root directory to analyze (default: current directory)
# root = "./src"

# Glob patterns to exclude, relative to root
exclude = [
    "**/tests/**",
    "**/migrations/**",
]

# Forbidden imports
# `tree:forbidden;forbidden` entries separated by commas, or a list of entries.
# A rule for `a` also applies to `a.b`, `a.b.c`, ...

[forbidden-imports]
rules = [
    "myapp.domain:myapp.web;myapp.cli",
    # "flask_app:django",
]

# Also report forbidden modules reached through other imports
recurse = false
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    let config_path = Path::new("import-fence.toml");
    write_config(config_path, force)?;

    println!("Created import-fence.toml");
    println!("\nNext steps:");
    println!("  1. Edit [forbidden-imports] rules for your project");
    println!("  2. Run: import-fence check");

    Ok(())
}

fn write_config(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(config_path, DEFAULT_CONFIG)?;
    Ok(())
}
