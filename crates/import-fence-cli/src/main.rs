//! import-fence CLI tool.
//!
//! Usage:
//! ```bash
//! import-fence check [OPTIONS] [PATH]
//! import-fence show-rules
//! import-fence init
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;
mod report;

use commands::check::CheckOptions;

/// Forbids Python packages from importing configured module trees
#[derive(Parser)]
#[command(name = "import-fence")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a project for forbidden imports
    Check {
        /// Path to analyze (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Restriction specification, replacing the configured one
        /// (e.g. "flask_app:django,core:web;cli")
        #[arg(long)]
        rules: Option<String>,

        /// Also report forbidden modules imported through other modules
        #[arg(long, overrides_with = "no_recurse")]
        recurse: bool,

        /// Only report forbidden modules imported directly
        #[arg(long, overrides_with = "recurse")]
        no_recurse: bool,

        /// Exclude patterns (can be specified multiple times)
        #[arg(short, long)]
        exclude: Vec<String>,
    },

    /// Show the configured restrictions
    ShowRules {
        /// Project directory used to locate the configuration
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Output format for check results.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-violation compact format.
    Compact,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check {
            path,
            format,
            rules,
            recurse,
            no_recurse,
            exclude,
        } => {
            let source = config_resolver::resolve(&path, cli.config.as_deref());
            let options = CheckOptions {
                format,
                rules,
                recurse: recurse_override(recurse, no_recurse),
                exclude,
            };
            commands::check::run(&path, &options, &source)
        }
        Commands::ShowRules { path } => {
            let source = config_resolver::resolve(&path, cli.config.as_deref());
            commands::show_rules::run(&source)
        }
        Commands::Init { force } => commands::init::run(force),
    }
}

/// `--recurse` / `--no-recurse` as an override of the configured flag.
fn recurse_override(recurse: bool, no_recurse: bool) -> Option<bool> {
    match (recurse, no_recurse) {
        (true, _) => Some(true),
        (false, true) => Some(false),
        (false, false) => None,
    }
}
