//! Shared output formatting for check results.

use anyhow::Result;

use crate::report::Report;
use crate::OutputFormat;

/// Print a report in the specified format.
pub fn print(report: &Report, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(report),
        OutputFormat::Json => return print_json(report),
        OutputFormat::Compact => print_compact(report),
    }
    Ok(())
}

fn print_text(report: &Report) {
    let (direct, transitive) = report.count_by_kind();

    for diagnostic in &report.diagnostics {
        println!(
            "{} {} at {}",
            diagnostic.code,
            diagnostic.symbol,
            diagnostic.position()
        );
        println!("  \x1b[31merror\x1b[0m: {}", diagnostic.message);
        if diagnostic.chain.len() > 2 {
            println!("  = chain: {}", diagnostic.chain.join(" -> "));
        }
        println!("  = rule: {}", diagnostic.rule);
        println!();
    }

    for failure in &report.failures {
        println!("{} while checking {}", failure.code, failure.module);
        println!("  \x1b[31merror\x1b[0m: {}", failure.message);
        println!();
    }

    let summary_color = if report.has_findings() {
        "\x1b[31m"
    } else {
        "\x1b[32m"
    };

    println!(
        "{}Found {} forbidden import(s) ({} direct, {} transitive), {} resolution error(s) in {} module(s)\x1b[0m",
        summary_color,
        direct + transitive,
        direct,
        transitive,
        report.failures.len(),
        report.modules_checked
    );
}

fn print_json(report: &Report) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{json}");
    Ok(())
}

fn print_compact(report: &Report) {
    for diagnostic in &report.diagnostics {
        println!(
            "{}: [{}] {}",
            diagnostic.position(),
            diagnostic.code,
            diagnostic.message,
        );
    }
    for failure in &report.failures {
        println!("{}: [{}] {}", failure.module, failure.code, failure.message);
    }
}
