//! Check command implementation.

use anyhow::{Context, Result};
use import_fence_core::RestrictionEngine;
use import_fence_py::PythonProject;
use std::path::Path;

use crate::config_resolver::ConfigSource;
use crate::report::{Diagnostic, Report, ResolutionFailure};
use crate::OutputFormat;

/// Command-line overrides for the check command.
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// Output format.
    pub format: OutputFormat,
    /// Replaces the configured restriction specification.
    pub rules: Option<String>,
    /// Replaces the configured `recurse` flag.
    pub recurse: Option<bool>,
    /// Added to the configured exclude patterns.
    pub exclude: Vec<String>,
}

/// Runs the check command.
pub fn run(path: &Path, options: &CheckOptions, source: &ConfigSource) -> Result<()> {
    let report = collect(path, options, source)?;

    super::output::print(&report, options.format)?;

    if report.has_findings() {
        std::process::exit(1);
    }

    Ok(())
}

/// Checks every module under `path` and gathers the findings.
pub fn collect(path: &Path, options: &CheckOptions, source: &ConfigSource) -> Result<Report> {
    let mut config = source.load()?;
    if let Some(rules) = &options.rules {
        config.rules.clone_from(rules);
    }
    if let Some(recurse) = options.recurse {
        config.recurse = recurse;
    }
    config.exclude.extend(options.exclude.iter().cloned());

    // Malformed rules abort before anything is parsed.
    let rules = config
        .rule_set()
        .context("Invalid forbidden-imports configuration")?;
    if rules.is_empty() {
        tracing::warn!("No forbidden-imports rules configured, nothing to check");
    }

    let root = if config.root.is_absolute() {
        config.root.clone()
    } else {
        path.join(&config.root)
    };

    let project = PythonProject::discover(&root, &config.exclude)
        .with_context(|| format!("Failed to index {}", root.display()))?;

    tracing::info!(
        "Checking {} module(s) against {} rule(s)",
        project.len(),
        rules.len()
    );

    let engine = RestrictionEngine::new(&rules, config.evaluate_options());
    let mut report = Report::new();

    for module in project.modules() {
        match engine.evaluate(module, &project) {
            Ok(violations) => {
                report.diagnostics.extend(violations.iter().map(|v| {
                    Diagnostic::from_violation(
                        v,
                        project.import_site(module, v.via()),
                        config.wording,
                    )
                }));
            }
            Err(err) => {
                tracing::error!("{err}");
                report.failures.push(ResolutionFailure::new(module, &err));
            }
        }
        report.modules_checked += 1;
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn flask_project(config: &str) -> TempDir {
        let tmp = TempDir::new().unwrap();
        write(
            tmp.path(),
            "flask_app/__init__.py",
            "import flask\nimport common_utils\n",
        );
        write(tmp.path(), "common_utils/__init__.py", "import django\n");
        write(tmp.path(), "import-fence.toml", config);
        tmp
    }

    fn source(tmp: &TempDir) -> ConfigSource {
        ConfigSource::Project(tmp.path().join("import-fence.toml"))
    }

    #[test]
    fn reports_transitive_violation_with_location() {
        let tmp = flask_project("[forbidden-imports]\nrules = \"flask_app:django\"\nrecurse = true\n");
        let report = collect(tmp.path(), &CheckOptions::default(), &source(&tmp)).unwrap();

        assert_eq!(report.modules_checked, 2);
        assert_eq!(report.diagnostics.len(), 1);
        let d = &report.diagnostics[0];
        assert_eq!(d.code, "E6902");
        assert_eq!(d.position(), "flask_app/__init__.py:2:1");
        assert!(report.failures.is_empty());
    }

    #[test]
    fn cli_overrides_replace_config() {
        let tmp = flask_project("[forbidden-imports]\nrules = \"flask_app:django\"\nrecurse = true\n");
        let options = CheckOptions {
            recurse: Some(false),
            ..CheckOptions::default()
        };
        let report = collect(tmp.path(), &options, &source(&tmp)).unwrap();
        assert!(!report.has_findings());

        let options = CheckOptions {
            rules: Some("flask_app:flask".into()),
            ..CheckOptions::default()
        };
        let report = collect(tmp.path(), &options, &source(&tmp)).unwrap();
        assert_eq!(report.diagnostics[0].code, "E6901");
    }

    #[test]
    fn malformed_rules_abort_before_analysis() {
        let tmp = flask_project("[forbidden-imports]\nrules = \"flask_app\"\n");
        let err = collect(tmp.path(), &CheckOptions::default(), &source(&tmp)).unwrap_err();
        assert!(format!("{err:#}").contains("missing the `:`"));
    }

    #[test]
    fn default_config_finds_nothing() {
        let tmp = flask_project("");
        let report = collect(tmp.path(), &CheckOptions::default(), &ConfigSource::Default).unwrap();
        assert!(!report.has_findings());
        assert_eq!(report.modules_checked, 2);
    }

    #[test]
    fn resolution_failure_aborts_only_its_own_module() {
        let tmp = flask_project(
            "[forbidden-imports]\nrules = \"flask_app:django,broken:django\"\nrecurse = true\n",
        );
        // not valid UTF-8, so the source cannot be read
        fs::write(tmp.path().join("broken.py"), b"import os\n\xff\xfe\n").unwrap();

        let report = collect(tmp.path(), &CheckOptions::default(), &source(&tmp)).unwrap();

        assert_eq!(report.modules_checked, 3);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].module, "broken");
        assert_eq!(report.failures[0].code, "import_fence::import_resolution");
        assert_eq!(report.failures[0].chain, ["broken"]);
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].module, "flask_app");
        assert!(report.has_findings());
    }

    #[test]
    fn restricted_section_reports_restricted_symbols() {
        let tmp = flask_project("[restricted-imports]\nrules = \"flask_app:flask\"\n");
        let report = collect(tmp.path(), &CheckOptions::default(), &source(&tmp)).unwrap();
        assert_eq!(report.diagnostics[0].symbol, "restricted-import");
        assert!(report.diagnostics[0].message.ends_with("flask is a restricted module"));
    }

    #[test]
    fn exclude_override_skips_modules() {
        let tmp = flask_project("[forbidden-imports]\nrules = \"flask_app:flask\"\n");
        let options = CheckOptions {
            exclude: vec!["flask_app/**".into()],
            ..CheckOptions::default()
        };
        let report = collect(tmp.path(), &options, &source(&tmp)).unwrap();
        assert_eq!(report.modules_checked, 1);
        assert!(!report.has_findings());
    }
}
