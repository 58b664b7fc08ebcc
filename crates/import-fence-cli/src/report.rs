//! Diagnostics built from engine violations.

use import_fence_core::{ImportResolutionError, PathKind, Violation};
use import_fence_py::{ImportSite, Wording};
use serde::Serialize;
use std::path::PathBuf;

/// Source location of a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    /// File path relative to project root.
    pub file: PathBuf,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
}

impl From<ImportSite> for Location {
    fn from(site: ImportSite) -> Self {
        Self {
            file: site.file,
            line: site.line,
            column: site.column,
        }
    }
}

/// A user-facing finding for one violation.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    /// Message code (`E6901` or `E6902`).
    pub code: &'static str,
    /// Message symbol (`forbidden-import`, `restricted-transitive-import`, ...).
    pub symbol: &'static str,
    /// Analyzed module.
    pub module: String,
    /// Import statement responsible, if it could be located.
    pub location: Option<Location>,
    /// Human-readable message.
    pub message: String,
    /// Rule that matched, as `restricted:forbidden`.
    pub rule: String,
    /// Modules from the analyzed module to the forbidden one.
    pub chain: Vec<String>,
}

impl Diagnostic {
    /// Builds the diagnostic for `violation`, located at `site`.
    #[must_use]
    pub fn from_violation(
        violation: &Violation,
        site: Option<ImportSite>,
        wording: Wording,
    ) -> Self {
        let forbidden = &violation.rule().forbidden;
        let adjective = wording.adjective();
        let (code, symbol, message) = match violation.kind() {
            PathKind::Direct => (
                "E6901",
                wording.direct_symbol(),
                format!(
                    "Not allowed to import {} here, {forbidden} is a {adjective} module",
                    violation.imported()
                ),
            ),
            PathKind::Transitive => (
                "E6902",
                wording.transitive_symbol(),
                format!(
                    "Importing {} causes {}, a {adjective} module, to be imported",
                    violation.via(),
                    violation.imported()
                ),
            ),
        };

        Self {
            code,
            symbol,
            module: violation.importer().to_owned(),
            location: site.map(Location::from),
            message,
            rule: format!("{}:{forbidden}", violation.rule().restricted),
            chain: violation.chain().to_vec(),
        }
    }

    /// `file:line:col`, or the module name when the statement was not found.
    #[must_use]
    pub fn position(&self) -> String {
        match &self.location {
            Some(loc) => format!("{}:{}:{}", loc.file.display(), loc.line, loc.column),
            None => self.module.clone(),
        }
    }
}

/// A module whose traversal was aborted by a resolution failure.
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionFailure {
    /// Diagnostic code of the error.
    pub code: String,
    /// Analyzed module whose check was aborted.
    pub module: String,
    /// Error message, including its causes.
    pub message: String,
    /// Path to the module that failed.
    pub chain: Vec<String>,
}

impl ResolutionFailure {
    /// Captures `err` raised while checking `module`.
    #[must_use]
    pub fn new(module: &str, err: &ImportResolutionError) -> Self {
        let code = miette::Diagnostic::code(err)
            .map(|c| c.to_string())
            .unwrap_or_default();
        let mut message = err.to_string();
        let mut cause = std::error::Error::source(err);
        while let Some(inner) = cause {
            message.push_str(": ");
            message.push_str(&inner.to_string());
            cause = inner.source();
        }
        Self {
            code,
            module: module.to_owned(),
            message,
            chain: err.chain.clone(),
        }
    }
}

/// Result of checking a project.
#[derive(Debug, Default, Serialize)]
pub struct Report {
    /// All violations found, in module order.
    pub diagnostics: Vec<Diagnostic>,
    /// Modules whose check could not complete.
    pub failures: Vec<ResolutionFailure>,
    /// Number of modules checked.
    pub modules_checked: usize,
}

impl Report {
    /// Creates a new empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the run should fail.
    #[must_use]
    pub fn has_findings(&self) -> bool {
        !self.diagnostics.is_empty() || !self.failures.is_empty()
    }

    /// Counts diagnostics per message code: (direct, transitive).
    #[must_use]
    pub fn count_by_kind(&self) -> (usize, usize) {
        let direct = self
            .diagnostics
            .iter()
            .filter(|d| d.code == "E6901")
            .count();
        (direct, self.diagnostics.len() - direct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use import_fence_core::{evaluate, EvaluateOptions, RuleSet, StaticImportGraph};

    fn violations(recurse: bool) -> Vec<Violation> {
        let rules = RuleSet::build("flask_app:django").unwrap();
        let graph = StaticImportGraph::new()
            .with_imports("flask_app", ["common_utils", "django.http"])
            .with_imports("common_utils", ["django"]);
        evaluate("flask_app", &rules, &graph, EvaluateOptions { recurse }).unwrap()
    }

    #[test]
    fn direct_violation_message() {
        let v = violations(false);
        let d = Diagnostic::from_violation(&v[0], None, Wording::Forbidden);
        assert_eq!(d.code, "E6901");
        assert_eq!(d.symbol, "forbidden-import");
        assert_eq!(
            d.message,
            "Not allowed to import django.http here, django is a forbidden module"
        );
        assert_eq!(d.rule, "flask_app:django");
    }

    #[test]
    fn transitive_violation_message() {
        let v = violations(true);
        let d = Diagnostic::from_violation(&v[0], None, Wording::Forbidden);
        assert_eq!(d.code, "E6902");
        assert_eq!(
            d.message,
            "Importing common_utils causes django, a forbidden module, to be imported"
        );
        assert_eq!(d.chain, ["flask_app", "common_utils", "django"]);
    }

    #[test]
    fn restricted_wording_changes_symbols_and_messages() {
        let direct = violations(false);
        let d = Diagnostic::from_violation(&direct[0], None, Wording::Restricted);
        assert_eq!(d.code, "E6901");
        assert_eq!(d.symbol, "restricted-import");
        assert_eq!(
            d.message,
            "Not allowed to import django.http here, django is a restricted module"
        );

        let transitive = violations(true);
        let d = Diagnostic::from_violation(&transitive[0], None, Wording::Restricted);
        assert_eq!(d.symbol, "restricted-transitive-import");
        assert_eq!(
            d.message,
            "Importing common_utils causes django, a restricted module, to be imported"
        );
    }

    #[test]
    fn position_falls_back_to_module() {
        let v = violations(false);
        assert_eq!(Diagnostic::from_violation(&v[0], None, Wording::Forbidden).position(), "flask_app");

        let site = ImportSite {
            file: PathBuf::from("flask_app/__init__.py"),
            line: 3,
            column: 1,
        };
        assert_eq!(
            Diagnostic::from_violation(&v[0], Some(site), Wording::Forbidden).position(),
            "flask_app/__init__.py:3:1"
        );
    }

    #[test]
    fn report_counts_kinds() {
        let mut report = Report::new();
        assert!(!report.has_findings());
        for v in &violations(true) {
            report.diagnostics.push(Diagnostic::from_violation(v, None, Wording::Forbidden));
        }
        assert_eq!(report.count_by_kind(), (1, 1));
        assert!(report.has_findings());
    }
}
