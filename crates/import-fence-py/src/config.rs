//! TOML configuration for import restrictions.
//!
//! ```toml
//! [analyzer]
//! root = "."
//! exclude = ["**/tests/**"]
//!
//! [forbidden-imports]
//! rules = "flask_app:django,core:web;cli"
//! recurse = true
//! ```
//!
//! `rules` may also be a list of `tree:forbidden;forbidden` strings, and the
//! section may be spelled `[restricted-imports]`, in which case diagnostics
//! speak of restricted rather than forbidden modules.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use import_fence_core::{ConfigFormatError, EvaluateOptions, RuleSet};

/// Top-level import-fence configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenceConfig {
    /// Project root directory.
    pub root: PathBuf,

    /// Glob patterns to exclude, relative to `root`.
    pub exclude: Vec<String>,

    /// Restriction specification, `tree:forbidden;forbidden,...`.
    pub rules: String,

    /// Check imports transitively.
    pub recurse: bool,

    /// Vocabulary used in diagnostics, picked by the section name.
    pub wording: Wording,
}

/// How diagnostics name the modules a rule keeps out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Wording {
    /// `[forbidden-imports]`: "a forbidden module", `forbidden-import`.
    #[default]
    Forbidden,
    /// `[restricted-imports]`: "a restricted module", `restricted-import`.
    Restricted,
}

impl Wording {
    /// Adjective used in messages.
    #[must_use]
    pub fn adjective(self) -> &'static str {
        match self {
            Self::Forbidden => "forbidden",
            Self::Restricted => "restricted",
        }
    }

    /// Message symbol for a direct import.
    #[must_use]
    pub fn direct_symbol(self) -> &'static str {
        match self {
            Self::Forbidden => "forbidden-import",
            Self::Restricted => "restricted-import",
        }
    }

    /// Message symbol for a transitive import.
    #[must_use]
    pub fn transitive_symbol(self) -> &'static str {
        match self {
            Self::Forbidden => "forbidden-transitive-import",
            Self::Restricted => "restricted-transitive-import",
        }
    }
}

impl Default for FenceConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            exclude: Vec::new(),
            rules: String::new(),
            recurse: false,
            wording: Wording::default(),
        }
    }
}

/// `rules` as a single string or as a list of entries.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RulesValue {
    Text(String),
    List(Vec<String>),
}

impl Default for RulesValue {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl RulesValue {
    fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::List(entries) => entries.join(","),
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

/// Errors when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read config file.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// IO error.
        source: std::io::Error,
    },
    /// Failed to parse TOML.
    #[error("invalid config: {message}")]
    Parse {
        /// Parse error detail.
        message: String,
    },
    /// The restriction specification is malformed.
    #[error("invalid forbidden-imports rules: {0}")]
    Rules(#[from] ConfigFormatError),
}

impl FenceConfig {
    /// Load from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parse from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns error if TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        #[derive(Deserialize)]
        struct RawConfig {
            #[serde(default)]
            analyzer: AnalyzerSection,
            #[serde(rename = "forbidden-imports")]
            forbidden_imports: Option<RestrictionSection>,
            #[serde(rename = "restricted-imports")]
            restricted_imports: Option<RestrictionSection>,
        }

        #[derive(Deserialize)]
        struct AnalyzerSection {
            #[serde(default = "default_root")]
            root: PathBuf,
            #[serde(default)]
            exclude: Vec<String>,
        }

        impl Default for AnalyzerSection {
            fn default() -> Self {
                Self {
                    root: default_root(),
                    exclude: Vec::new(),
                }
            }
        }

        #[derive(Deserialize, Default)]
        struct RestrictionSection {
            #[serde(default)]
            rules: RulesValue,
            #[serde(default)]
            recurse: bool,
        }

        let raw: RawConfig = toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;

        let (section, wording) = match (raw.forbidden_imports, raw.restricted_imports) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::Parse {
                    message: "use either [forbidden-imports] or [restricted-imports], not both"
                        .to_owned(),
                })
            }
            (Some(section), None) => (section, Wording::Forbidden),
            (None, Some(section)) => (section, Wording::Restricted),
            (None, None) => (RestrictionSection::default(), Wording::Forbidden),
        };

        Ok(Self {
            root: raw.analyzer.root,
            exclude: raw.analyzer.exclude,
            rules: section.rules.into_text(),
            recurse: section.recurse,
            wording,
        })
    }

    /// Build the rule set described by `rules`.
    ///
    /// # Errors
    ///
    /// Returns error if the restriction specification is malformed.
    pub fn rule_set(&self) -> Result<RuleSet, ConfigError> {
        Ok(RuleSet::build(&self.rules)?)
    }

    /// Engine options derived from `recurse`.
    #[must_use]
    pub fn evaluate_options(&self) -> EvaluateOptions {
        EvaluateOptions {
            recurse: self.recurse,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let toml = r#"
[forbidden-imports]
rules = "flask_app:django"
"#;
        let config = FenceConfig::parse(toml).expect("parse failed");
        assert_eq!(config.rules, "flask_app:django");
        assert!(!config.recurse);
        assert_eq!(config.root, PathBuf::from("."));
        assert_eq!(config.rule_set().unwrap().len(), 1);
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[analyzer]
root = "./src"
exclude = ["**/tests/**"]

[forbidden-imports]
rules = ["flask_app:django", "core:web;cli"]
recurse = true
"#;
        let config = FenceConfig::parse(toml).expect("parse failed");
        assert_eq!(config.root, PathBuf::from("./src"));
        assert_eq!(config.exclude, ["**/tests/**"]);
        assert_eq!(config.rules, "flask_app:django,core:web;cli");
        assert!(config.evaluate_options().recurse);
        assert_eq!(config.rule_set().unwrap().len(), 2);
    }

    #[test]
    fn missing_analyzer_section_roots_at_current_dir() {
        let config = FenceConfig::parse("[forbidden-imports]\nrules = \"a:b\"\n").unwrap();
        assert_eq!(config.root, PathBuf::from("."));
        assert!(config.exclude.is_empty());

        let config = FenceConfig::parse("[analyzer]\nexclude = [\"x/**\"]\n").unwrap();
        assert_eq!(config.root, PathBuf::from("."));
    }

    #[test]
    fn accepts_restricted_imports_alias() {
        let toml = r#"
[restricted-imports]
rules = "a:b"
recurse = true
"#;
        let config = FenceConfig::parse(toml).expect("parse failed");
        assert_eq!(config.rules, "a:b");
        assert!(config.recurse);
        assert_eq!(config.wording, Wording::Restricted);
        assert_eq!(config.wording.direct_symbol(), "restricted-import");
    }

    #[test]
    fn forbidden_section_uses_forbidden_wording() {
        let config = FenceConfig::parse("[forbidden-imports]\nrules = \"a:b\"\n").unwrap();
        assert_eq!(config.wording, Wording::Forbidden);
        assert_eq!(config.wording.adjective(), "forbidden");
    }

    #[test]
    fn both_section_spellings_are_rejected() {
        let toml = "[forbidden-imports]\nrules = \"a:b\"\n[restricted-imports]\nrules = \"c:d\"\n";
        assert!(matches!(
            FenceConfig::parse(toml),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn empty_config_has_no_rules() {
        let config = FenceConfig::parse("").expect("parse failed");
        assert_eq!(config, FenceConfig::default());
        assert!(config.rule_set().unwrap().is_empty());
    }

    #[test]
    fn malformed_rules_are_rejected() {
        let config = FenceConfig::parse("[forbidden-imports]\nrules = \"nocolon\"\n").unwrap();
        let err = config.rule_set().unwrap_err();
        assert!(matches!(err, ConfigError::Rules(_)));
        assert!(err.to_string().contains("nocolon"));
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        assert!(matches!(
            FenceConfig::parse("[forbidden-imports\n"),
            Err(ConfigError::Parse { .. })
        ));
    }
}
