//! A Python source tree as an import fact provider.
//!
//! Files are indexed by module name up front and parsed lazily, at most
//! once each, the first time a traversal asks for their imports.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use glob::{MatchOptions, Pattern};
use import_fence_core::{ImportFactProvider, ProviderError};

use crate::extractor::{ExtractError, FileAnalysis, ImportInfo, ImportTarget};
use crate::module_path::{is_package_init, module_name_for, resolve_relative};
use crate::python::PythonExtractor;

/// Errors while discovering a project.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    /// Directory walk failed.
    #[error("failed to walk source tree: {0}")]
    Walk(#[from] ignore::Error),
    /// An exclude pattern is not a valid glob.
    #[error("invalid exclude pattern `{pattern}`: {source}")]
    Pattern {
        /// The rejected pattern.
        pattern: String,
        /// Glob error.
        source: glob::PatternError,
    },
}

/// Failure to load one module's source.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// File could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// IO error.
        source: std::io::Error,
    },
    /// Parser could not run.
    #[error("failed to parse {path}: {source}")]
    Extract {
        /// File that failed.
        path: PathBuf,
        /// Extraction error.
        source: ExtractError,
    },
}

/// Where an import statement sits in source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSite {
    /// File path relative to the project root.
    pub file: PathBuf,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
}

struct ModuleEntry {
    /// Path relative to the project root.
    path: PathBuf,
    is_package: bool,
    analysis: OnceLock<Result<FileAnalysis, Arc<LoadError>>>,
}

/// Indexed Python source tree.
pub struct PythonProject {
    root: PathBuf,
    modules: BTreeMap<String, ModuleEntry>,
    extractor: PythonExtractor,
}

impl PythonProject {
    /// Walks `root` (honouring `.gitignore`) and indexes every importable `.py` file.
    ///
    /// `exclude` holds glob patterns matched against paths relative to `root`.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectError`] if a pattern is invalid or the walk fails.
    pub fn discover(root: &Path, exclude: &[String]) -> Result<Self, ProjectError> {
        let patterns = exclude
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|source| ProjectError::Pattern {
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let options = MatchOptions {
            require_literal_separator: true,
            ..MatchOptions::default()
        };

        let extractor = PythonExtractor::new();
        let mut builder = ignore::WalkBuilder::new(root);
        builder.hidden(false).git_ignore(true);

        let mut files = Vec::new();
        for entry in builder.build() {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let is_python = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| extractor.extensions().contains(&ext));
            if !is_python {
                continue;
            }
            let rel = path.strip_prefix(root).unwrap_or(path);
            if patterns.iter().any(|p| p.matches_path_with(rel, options)) {
                tracing::debug!("Excluded {}", rel.display());
                continue;
            }
            files.push(path.to_path_buf());
        }
        files.sort();

        let mut project = Self {
            root: root.to_path_buf(),
            modules: BTreeMap::new(),
            extractor,
        };
        for file in &files {
            project.index(file);
        }

        tracing::info!(
            "Indexed {} module(s) under {}",
            project.modules.len(),
            root.display()
        );
        Ok(project)
    }

    fn index(&mut self, file: &Path) {
        let Some(name) = module_name_for(&self.root, file) else {
            tracing::debug!("Skipping non-importable file {}", file.display());
            return;
        };
        let entry = ModuleEntry {
            path: file.strip_prefix(&self.root).unwrap_or(file).to_path_buf(),
            is_package: is_package_init(file),
            analysis: OnceLock::new(),
        };
        match self.modules.entry(name) {
            Entry::Vacant(slot) => {
                slot.insert(entry);
            }
            // `pkg/__init__.py` shadows `pkg.py`, as it does for the interpreter.
            Entry::Occupied(mut slot) => {
                tracing::warn!(
                    "Module {} defined by both {} and {}",
                    slot.key(),
                    slot.get().path.display(),
                    entry.path.display()
                );
                if entry.is_package {
                    slot.insert(entry);
                }
            }
        }
    }

    /// Indexed module names, sorted.
    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    /// Number of indexed modules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// True if no module was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Is `module` part of this project?
    #[must_use]
    pub fn contains(&self, module: &str) -> bool {
        self.modules.contains_key(module)
    }

    /// Source file of `module`, relative to the root.
    #[must_use]
    pub fn module_path(&self, module: &str) -> Option<&Path> {
        self.modules.get(module).map(|e| e.path.as_path())
    }

    /// First statement in `importer` that imports `imported`.
    #[must_use]
    pub fn import_site(&self, importer: &str, imported: &str) -> Option<ImportSite> {
        let entry = self.modules.get(importer)?;
        let analysis = self.analysis(entry).as_ref().ok()?;
        analysis
            .imports
            .iter()
            .find(|info| self.resolve(importer, entry, info).iter().any(|m| m == imported))
            .map(|info| ImportSite {
                file: entry.path.clone(),
                line: info.line,
                column: info.column + 1,
            })
    }

    fn analysis<'a>(&self, entry: &'a ModuleEntry) -> &'a Result<FileAnalysis, Arc<LoadError>> {
        entry.analysis.get_or_init(|| {
            let path = self.root.join(&entry.path);
            tracing::debug!("Parsing {}", entry.path.display());
            let source = std::fs::read_to_string(&path).map_err(|source| {
                Arc::new(LoadError::Io {
                    path: path.clone(),
                    source,
                })
            })?;
            let analysis = self.extractor.analyze(&source).map_err(|source| {
                Arc::new(LoadError::Extract {
                    path: path.clone(),
                    source,
                })
            })?;
            if analysis.has_syntax_errors {
                tracing::warn!(
                    "Syntax errors in {}, imports may be incomplete",
                    entry.path.display()
                );
            }
            Ok(analysis)
        })
    }

    /// Module names one import statement brings in.
    fn resolve(&self, importer: &str, entry: &ModuleEntry, info: &ImportInfo) -> Vec<String> {
        match &info.target {
            ImportTarget::Module(name) => vec![name.clone()],
            ImportTarget::From {
                level,
                module,
                names,
            } => {
                let base = if *level == 0 {
                    module.clone()
                } else {
                    resolve_relative(importer, entry.is_package, *level, module.as_deref())
                };
                let Some(base) = base else {
                    tracing::debug!(
                        "{}:{}: relative import beyond top-level package",
                        entry.path.display(),
                        info.line
                    );
                    return Vec::new();
                };
                if names.is_empty() {
                    return vec![base];
                }
                // `from pkg import sub` imports the submodule when there is one
                names
                    .iter()
                    .map(|name| {
                        let candidate = format!("{base}.{name}");
                        if self.contains(&candidate) {
                            candidate
                        } else {
                            base.clone()
                        }
                    })
                    .collect()
            }
        }
    }
}

impl ImportFactProvider for PythonProject {
    fn direct_imports_of(&self, module: &str) -> Result<Vec<String>, ProviderError> {
        let Some(entry) = self.modules.get(module) else {
            return Ok(Vec::new());
        };
        let analysis = self.analysis(entry).as_ref().map_err(|err| {
            ProviderError::with_source(format!("cannot list imports of {module}"), Arc::clone(err))
        })?;

        let mut seen = HashSet::new();
        Ok(analysis
            .imports
            .iter()
            .flat_map(|info| self.resolve(module, entry, info))
            .filter(|name| seen.insert(name.clone()))
            .collect())
    }
}
