//! Language-agnostic extraction types.
//!
//! An extractor turns raw source text into a [`FileAnalysis`]: the import
//! statements of one file, in source order, not yet resolved to modules.

/// What an import statement names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportTarget {
    /// `import a.b.c` or `import a.b.c as d`.
    Module(String),
    /// `from [.]*module import names`.
    From {
        /// Number of leading dots; `0` for absolute imports.
        level: usize,
        /// Module after the dots, if any (`from . import x` has none).
        module: Option<String>,
        /// Imported names; empty for `import *`.
        names: Vec<String>,
    },
}

/// A single import statement extracted from source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportInfo {
    /// Line number (1-indexed).
    pub line: usize,
    /// Column (0-indexed byte offset within line).
    pub column: usize,
    /// What the statement imports.
    pub target: ImportTarget,
}

/// Result of analyzing a single source file.
#[derive(Debug, Clone, Default)]
pub struct FileAnalysis {
    /// Top-level import statements, in source order.
    pub imports: Vec<ImportInfo>,
    /// The parser recovered from syntax errors somewhere in the file.
    pub has_syntax_errors: bool,
}

/// Failure to run the parser at all (syntax errors are not failures).
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// Grammar incompatible with the linked tree-sitter runtime.
    #[error("failed to load grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),
    /// The parser returned no tree.
    #[error("parser produced no syntax tree")]
    NoTree,
}
