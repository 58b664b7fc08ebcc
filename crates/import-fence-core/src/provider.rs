//! The import fact boundary.
//!
//! The engine never parses source. It asks an [`ImportFactProvider`] which
//! modules a given module imports, and treats every answer as final for the
//! duration of one traversal.

use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::sync::Arc;

/// Boxed underlying cause of a provider failure.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Supplies the direct imports of a module.
///
/// Implementations must be deterministic for a fixed source snapshot. A
/// module the provider knows nothing about (third-party, builtin) has no
/// imports: return an empty list, not an error.
pub trait ImportFactProvider {
    /// Modules directly imported by `module`, in source order.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if the module is known but its imports
    /// cannot be listed (unreadable or unparsable source).
    fn direct_imports_of(&self, module: &str) -> Result<Vec<String>, ProviderError>;
}

impl<T: ImportFactProvider + ?Sized> ImportFactProvider for &T {
    fn direct_imports_of(&self, module: &str) -> Result<Vec<String>, ProviderError> {
        (**self).direct_imports_of(module)
    }
}

impl<T: ImportFactProvider + ?Sized> ImportFactProvider for Box<T> {
    fn direct_imports_of(&self, module: &str) -> Result<Vec<String>, ProviderError> {
        (**self).direct_imports_of(module)
    }
}

impl<T: ImportFactProvider + ?Sized> ImportFactProvider for Arc<T> {
    fn direct_imports_of(&self, module: &str) -> Result<Vec<String>, ProviderError> {
        (**self).direct_imports_of(module)
    }
}

/// Failure of a provider to list a module's imports.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ProviderError {
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl ProviderError {
    /// Creates an error with a message only.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an error wrapping an underlying cause.
    #[must_use]
    pub fn with_source(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Human-readable description.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// An in-memory import graph.
///
/// Modules without an entry are leaves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticImportGraph {
    edges: BTreeMap<String, Vec<String>>,
}

impl StaticImportGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the imports of `module`.
    #[must_use]
    pub fn with_imports<I, S>(mut self, module: impl Into<String>, imports: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(module, imports);
        self
    }

    /// Adds (or replaces) the imports of `module`.
    pub fn insert<I, S>(&mut self, module: impl Into<String>, imports: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.edges
            .insert(module.into(), imports.into_iter().map(Into::into).collect());
    }

    /// Modules with an explicit entry, sorted.
    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.edges.keys().map(String::as_str)
    }
}

impl<M: Into<String>, S: Into<String>> FromIterator<(M, Vec<S>)> for StaticImportGraph {
    fn from_iter<T: IntoIterator<Item = (M, Vec<S>)>>(iter: T) -> Self {
        let mut graph = Self::new();
        for (module, imports) in iter {
            graph.insert(module, imports);
        }
        graph
    }
}

impl ImportFactProvider for StaticImportGraph {
    fn direct_imports_of(&self, module: &str) -> Result<Vec<String>, ProviderError> {
        Ok(self.edges.get(module).cloned().unwrap_or_default())
    }
}
