//! # import-fence-py
//!
//! Tree-sitter powered import facts for Python source trees.
//!
//! This crate feeds `import-fence-core` with what a Python project imports:
//!
//! - [`PythonExtractor`] lists top-level import statements of one file
//! - [`module_name_for`] / [`resolve_relative`] map files and relative
//!   imports to dotted module names
//! - [`PythonProject`] indexes a source tree and implements
//!   [`ImportFactProvider`](import_fence_core::ImportFactProvider)
//! - [`FenceConfig`] loads `[analyzer]` and `[forbidden-imports]` from TOML

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod extractor;
pub mod module_path;
pub mod project;
pub mod python;

pub use config::{ConfigError, FenceConfig, Wording};
pub use extractor::{FileAnalysis, ImportInfo, ImportTarget};
pub use module_path::{module_name_for, resolve_relative};
pub use project::{ImportSite, PythonProject};
pub use python::PythonExtractor;
