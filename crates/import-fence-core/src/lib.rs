//! # import-fence-core
//!
//! Import restriction engine: forbids a module tree from importing another
//! module tree, directly or through intermediate modules.
//!
//! - [`RuleSet`] parses `tree:forbidden;forbidden,...` specifications and
//!   answers dotted-prefix queries
//! - [`ImportFactProvider`] is the boundary through which import facts come in
//! - [`RestrictionEngine`] / [`evaluate`] walk the import graph with cycle
//!   and memoization guards and produce [`Violation`]s
//!
//! ## Example
//!
//! ```
//! use import_fence_core::{evaluate, EvaluateOptions, RuleSet, StaticImportGraph};
//!
//! let rules = RuleSet::build("flask_app:django")?;
//! let graph = StaticImportGraph::new()
//!     .with_imports("flask_app", ["flask", "common_utils"])
//!     .with_imports("common_utils", ["django"]);
//!
//! let violations = evaluate("flask_app", &rules, &graph, EvaluateOptions::transitive())?;
//! assert_eq!(violations[0].chain(), ["flask_app", "common_utils", "django"]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod engine;
mod error;
mod provider;
mod rule_set;
mod tree;

pub use engine::{evaluate, EvaluateOptions, PathKind, RestrictionEngine, Violation};
pub use error::{ConfigFormatError, ImportResolutionError};
pub use provider::{BoxError, ImportFactProvider, ProviderError, StaticImportGraph};
pub use rule_set::{Applicable, Rule, RuleMatch, RuleSet};
pub use tree::ModuleTree;
