//! Error taxonomy for rule construction and import resolution.

use miette::Diagnostic;
use thiserror::Error;

use crate::provider::ProviderError;

/// Malformed restriction specification.
///
/// Raised by [`RuleSet::build`](crate::RuleSet::build) before any analysis runs.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ConfigFormatError {
    /// A rule entry has no `:` between the restricted tree and its forbidden trees.
    #[error("rule `{segment}` is missing the `:` between a module tree and its forbidden trees")]
    #[diagnostic(
        code(import_fence::config_format::missing_separator),
        help("write rules as `tree:forbidden;other,tree2:forbidden`")
    )]
    MissingSeparator {
        /// The offending rule entry.
        segment: String,
    },

    /// A rule entry has more than one `:`.
    #[error("rule `{segment}` contains more than one `:`")]
    #[diagnostic(
        code(import_fence::config_format::extra_separator),
        help("separate independent rules with `,` and forbidden trees with `;`")
    )]
    ExtraSeparator {
        /// The offending rule entry.
        segment: String,
    },

    /// A restricted or forbidden tree name is empty.
    #[error("rule `{segment}` contains an empty module tree name")]
    #[diagnostic(code(import_fence::config_format::empty_tree))]
    EmptyTree {
        /// The offending rule entry.
        segment: String,
    },

    /// A tree name is not a well-formed dotted module path.
    #[error("`{name}` is not a valid module tree: {reason}")]
    #[diagnostic(code(import_fence::config_format::invalid_tree))]
    InvalidTree {
        /// The rejected name.
        name: String,
        /// What is wrong with it.
        reason: &'static str,
    },
}

/// The import fact provider failed while a traversal was expanding `module`.
///
/// Aborts the traversal of the top-level module it belongs to, and only that one.
#[derive(Debug, Error, Diagnostic)]
#[error("failed to resolve imports of `{module}` (reached via {})", .chain.join(" -> "))]
#[diagnostic(
    code(import_fence::import_resolution),
    help("an unresolved module could hide a forbidden import; fix the module or exclude it")
)]
pub struct ImportResolutionError {
    /// Module whose imports could not be listed.
    pub module: String,
    /// Path from the analyzed module to `module`, both inclusive.
    pub chain: Vec<String>,
    /// Underlying provider failure.
    #[source]
    pub source: ProviderError,
}
