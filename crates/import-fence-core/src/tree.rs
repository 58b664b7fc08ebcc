//! Dotted module trees and segment-aware prefix matching.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigFormatError;

/// A dotted module path (`a.b.c`) standing for that module and everything below it.
///
/// Matching is prefix-based on whole segments: `a.b` contains `a.b` and
/// `a.b.c`, but not `a.bc`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ModuleTree(String);

impl ModuleTree {
    /// Validates and wraps a dotted module path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigFormatError::InvalidTree`] if the name is empty, has an
    /// empty segment (`a..b`, `.a`, `a.`), or contains whitespace.
    pub fn parse(name: &str) -> Result<Self, ConfigFormatError> {
        let invalid = |reason| ConfigFormatError::InvalidTree {
            name: name.to_owned(),
            reason,
        };

        if name.is_empty() {
            return Err(invalid("name is empty"));
        }
        if name.chars().any(char::is_whitespace) {
            return Err(invalid("name contains whitespace"));
        }
        if name.split('.').any(str::is_empty) {
            return Err(invalid("name has an empty segment"));
        }
        Ok(Self(name.to_owned()))
    }

    /// The dotted path as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Is `module` this tree or one of its descendants?
    #[must_use]
    pub fn contains(&self, module: &str) -> bool {
        module
            .strip_prefix(self.0.as_str())
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
    }
}

impl fmt::Display for ModuleTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl FromStr for ModuleTree {
    type Err = ConfigFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for ModuleTree {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(name: &str) -> ModuleTree {
        ModuleTree::parse(name).unwrap()
    }

    #[test]
    fn contains_itself() {
        assert!(tree("a.b").contains("a.b"));
    }

    #[test]
    fn contains_descendants() {
        assert!(tree("a.b").contains("a.b.c"));
        assert!(tree("a").contains("a.b.c.d"));
    }

    #[test]
    fn no_false_prefix_match() {
        // "a.bc" shares a character prefix with "a.b" but not a segment prefix
        assert!(!tree("a.b").contains("a.bc"));
        assert!(!tree("flask").contains("flask_app"));
    }

    #[test]
    fn does_not_contain_ancestors() {
        assert!(!tree("a.b.c").contains("a.b"));
    }

    #[test]
    fn rejects_malformed_names() {
        for bad in ["", "a..b", ".a", "a.", "a b"] {
            assert!(
                matches!(
                    ModuleTree::parse(bad),
                    Err(ConfigFormatError::InvalidTree { .. })
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn display_round_trips_name() {
        assert_eq!(tree("pkg.sub").to_string(), "pkg.sub");
    }
}
