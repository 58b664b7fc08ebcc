//! Restriction rules: which module trees may not import which.
//!
//! Rules are written as `tree:forbidden;forbidden,tree2:forbidden`. A module
//! is subject to every rule whose restricted tree contains it, so the
//! forbidden trees of `a` and of `a.b` both apply to `a.b.c`.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

use crate::error::ConfigFormatError;
use crate::tree::ModuleTree;

/// One restricted tree and the trees it must not import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rule {
    restricted: ModuleTree,
    forbidden: Vec<ModuleTree>,
}

impl Rule {
    /// Creates a rule. Repeated forbidden trees are kept once, in first-seen order.
    #[must_use]
    pub fn new(restricted: ModuleTree, forbidden: impl IntoIterator<Item = ModuleTree>) -> Self {
        let mut unique: Vec<ModuleTree> = Vec::new();
        for tree in forbidden {
            if !unique.contains(&tree) {
                unique.push(tree);
            }
        }
        Self {
            restricted,
            forbidden: unique,
        }
    }

    /// Parses a single `tree:forbidden;forbidden` entry.
    fn parse(segment: &str) -> Result<Self, ConfigFormatError> {
        let Some((tree, forbidden)) = segment.split_once(':') else {
            return Err(ConfigFormatError::MissingSeparator {
                segment: segment.to_owned(),
            });
        };
        if forbidden.contains(':') {
            return Err(ConfigFormatError::ExtraSeparator {
                segment: segment.to_owned(),
            });
        }

        let restricted = Self::parse_tree(tree, segment)?;
        let forbidden = forbidden
            .split(';')
            .map(|name| Self::parse_tree(name, segment))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(restricted, forbidden))
    }

    fn parse_tree(name: &str, segment: &str) -> Result<ModuleTree, ConfigFormatError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ConfigFormatError::EmptyTree {
                segment: segment.to_owned(),
            });
        }
        ModuleTree::parse(name)
    }

    /// The tree this rule restricts.
    #[must_use]
    pub fn restricted(&self) -> &ModuleTree {
        &self.restricted
    }

    /// Trees the restricted tree may not import.
    #[must_use]
    pub fn forbidden(&self) -> &[ModuleTree] {
        &self.forbidden
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.restricted)?;
        for (i, tree) in self.forbidden.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{tree}")?;
        }
        Ok(())
    }
}

/// The pair of trees responsible for a forbidden import.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RuleMatch {
    /// Restricted tree containing the importer.
    pub restricted: ModuleTree,
    /// Forbidden tree containing the imported module.
    pub forbidden: ModuleTree,
}

/// All configured rules, in configuration order.
///
/// Immutable once built; share it freely between threads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Parses a restriction specification.
    ///
    /// Whitespace around every token is trimmed, and blank entries between
    /// commas are skipped. Empty input yields an empty rule set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigFormatError`] if an entry lacks `:`, has more than one
    /// `:`, or names an empty or malformed tree.
    pub fn build(text: &str) -> Result<Self, ConfigFormatError> {
        let mut rules = Vec::new();
        for segment in text.split(',') {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            rules.push(Rule::parse(segment)?);
        }
        tracing::debug!("Built rule set with {} rule(s)", rules.len());
        Ok(Self { rules })
    }

    /// Builds a rule set from already-validated rules.
    #[must_use]
    pub fn from_rules(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Rules in configuration order.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True when no restriction is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Forbidden trees that apply to `module`: the union over every rule
    /// whose restricted tree is `module` or one of its dotted ancestors.
    #[must_use]
    pub fn forbidden_trees_for(&self, module: &str) -> BTreeSet<&ModuleTree> {
        self.applicable_to(module)
            .pairs
            .iter()
            .map(|(_, forbidden)| *forbidden)
            .collect()
    }

    /// Does `importer` violate a rule by importing `imported`?
    #[must_use]
    pub fn is_forbidden(&self, importer: &str, imported: &str) -> bool {
        self.find_match(importer, imported).is_some()
    }

    /// First rule pair (rule order, then forbidden order) that forbids the import.
    #[must_use]
    pub fn find_match(&self, importer: &str, imported: &str) -> Option<RuleMatch> {
        self.applicable_to(importer).find(imported)
    }

    /// Resolves the restrictions anchored at `module` once, for repeated lookups.
    #[must_use]
    pub fn applicable_to(&self, module: &str) -> Applicable<'_> {
        let pairs = self
            .rules
            .iter()
            .filter(|rule| rule.restricted.contains(module))
            .flat_map(|rule| rule.forbidden.iter().map(move |f| (&rule.restricted, f)))
            .collect();
        Applicable { pairs }
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, rule) in self.rules.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{rule}")?;
        }
        Ok(())
    }
}

/// Restrictions that apply to one importer.
#[derive(Debug, Clone)]
pub struct Applicable<'a> {
    pairs: Vec<(&'a ModuleTree, &'a ModuleTree)>,
}

impl Applicable<'_> {
    /// No rule restricts this importer.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// The first pair whose forbidden tree contains `imported`.
    #[must_use]
    pub fn find(&self, imported: &str) -> Option<RuleMatch> {
        self.pairs
            .iter()
            .find(|(_, forbidden)| forbidden.contains(imported))
            .map(|(restricted, forbidden)| RuleMatch {
                restricted: (*restricted).clone(),
                forbidden: (*forbidden).clone(),
            })
    }
}
