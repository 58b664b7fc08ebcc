//! Restriction engine.
//!
//! Evaluates one top-level module at a time against a [`RuleSet`], pulling
//! import facts from an [`ImportFactProvider`] as the traversal reaches new
//! modules. Direct and transitive checking share a single depth-first walk
//! that differs only in how deep it may expand.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::vec;

use crate::error::ImportResolutionError;
use crate::provider::ImportFactProvider;
use crate::rule_set::{Applicable, RuleMatch, RuleSet};

/// How far the engine follows imports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct EvaluateOptions {
    /// Follow imports of imported modules, not only the analyzed module's own.
    pub recurse: bool,
}

impl EvaluateOptions {
    /// Only the analyzed module's own imports are checked.
    #[must_use]
    pub fn direct() -> Self {
        Self { recurse: false }
    }

    /// Everything reachable from the analyzed module is checked.
    #[must_use]
    pub fn transitive() -> Self {
        Self { recurse: true }
    }

    /// Maximum number of expanded levels; `None` is unbounded.
    fn depth_limit(self) -> Option<usize> {
        if self.recurse {
            None
        } else {
            Some(1)
        }
    }
}

/// Whether a violation was found among the analyzed module's own imports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PathKind {
    /// The analyzed module imports the forbidden module itself.
    Direct,
    /// The forbidden module is reached through one or more intermediate modules.
    Transitive,
}

impl fmt::Display for PathKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct => write!(f, "direct"),
            Self::Transitive => write!(f, "transitive"),
        }
    }
}

/// A forbidden import reachable from an analyzed module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Violation {
    importer: String,
    imported: String,
    rule: RuleMatch,
    kind: PathKind,
    chain: Vec<String>,
}

impl Violation {
    fn new(rule: RuleMatch, chain: Vec<String>) -> Self {
        let kind = if chain.len() > 2 {
            PathKind::Transitive
        } else {
            PathKind::Direct
        };
        Self {
            importer: chain.first().cloned().unwrap_or_default(),
            imported: chain.last().cloned().unwrap_or_default(),
            rule,
            kind,
            chain,
        }
    }

    /// The analyzed module.
    #[must_use]
    pub fn importer(&self) -> &str {
        &self.importer
    }

    /// The forbidden module that was reached.
    #[must_use]
    pub fn imported(&self) -> &str {
        &self.imported
    }

    /// Restricted and forbidden trees that matched.
    #[must_use]
    pub fn rule(&self) -> &RuleMatch {
        &self.rule
    }

    /// Direct or transitive.
    #[must_use]
    pub fn kind(&self) -> PathKind {
        self.kind
    }

    /// Modules from the importer to the forbidden module, both inclusive.
    #[must_use]
    pub fn chain(&self) -> &[String] {
        &self.chain
    }

    /// The analyzed module's own import that leads to the forbidden module.
    ///
    /// Equal to [`imported`](Self::imported) for direct violations.
    #[must_use]
    pub fn via(&self) -> &str {
        self.chain.get(1).map_or(self.imported.as_str(), String::as_str)
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} import of {} by {} ({}:{}) via {}",
            self.kind,
            self.imported,
            self.importer,
            self.rule.restricted,
            self.rule.forbidden,
            self.chain.join(" -> ")
        )
    }
}

/// Checks analyzed modules against a shared rule set.
#[derive(Debug, Clone, Copy)]
pub struct RestrictionEngine<'r> {
    rules: &'r RuleSet,
    options: EvaluateOptions,
}

impl<'r> RestrictionEngine<'r> {
    /// Creates an engine over `rules`.
    #[must_use]
    pub fn new(rules: &'r RuleSet, options: EvaluateOptions) -> Self {
        Self { rules, options }
    }

    /// The options this engine was created with.
    #[must_use]
    pub fn options(&self) -> EvaluateOptions {
        self.options
    }

    /// Finds every forbidden import reachable from `module`.
    ///
    /// Violations come out in provider order, depth-first, left to right.
    /// Each call owns its visit state, so calls for different modules are
    /// independent and may run concurrently.
    ///
    /// # Errors
    ///
    /// Returns [`ImportResolutionError`] if the provider fails for any module
    /// the traversal needs to expand.
    pub fn evaluate<P>(
        &self,
        module: &str,
        provider: &P,
    ) -> Result<Vec<Violation>, ImportResolutionError>
    where
        P: ImportFactProvider + ?Sized,
    {
        let applicable = self.rules.applicable_to(module);
        if applicable.is_empty() {
            tracing::debug!("No restriction applies to {module}, skipping");
            return Ok(Vec::new());
        }

        tracing::debug!(
            "Evaluating {module} ({})",
            if self.options.recurse {
                "transitive"
            } else {
                "direct"
            }
        );

        let violations = Traversal {
            applicable,
            provider,
            depth_limit: self.options.depth_limit(),
            states: HashMap::new(),
            imports: HashMap::new(),
            violations: Vec::new(),
        }
        .run(module)?;

        tracing::debug!("{module}: {} violation(s)", violations.len());
        Ok(violations)
    }
}

/// Checks one module. Shorthand for [`RestrictionEngine::evaluate`].
///
/// # Errors
///
/// Returns [`ImportResolutionError`] if the provider fails during traversal.
pub fn evaluate<P>(
    module: &str,
    rules: &RuleSet,
    provider: &P,
    options: EvaluateOptions,
) -> Result<Vec<Violation>, ImportResolutionError>
where
    P: ImportFactProvider + ?Sized,
{
    RestrictionEngine::new(rules, options).evaluate(module, provider)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    InProgress,
    ResolvedClean,
    ResolvedViolating,
}

/// A module being expanded, with the imports still to look at.
struct Frame {
    module: String,
    pending: vec::IntoIter<String>,
    violating: bool,
}

/// State of a single top-level evaluation. Dropped when it finishes.
struct Traversal<'a, P: ?Sized> {
    applicable: Applicable<'a>,
    provider: &'a P,
    depth_limit: Option<usize>,
    states: HashMap<String, VisitState>,
    /// Deduplicated provider answers, so re-walks never query twice.
    imports: HashMap<String, Vec<String>>,
    violations: Vec<Violation>,
}

impl<P: ImportFactProvider + ?Sized> Traversal<'_, P> {
    fn run(mut self, root: &str) -> Result<Vec<Violation>, ImportResolutionError> {
        let root_chain = vec![root.to_owned()];
        let mut stack = vec![self.expand(root, &root_chain)?];

        loop {
            let Some(frame) = stack.last_mut() else {
                break;
            };

            let Some(import) = frame.pending.next() else {
                self.finish(&mut stack);
                continue;
            };

            // Always anchored at the analyzed module, never at `frame.module`.
            if let Some(rule) = self.applicable.find(&import) {
                frame.violating = true;
                let chain = chain_to(&stack, &import);
                tracing::debug!("Forbidden import reached: {}", chain.join(" -> "));
                self.violations.push(Violation::new(rule, chain));
                continue;
            }

            match self.states.get(&import) {
                Some(VisitState::InProgress) => {
                    tracing::trace!("Import cycle through {import}, not descending");
                    continue;
                }
                Some(VisitState::ResolvedClean) => continue,
                // Walked again so this path gets its own violations.
                Some(VisitState::ResolvedViolating) => {
                    tracing::trace!("Re-walking {import} along a new path");
                }
                None => {}
            }

            if self.depth_limit.is_some_and(|limit| stack.len() >= limit) {
                continue;
            }

            let chain = chain_to(&stack, &import);
            stack.push(self.expand(&import, &chain)?);
        }

        Ok(self.violations)
    }

    /// Fetches the imports of `module` and marks it in progress.
    ///
    /// The provider is queried only the first time a module is expanded;
    /// later expansions read the cached answer.
    fn expand(&mut self, module: &str, chain: &[String]) -> Result<Frame, ImportResolutionError> {
        let imports = if let Some(cached) = self.imports.get(module) {
            cached.clone()
        } else {
            let fetched = self
                .provider
                .direct_imports_of(module)
                .map_err(|source| ImportResolutionError {
                    module: module.to_owned(),
                    chain: chain.to_vec(),
                    source,
                })?;

            let mut seen = HashSet::new();
            let fetched: Vec<String> = fetched
                .into_iter()
                .filter(|import| seen.insert(import.clone()))
                .collect();
            self.imports.insert(module.to_owned(), fetched.clone());
            fetched
        };

        self.states
            .insert(module.to_owned(), VisitState::InProgress);
        Ok(Frame {
            module: module.to_owned(),
            pending: imports.into_iter(),
            violating: false,
        })
    }

    /// Pops an exhausted frame and records its outcome.
    fn finish(&mut self, stack: &mut Vec<Frame>) {
        let Some(done) = stack.pop() else {
            return;
        };
        let state = if done.violating {
            if let Some(parent) = stack.last_mut() {
                parent.violating = true;
            }
            VisitState::ResolvedViolating
        } else {
            VisitState::ResolvedClean
        };
        self.states.insert(done.module, state);
    }
}

fn chain_to(stack: &[Frame], import: &str) -> Vec<String> {
    stack
        .iter()
        .map(|frame| frame.module.clone())
        .chain(std::iter::once(import.to_owned()))
        .collect()
}
