//! Python import extractor using Tree-sitter.
//!
//! Only top-level statements are inspected. Imports nested in functions,
//! classes, conditionals or `try` blocks are not listed.

use tree_sitter::{Language, Node, Parser};

use crate::extractor::{ExtractError, FileAnalysis, ImportInfo, ImportTarget};

/// Extracts top-level `import` and `from ... import` statements from Python source.
pub struct PythonExtractor {
    language: Language,
}

impl PythonExtractor {
    /// Creates a new Python extractor.
    #[must_use]
    pub fn new() -> Self {
        Self {
            language: tree_sitter_python::LANGUAGE.into(),
        }
    }

    /// File extensions this extractor handles.
    #[must_use]
    pub fn extensions(&self) -> &'static [&'static str] {
        &["py"]
    }

    /// Extracts import statements from source code.
    ///
    /// Syntax errors do not fail extraction: Tree-sitter recovers, and the
    /// statements it could still recognise are returned.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError`] if the grammar cannot be loaded or the parser
    /// produces no tree.
    pub fn analyze(&self, source: &str) -> Result<FileAnalysis, ExtractError> {
        let mut parser = Parser::new();
        parser.set_language(&self.language)?;

        let src = source.as_bytes();
        let tree = parser.parse(src, None).ok_or(ExtractError::NoTree)?;
        let root = tree.root_node();

        let mut result = FileAnalysis {
            has_syntax_errors: root.has_error(),
            ..FileAnalysis::default()
        };

        let mut cursor = root.walk();
        for node in root.children(&mut cursor) {
            let targets = match node.kind() {
                "import_statement" => Self::extract_import(&node, src),
                "import_from_statement" => Self::extract_from(&node, src).into_iter().collect(),
                _ => continue,
            };
            let position = node.start_position();
            result
                .imports
                .extend(targets.into_iter().map(|target| ImportInfo {
                    line: position.row + 1,
                    column: position.column,
                    target,
                }));
        }

        Ok(result)
    }

    fn text<'a>(node: &Node<'_>, src: &'a [u8]) -> &'a str {
        std::str::from_utf8(&src[node.start_byte()..node.end_byte()]).unwrap_or("")
    }

    /// Join identifier children of a `dotted_name` node with dots.
    fn dotted_name(node: &Node<'_>, src: &[u8]) -> String {
        let mut parts = Vec::new();
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() == "identifier" {
                parts.push(Self::text(&child, src));
            }
        }
        parts.join(".")
    }

    /// `a.b` or the `a.b` of `a.b as c`.
    fn imported_name(node: &Node<'_>, src: &[u8]) -> Option<String> {
        let name = match node.kind() {
            "dotted_name" => Self::dotted_name(node, src),
            "aliased_import" => Self::dotted_name(&node.child_by_field_name("name")?, src),
            _ => return None,
        };
        (!name.is_empty()).then_some(name)
    }

    fn names(node: &Node<'_>, src: &[u8]) -> Vec<String> {
        let mut cursor = node.walk();
        node.children_by_field_name("name", &mut cursor)
            .filter_map(|child| Self::imported_name(&child, src))
            .collect()
    }

    fn extract_import(node: &Node<'_>, src: &[u8]) -> Vec<ImportTarget> {
        Self::names(node, src)
            .into_iter()
            .map(ImportTarget::Module)
            .collect()
    }

    fn extract_from(node: &Node<'_>, src: &[u8]) -> Option<ImportTarget> {
        let module_node = node.child_by_field_name("module_name")?;

        let (level, module) = match module_node.kind() {
            "dotted_name" => (0, Some(Self::dotted_name(&module_node, src))),
            "relative_import" => {
                let mut level = 0;
                let mut module = None;
                let mut cursor = module_node.walk();
                for child in module_node.children(&mut cursor) {
                    match child.kind() {
                        "import_prefix" => {
                            level = Self::text(&child, src).matches('.').count();
                        }
                        "dotted_name" => module = Some(Self::dotted_name(&child, src)),
                        _ => {}
                    }
                }
                (level, module)
            }
            _ => return None,
        };

        Some(ImportTarget::From {
            level,
            module,
            names: Self::names(node, src),
        })
    }
}

impl Default for PythonExtractor {
    fn default() -> Self {
        Self::new()
    }
}
