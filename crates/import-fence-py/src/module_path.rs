//! Mapping between files and dotted module names.

use std::path::{Component, Path};

/// Dotted module name of a Python file under `root`.
///
/// `pkg/sub/mod.py` is `pkg.sub.mod` and `pkg/__init__.py` is `pkg`.
/// Returns `None` for non-`.py` files, files outside `root`, a top-level
/// `__init__.py`, and paths with a segment that is not a Python identifier
/// (such files cannot be imported).
#[must_use]
pub fn module_name_for(root: &Path, file: &Path) -> Option<String> {
    let rel = file.strip_prefix(root).ok()?;
    if rel.extension()? != "py" {
        return None;
    }

    let stem = rel.with_extension("");
    let mut segments = Vec::new();
    for component in stem.components() {
        let Component::Normal(part) = component else {
            return None;
        };
        segments.push(part.to_str()?);
    }
    if segments.last() == Some(&"__init__") {
        segments.pop();
    }
    if segments.is_empty() || !segments.iter().all(|s| is_identifier(s)) {
        return None;
    }
    Some(segments.join("."))
}

/// Is `file` a package initializer?
#[must_use]
pub fn is_package_init(file: &Path) -> bool {
    file.file_stem().is_some_and(|stem| stem == "__init__")
}

/// Resolves the base of a relative import.
///
/// `importer` is the dotted name of the importing module; `is_package` tells
/// whether it is a package `__init__`. One dot is the importer's own package,
/// each further dot climbs one level. `module` is appended when present.
/// Returns `None` when the dots climb above the top-level package.
#[must_use]
pub fn resolve_relative(
    importer: &str,
    is_package: bool,
    level: usize,
    module: Option<&str>,
) -> Option<String> {
    let mut base: Vec<&str> = importer.split('.').collect();
    if !is_package {
        base.pop();
    }
    for _ in 1..level {
        base.pop()?;
    }
    if base.is_empty() {
        return None;
    }
    if let Some(module) = module {
        base.push(module);
    }
    Some(base.join("."))
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c == '_' || c.is_alphabetic())
        && chars.all(|c| c == '_' || c.is_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(rel: &str) -> Option<String> {
        module_name_for(Path::new("/src"), &Path::new("/src").join(rel))
    }

    #[test]
    fn names_plain_module() {
        assert_eq!(name("pkg/sub/mod.py").as_deref(), Some("pkg.sub.mod"));
        assert_eq!(name("flask_app.py").as_deref(), Some("flask_app"));
    }

    #[test]
    fn names_package_init() {
        assert_eq!(name("pkg/sub/__init__.py").as_deref(), Some("pkg.sub"));
    }

    #[test]
    fn rejects_non_importable_paths() {
        assert_eq!(name("__init__.py"), None);
        assert_eq!(name("my-scripts/run.py"), None);
        assert_eq!(name("pkg/mod.pyi"), None);
        assert_eq!(name("README.md"), None);
        assert_eq!(
            module_name_for(Path::new("/src"), Path::new("/other/mod.py")),
            None
        );
    }

    #[test]
    fn detects_package_init() {
        assert!(is_package_init(Path::new("a/b/__init__.py")));
        assert!(!is_package_init(Path::new("a/b/mod.py")));
    }

    #[test]
    fn single_dot_is_own_package() {
        assert_eq!(
            resolve_relative("app.views.home", false, 1, None).as_deref(),
            Some("app.views")
        );
        assert_eq!(
            resolve_relative("app.views", true, 1, Some("home")).as_deref(),
            Some("app.views.home")
        );
    }

    #[test]
    fn extra_dots_climb() {
        assert_eq!(
            resolve_relative("app.views.home", false, 2, Some("core.utils")).as_deref(),
            Some("app.core.utils")
        );
    }

    #[test]
    fn climbing_above_top_level_fails() {
        assert_eq!(resolve_relative("app.views", false, 2, Some("x")), None);
        assert_eq!(resolve_relative("script", false, 1, Some("x")), None);
    }
}
