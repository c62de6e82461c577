//! Template loaders: turning a render step into template text.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::trace;

use super::placeholder;
use crate::error::{Result, ViewError};
use crate::step::{Overrides, StepKind};

/// Resolves a render step to raw template text.
pub trait Loader: Send + Sync {
    /// Loads the template for `kind`, given the render's overrides.
    fn load(&self, kind: StepKind, overrides: &Overrides) -> Result<String>;

    /// The name this loader is registered under.
    fn name(&self) -> &str;
}

/// Loader that treats the override text as the template itself.
///
/// No lookup happens: `overrides["template"]` *is* the template for the
/// template step, and likewise for `element` and `layout`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimpleLoader;

impl SimpleLoader {
    pub fn new() -> Self {
        Self
    }
}

impl Loader for SimpleLoader {
    fn load(&self, kind: StepKind, overrides: &Overrides) -> Result<String> {
        overrides
            .step(kind)
            .map(str::to_string)
            .ok_or_else(|| ViewError::TemplateNotFound {
                step: kind.to_string(),
                name: format!("no inline text given for '{}'", kind),
            })
    }

    fn name(&self) -> &str {
        "Simple"
    }
}

/// Loader that reads templates from disk using path patterns.
///
/// Each step kind has an ordered list of patterns such as
/// `views/{:controller}/{:template}.html`. Patterns are expanded against the
/// overrides and the first one naming an existing file wins. Relative results
/// are resolved against the loader's root directory, if one is set.
///
/// ```rust,ignore
/// let loader = FileLoader::new()
///     .root("./app")
///     .path(StepKind::Template, "views/{:controller}/{:template}.html")
///     .path(StepKind::Layout, "layouts/{:layout}.html");
/// ```
#[derive(Debug, Clone, Default)]
pub struct FileLoader {
    root: Option<PathBuf>,
    paths: HashMap<StepKind, Vec<String>>,
}

impl FileLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the directory relative patterns are resolved against.
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Appends a path pattern for `kind`. Earlier patterns take priority.
    pub fn path(mut self, kind: StepKind, pattern: impl Into<String>) -> Self {
        self.paths.entry(kind).or_default().push(pattern.into());
        self
    }

    /// Patterns registered for `kind`, in priority order.
    pub fn patterns(&self, kind: StepKind) -> &[String] {
        self.paths.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Expands each pattern for `kind`, dropping those with unfilled placeholders.
    fn candidates(&self, kind: StepKind, overrides: &Overrides) -> Vec<PathBuf> {
        self.patterns(kind)
            .iter()
            .filter_map(|pattern| {
                let expanded =
                    placeholder::insert(pattern, |name| overrides.get(name).map(str::to_string));
                if !placeholder::placeholders(&expanded).is_empty() {
                    trace!(%kind, pattern = pattern.as_str(), "skipping pattern with unfilled placeholders");
                    return None;
                }
                Some(self.resolve(Path::new(&expanded)))
            })
            .collect()
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl Loader for FileLoader {
    fn load(&self, kind: StepKind, overrides: &Overrides) -> Result<String> {
        let candidates = self.candidates(kind, overrides);

        for candidate in &candidates {
            trace!(%kind, path = %candidate.display(), "checking template path");
            if candidate.is_file() {
                return Ok(std::fs::read_to_string(candidate)?);
            }
        }

        let tried = candidates
            .iter()
            .map(|path| path.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        Err(ViewError::TemplateNotFound {
            step: kind.to_string(),
            name: if tried.is_empty() {
                format!("no path pattern resolves for '{}'", kind)
            } else {
                format!("tried {}", tried)
            },
        })
    }

    fn name(&self) -> &str {
        "File"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_simple_loader_returns_override_text() {
        let overrides = Overrides::new().with("template", "Hello {:content}!");
        let text = SimpleLoader::new().load(StepKind::Template, &overrides).unwrap();
        assert_eq!(text, "Hello {:content}!");
    }

    #[test]
    fn test_simple_loader_missing_step() {
        let err = SimpleLoader::new()
            .load(StepKind::Layout, &Overrides::new())
            .unwrap_err();
        assert!(matches!(err, ViewError::TemplateNotFound { step, .. } if step == "layout"));
    }

    #[test]
    fn test_file_loader_expands_pattern() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("views/users")).unwrap();
        fs::write(dir.path().join("views/users/index.html"), "<h1>{:title}</h1>").unwrap();

        let loader = FileLoader::new()
            .root(dir.path())
            .path(StepKind::Template, "views/{:controller}/{:template}.html");
        let overrides = Overrides::new()
            .with("controller", "users")
            .with("template", "index");

        let text = loader.load(StepKind::Template, &overrides).unwrap();
        assert_eq!(text, "<h1>{:title}</h1>");
    }

    #[test]
    fn test_file_loader_falls_through_patterns() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("default.html"), "fallback").unwrap();

        let loader = FileLoader::new()
            .root(dir.path())
            .path(StepKind::Layout, "layouts/{:layout}.html")
            .path(StepKind::Layout, "{:layout}.html");
        let overrides = Overrides::new().with("layout", "default");

        assert_eq!(loader.load(StepKind::Layout, &overrides).unwrap(), "fallback");
    }

    #[test]
    fn test_file_loader_skips_unfilled_patterns() {
        let dir = TempDir::new().unwrap();
        let loader = FileLoader::new()
            .root(dir.path())
            .path(StepKind::Template, "{:template}.html");

        let err = loader.load(StepKind::Template, &Overrides::new()).unwrap_err();
        assert!(err.to_string().contains("no path pattern resolves"));
    }

    #[test]
    fn test_file_loader_reports_tried_paths() {
        let dir = TempDir::new().unwrap();
        let loader = FileLoader::new()
            .root(dir.path())
            .path(StepKind::Element, "{:element}.html");
        let overrides = Overrides::new().with("element", "nav");

        let err = loader.load(StepKind::Element, &overrides).unwrap_err();
        assert!(err.to_string().contains("nav.html"));
    }
}
