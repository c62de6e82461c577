//! Named loader and renderer strategies.
//!
//! Views can name their strategies (`"Simple"`, `"File"`, `"Jinja"`) instead of
//! passing instances. [`StrategyRegistry`] maps those names to factories and
//! builds the strategy once, when the view is constructed. An unknown name is
//! a [`ViewError::NotFound`]:
//!
//! ```rust
//! use stepview::{StrategyRegistry, ViewSettings};
//!
//! let registry = StrategyRegistry::new();
//! let err = registry.loader("Badness", &ViewSettings::default()).err().unwrap();
//! assert_eq!(
//!     err.to_string(),
//!     "Class 'Badness' of type 'adapter.template.view' not found."
//! );
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::config::ViewSettings;
use crate::error::{Result, ViewError};
use crate::template::{FileLoader, JinjaRenderer, Loader, Renderer, SimpleLoader, SimpleRenderer};

/// Builds a loader from view settings.
pub type LoaderFactory = Arc<dyn Fn(&ViewSettings) -> Result<Arc<dyn Loader>> + Send + Sync>;

/// Builds a renderer from view settings.
pub type RendererFactory = Arc<dyn Fn(&ViewSettings) -> Result<Arc<dyn Renderer>> + Send + Sync>;

static BUILTIN: Lazy<StrategyRegistry> = Lazy::new(StrategyRegistry::new);

/// Name → factory tables for loaders and renderers.
#[derive(Clone, Default)]
pub struct StrategyRegistry {
    loaders: HashMap<String, LoaderFactory>,
    renderers: HashMap<String, RendererFactory>,
}

impl StrategyRegistry {
    /// Creates a registry holding the built-in strategies.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register_loader("Simple", |_| Ok(Arc::new(SimpleLoader::new())));
        registry.register_loader("File", |settings| Ok(Arc::new(file_loader(settings))));
        registry.register_renderer("Simple", |_| Ok(Arc::new(SimpleRenderer::new())));
        registry.register_renderer("Jinja", |_| Ok(Arc::new(JinjaRenderer::new())));
        registry
    }

    /// Creates a registry with no strategies at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The shared registry of built-in strategies.
    pub fn builtin() -> &'static StrategyRegistry {
        &BUILTIN
    }

    /// Registers a loader factory, replacing any existing one of that name.
    pub fn register_loader<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&ViewSettings) -> Result<Arc<dyn Loader>> + Send + Sync + 'static,
    {
        self.loaders.insert(name.into(), Arc::new(factory));
    }

    /// Registers a renderer factory, replacing any existing one of that name.
    pub fn register_renderer<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&ViewSettings) -> Result<Arc<dyn Renderer>> + Send + Sync + 'static,
    {
        self.renderers.insert(name.into(), Arc::new(factory));
    }

    /// Builds the loader registered as `name`.
    pub fn loader(&self, name: &str, settings: &ViewSettings) -> Result<Arc<dyn Loader>> {
        let factory = self
            .loaders
            .get(name)
            .ok_or_else(|| ViewError::not_found(name))?;
        factory(settings)
    }

    /// Builds the renderer registered as `name`.
    pub fn renderer(&self, name: &str, settings: &ViewSettings) -> Result<Arc<dyn Renderer>> {
        let factory = self
            .renderers
            .get(name)
            .ok_or_else(|| ViewError::not_found(name))?;
        factory(settings)
    }

    pub fn has_loader(&self, name: &str) -> bool {
        self.loaders.contains_key(name)
    }

    pub fn has_renderer(&self, name: &str) -> bool {
        self.renderers.contains_key(name)
    }

    fn names<V>(map: &HashMap<String, V>) -> Vec<&str> {
        let mut names: Vec<&str> = map.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("loaders", &Self::names(&self.loaders))
            .field("renderers", &Self::names(&self.renderers))
            .finish()
    }
}

fn file_loader(settings: &ViewSettings) -> FileLoader {
    let mut loader = FileLoader::new();
    if let Some(root) = &settings.root {
        loader = loader.root(root);
    }
    for (kind, patterns) in &settings.paths {
        for pattern in patterns {
            loader = loader.path(*kind, pattern.clone());
        }
    }
    loader
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::{Overrides, StepKind};

    #[test]
    fn test_builtins_are_registered() {
        let registry = StrategyRegistry::builtin();
        assert!(registry.has_loader("Simple"));
        assert!(registry.has_loader("File"));
        assert!(registry.has_renderer("Simple"));
        assert!(registry.has_renderer("Jinja"));
        assert!(!registry.has_renderer("File"));
    }

    #[test]
    fn test_unknown_renderer_names_class() {
        let err = StrategyRegistry::new()
            .renderer("Badness", &ViewSettings::default())
            .err()
            .unwrap();
        assert!(matches!(&err, ViewError::NotFound { name, .. } if name == "Badness"));
        assert!(err.to_string().contains("adapter.template.view"));
    }

    #[test]
    fn test_custom_loader() {
        struct Fixed;
        impl Loader for Fixed {
            fn load(&self, _kind: StepKind, _overrides: &Overrides) -> Result<String> {
                Ok("fixed".to_string())
            }
            fn name(&self) -> &str {
                "Fixed"
            }
        }

        let mut registry = StrategyRegistry::empty();
        registry.register_loader("Fixed", |_| Ok(Arc::new(Fixed)));

        let loader = registry.loader("Fixed", &ViewSettings::default()).unwrap();
        assert_eq!(loader.load(StepKind::Template, &Overrides::new()).unwrap(), "fixed");
        assert!(registry.loader("Simple", &ViewSettings::default()).is_err());
    }

    #[test]
    fn test_file_loader_built_from_settings() {
        let mut settings = ViewSettings::default();
        settings
            .paths
            .insert(StepKind::Template, vec!["{:template}.html".to_string()]);

        let loader = StrategyRegistry::new().loader("File", &settings).unwrap();
        assert_eq!(loader.name(), "File");
    }

    #[test]
    fn test_debug_lists_names() {
        let debug = format!("{:?}", StrategyRegistry::new());
        assert!(debug.contains("\"File\""));
        assert!(debug.contains("\"Jinja\""));
    }
}
