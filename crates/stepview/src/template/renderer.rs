//! Template renderers: substituting context values into template text.
//!
//! Two renderers ship with the crate:
//!
//! - [`SimpleRenderer`]: `{:name}` substitution only, values inserted unescaped
//! - [`JinjaRenderer`]: full MiniJinja syntax, with the view's output filters
//!   registered as MiniJinja filters (`{{ name | h }}`)

use std::fmt;
use std::sync::{Arc, Mutex};

use minijinja::Environment;

use super::placeholder;
use crate::context::Context;
use crate::error::Result;
use crate::filters::OutputFilters;

/// Renders template text against a context.
pub trait Renderer: Send + Sync {
    /// Renders `template` with `context`. `filters` are the view's output
    /// filters, for renderers that can expose them to templates.
    fn render(&self, template: &str, context: &Context, filters: &OutputFilters) -> Result<String>;

    /// The name this renderer is registered under.
    fn name(&self) -> &str;
}

/// Placeholder-substitution renderer.
///
/// Replaces `{:name}` with the context value for `name`. Values are inserted
/// as-is; escaping is the caller's job. Placeholders with no value are kept
/// verbatim.
///
/// ```rust
/// use stepview::{Context, OutputFilters};
/// use stepview::template::{Renderer, SimpleRenderer};
///
/// let context = Context::new().with("name", "Cap'n Crunch");
/// let out = SimpleRenderer::new()
///     .render("Logged in as: {:name}.", &context, &OutputFilters::empty())
///     .unwrap();
/// assert_eq!(out, "Logged in as: Cap'n Crunch.");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimpleRenderer;

impl SimpleRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for SimpleRenderer {
    fn render(&self, template: &str, context: &Context, _filters: &OutputFilters) -> Result<String> {
        Ok(placeholder::insert(template, |name| context.get_str(name)))
    }

    fn name(&self) -> &str {
        "Simple"
    }
}

/// MiniJinja-backed renderer.
///
/// Every output filter is available by its key, so templates escape with
/// `{{ value | h }}`. Undefined variables render as empty.
///
/// The environment is built on first use and reused while the renderer keeps
/// seeing the same filter set. A view's filters are fixed at construction, so
/// in practice it is built once per view.
#[derive(Default)]
pub struct JinjaRenderer {
    cache: Mutex<Option<CachedEnvironment>>,
}

/// Registered filters identify an environment by key and closure address.
type FilterFingerprint = Vec<(String, usize)>;

struct CachedEnvironment {
    fingerprint: FilterFingerprint,
    env: Arc<Environment<'static>>,
}

impl JinjaRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    fn fingerprint(filters: &OutputFilters) -> FilterFingerprint {
        let mut fingerprint: FilterFingerprint = filters
            .iter()
            .map(|(key, filter)| (key.clone(), Arc::as_ptr(filter) as *const () as usize))
            .collect();
        fingerprint.sort_unstable();
        fingerprint
    }

    fn build_environment(filters: &OutputFilters) -> Environment<'static> {
        let mut env = Environment::new();
        for (key, filter) in filters.iter() {
            let filter = Arc::clone(filter);
            env.add_filter(key.clone(), move |value: String| -> String { filter(value.as_str()) });
        }
        env
    }

    /// Returns the environment for `filters`, rebuilding it if they changed.
    fn environment(&self, filters: &OutputFilters) -> Arc<Environment<'static>> {
        let fingerprint = Self::fingerprint(filters);
        let mut cache = self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        match cache.as_ref() {
            Some(cached) if cached.fingerprint == fingerprint => Arc::clone(&cached.env),
            _ => {
                let env = Arc::new(Self::build_environment(filters));
                *cache = Some(CachedEnvironment {
                    fingerprint,
                    env: Arc::clone(&env),
                });
                env
            }
        }
    }
}

impl fmt::Debug for JinjaRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JinjaRenderer").finish_non_exhaustive()
    }
}

impl Renderer for JinjaRenderer {
    fn render(&self, template: &str, context: &Context, filters: &OutputFilters) -> Result<String> {
        let env = self.environment(filters);
        Ok(env.render_str(template, context)?)
    }

    fn name(&self) -> &str {
        "Jinja"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ViewError;
    use crate::filters::Charset;
    use serde_json::json;

    #[test]
    fn test_simple_renderer_substitutes() {
        let context = Context::new().with("content", "world");
        let out = SimpleRenderer::new()
            .render("Hello {:content}!", &context, &OutputFilters::empty())
            .unwrap();
        assert_eq!(out, "Hello world!");
    }

    #[test]
    fn test_simple_renderer_does_not_escape() {
        let context = Context::new().with("html", "<b>&</b>");
        let filters = OutputFilters::for_charset(Charset::Utf8);
        let out = SimpleRenderer::new().render("{:html}", &context, &filters).unwrap();
        assert_eq!(out, "<b>&</b>");
    }

    #[test]
    fn test_simple_renderer_formats_values() {
        let context = Context::new()
            .with("count", 42)
            .with("ok", true)
            .with("none", json!(null));
        let out = SimpleRenderer::new()
            .render("{:count}/{:ok}/[{:none}]", &context, &OutputFilters::empty())
            .unwrap();
        assert_eq!(out, "42/true/[]");
    }

    #[test]
    fn test_jinja_renderer_applies_view_filters() {
        let context = Context::new().with("body", "<p>Foo & Bar</p>");
        let filters = OutputFilters::for_charset(Charset::Utf8);
        let out = JinjaRenderer::new()
            .render("<div>{{ body | h }}</div>", &context, &filters)
            .unwrap();
        assert_eq!(out, "<div>&lt;p&gt;Foo &amp; Bar&lt;/p&gt;</div>");
    }

    #[test]
    fn test_jinja_renderer_control_flow() {
        let context = Context::new().with("items", json!(["a", "b"]));
        let out = JinjaRenderer::new()
            .render(
                "{% for item in items %}{{ item }};{% endfor %}",
                &context,
                &OutputFilters::empty(),
            )
            .unwrap();
        assert_eq!(out, "a;b;");
    }

    #[test]
    fn test_jinja_renderer_reuses_environment_for_same_filters() {
        let renderer = JinjaRenderer::new();
        let filters = OutputFilters::for_charset(Charset::Utf8);

        let first = renderer.environment(&filters);
        let second = renderer.environment(&filters.clone());
        assert!(Arc::ptr_eq(&first, &second));

        let other = filters.with("upper", |text: &str| text.to_uppercase());
        let rebuilt = renderer.environment(&other);
        assert!(!Arc::ptr_eq(&first, &rebuilt));
        let out = renderer
            .render("{{ name | upper }}", &Context::new().with("name", "joe"), &other)
            .unwrap();
        assert_eq!(out, "JOE");
    }

    #[test]
    fn test_jinja_renderer_syntax_error() {
        let result = JinjaRenderer::new().render("{{ unclosed", &Context::new(), &OutputFilters::empty());
        assert!(matches!(result, Err(ViewError::Template(_))));
    }
}
