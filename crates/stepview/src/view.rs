//! The view: loader + renderer + output filters, composed over render steps.
//!
//! ## Rendering
//!
//! [`View::render`] folds a step list over an accumulator holding the current
//! [`Context`] and the output buffer:
//!
//! - a step with a capture renders and binds its output into the context under
//!   the capture key; the buffer is untouched
//! - a layout step renders with `content` bound to the buffer, and its output
//!   replaces the buffer
//! - any other step appends its output to the buffer
//!
//! The result is the final buffer. With `"all"`, that gives
//! `layout(content = element + template)`, or just `element + template` when
//! no layout is given.
//!
//! ```rust
//! use stepview::{Context, Overrides, Step, StepKind, View};
//!
//! let view = View::new();
//! let out = view
//!     .render(
//!         vec![
//!             Step::new(StepKind::Element).capture("foo"),
//!             Step::new(StepKind::Template),
//!         ],
//!         &Context::new().with("name", "Cap'n Crunch"),
//!         &Overrides::new()
//!             .with("element", "Logged in as: {:name}.")
//!             .with("template", "--{:foo}--"),
//!     )
//!     .unwrap();
//! assert_eq!(out, "--Logged in as: Cap'n Crunch.--");
//! ```
//!
//! ## Construction
//!
//! Loader, renderer, charset and filters are fixed when the view is built.
//! Named strategies are resolved through a [`StrategyRegistry`] at that point,
//! so a typo fails construction rather than the first render.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::config::{Response, ViewSettings};
use crate::context::Context;
use crate::error::Result;
use crate::filters::{Charset, OutputFilter, OutputFilters};
use crate::registry::StrategyRegistry;
use crate::step::{Overrides, Step, StepKind, Steps};
use crate::template::{Loader, Renderer, SimpleLoader, SimpleRenderer};

/// Context key a layout step receives the preceding output under.
pub const CONTENT_KEY: &str = "content";

/// State threaded through the steps of one render.
#[derive(Debug, Clone, Default)]
struct Accumulator {
    context: Context,
    buffer: String,
    /// Whether a non-capturing step has written to `buffer` yet.
    rendered: bool,
}

/// A configured two-step renderer.
///
/// `View` is cheap to clone and safe to share across threads; rendering
/// never mutates it.
#[derive(Clone)]
pub struct View {
    loader: Arc<dyn Loader>,
    renderer: Arc<dyn Renderer>,
    charset: Charset,
    filters: OutputFilters,
}

impl View {
    /// Creates a `Simple`/`Simple` view producing UTF-8.
    pub fn new() -> Self {
        let charset = Charset::default();
        Self {
            loader: Arc::new(SimpleLoader::new()),
            renderer: Arc::new(SimpleRenderer::new()),
            charset,
            filters: OutputFilters::for_charset(charset),
        }
    }

    /// Starts a builder backed by the built-in strategy registry.
    pub fn builder() -> ViewBuilder<'static> {
        ViewBuilder::new(StrategyRegistry::builtin())
    }

    /// Builds a view from named-strategy settings.
    pub fn from_settings(settings: &ViewSettings, registry: &StrategyRegistry) -> Result<Self> {
        ViewBuilder::new(registry).settings(settings.clone()).build()
    }

    /// Builds a view from a [`ViewConfig`], resolving named strategies in
    /// `registry`.
    pub fn from_config(config: ViewConfig, registry: &StrategyRegistry) -> Result<Self> {
        let ViewConfig {
            loader,
            renderer,
            response,
            filters,
            settings,
        } = config;

        let mut builder = ViewBuilder::new(registry).settings(settings);
        builder = match loader {
            Strategy::Named(name) => builder.loader(name),
            Strategy::Instance(loader) => builder.loader_instance(loader),
        };
        builder = match renderer {
            Strategy::Named(name) => builder.renderer(name),
            Strategy::Instance(renderer) => builder.renderer_instance(renderer),
        };
        if let Some(response) = response {
            builder = builder.response(response);
        }
        builder
            .filters
            .extend(filters.iter().map(|(key, filter)| (key.clone(), Arc::clone(filter))));
        builder.build()
    }

    /// Renders `steps` with `context`, passing `overrides` to the loader.
    ///
    /// `steps` is a step name (`"template"`, `"all"`, ...), a `Vec<Step>`, or
    /// an inline [`Steps::Inline`] map of step text.
    pub fn render(
        &self,
        steps: impl Into<Steps>,
        context: &Context,
        overrides: &Overrides,
    ) -> Result<String> {
        let (steps, overrides) = steps.into().expand(overrides)?;
        let initial = Accumulator {
            context: context.clone(),
            ..Accumulator::default()
        };

        let done = steps
            .iter()
            .filter(|step| step.applies(&overrides))
            .try_fold(initial, |acc, step| self.process(step, acc, &overrides))?;

        Ok(done.buffer)
    }

    /// Renders, then encodes the output in the view's charset.
    ///
    /// Characters the charset cannot hold become `&#N;` references.
    pub fn render_encoded(
        &self,
        steps: impl Into<Steps>,
        context: &Context,
        overrides: &Overrides,
    ) -> Result<Vec<u8>> {
        let output = self.render(steps, context, overrides)?;
        self.charset.encode(&self.charset.to_references(&output))
    }

    fn process(&self, step: &Step, acc: Accumulator, overrides: &Overrides) -> Result<Accumulator> {
        let Accumulator {
            mut context,
            mut buffer,
            mut rendered,
        } = acc;

        debug!(
            step = %step.path,
            capture = step.capture.as_ref().map(|c| c.key.as_str()),
            "rendering step"
        );
        let template = self.loader.load(step.path, overrides)?;

        if let Some(capture) = &step.capture {
            let output = self.renderer.render(&template, &context, &self.filters)?;
            context.insert(capture.key.clone(), output);
        } else if step.path == StepKind::Layout {
            let mut layout_context = context.clone();
            // An explicit `content` capture survives a layout with no step before it.
            if rendered || !context.contains_key(CONTENT_KEY) {
                layout_context.insert(CONTENT_KEY, std::mem::take(&mut buffer));
            }
            buffer = self.renderer.render(&template, &layout_context, &self.filters)?;
            rendered = true;
        } else {
            let output = self.renderer.render(&template, &context, &self.filters)?;
            buffer.push_str(&output);
            rendered = true;
        }

        Ok(Accumulator {
            context,
            buffer,
            rendered,
        })
    }

    pub fn loader(&self) -> &Arc<dyn Loader> {
        &self.loader
    }

    pub fn renderer(&self) -> &Arc<dyn Renderer> {
        &self.renderer
    }

    /// The charset the output filters escape for.
    pub fn charset(&self) -> Charset {
        self.charset
    }

    pub fn output_filters(&self) -> &OutputFilters {
        &self.filters
    }

    /// Returns the output filter registered as `key`.
    pub fn filter(&self, key: &str) -> Option<&OutputFilter> {
        self.filters.get(key)
    }
}

impl Default for View {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("loader", &self.loader.name())
            .field("renderer", &self.renderer.name())
            .field("charset", &self.charset)
            .field("filters", &self.filters)
            .finish()
    }
}

/// A loader or renderer, given by registry name or as a ready instance.
pub enum Strategy<T: ?Sized> {
    Named(String),
    Instance(Arc<T>),
}

impl<T: ?Sized> Clone for Strategy<T> {
    fn clone(&self) -> Self {
        match self {
            Strategy::Named(name) => Strategy::Named(name.clone()),
            Strategy::Instance(instance) => Strategy::Instance(Arc::clone(instance)),
        }
    }
}

impl<T: ?Sized> fmt::Debug for Strategy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Named(name) => f.debug_tuple("Named").field(name).finish(),
            Strategy::Instance(_) => f.write_str("Instance(..)"),
        }
    }
}

impl<T: ?Sized> From<&str> for Strategy<T> {
    fn from(name: &str) -> Self {
        Strategy::Named(name.to_string())
    }
}

impl<T: ?Sized> From<String> for Strategy<T> {
    fn from(name: String) -> Self {
        Strategy::Named(name)
    }
}

impl<T: ?Sized> From<Arc<T>> for Strategy<T> {
    fn from(instance: Arc<T>) -> Self {
        Strategy::Instance(instance)
    }
}

/// Everything a [`View`] is constructed from, in one value.
///
/// `response` takes precedence over `settings.encoding`. Entries in `filters`
/// replace the charset's default filters of the same key.
///
/// ```rust
/// use std::sync::Arc;
/// use stepview::{Response, StrategyRegistry, View, ViewConfig};
/// use stepview::template::{JinjaRenderer, Renderer};
///
/// let renderer: Arc<dyn Renderer> = Arc::new(JinjaRenderer::new());
/// let config = ViewConfig {
///     renderer: renderer.into(),
///     response: Some(Response::new().with_encoding("US-ASCII")),
///     ..ViewConfig::default()
/// };
/// let view = View::from_config(config, StrategyRegistry::builtin()).unwrap();
/// assert_eq!(view.renderer().name(), "Jinja");
/// assert_eq!(view.charset().name(), "US-ASCII");
/// ```
#[derive(Debug, Clone)]
pub struct ViewConfig {
    pub loader: Strategy<dyn Loader>,
    pub renderer: Strategy<dyn Renderer>,
    pub response: Option<Response>,
    pub filters: OutputFilters,
    /// Root, path patterns and fallback encoding for registry-built strategies.
    pub settings: ViewSettings,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            loader: Strategy::from("Simple"),
            renderer: Strategy::from("Simple"),
            response: None,
            filters: OutputFilters::empty(),
            settings: ViewSettings::default(),
        }
    }
}

/// Builder for [`View`].
///
/// Strategies given by name are looked up in the builder's registry when
/// [`build`](Self::build) runs; instances are used as-is.
///
/// ```rust
/// use std::sync::Arc;
/// use stepview::{Response, View};
/// use stepview::template::JinjaRenderer;
///
/// let view = View::builder()
///     .loader("Simple")
///     .renderer_instance(Arc::new(JinjaRenderer::new()))
///     .response(Response::new().with_encoding("ISO-8859-1"))
///     .build()
///     .unwrap();
/// assert_eq!(view.renderer().name(), "Jinja");
/// ```
pub struct ViewBuilder<'r> {
    registry: &'r StrategyRegistry,
    settings: ViewSettings,
    loader: Option<Arc<dyn Loader>>,
    renderer: Option<Arc<dyn Renderer>>,
    response: Option<Response>,
    filters: Vec<(String, OutputFilter)>,
}

impl<'r> ViewBuilder<'r> {
    pub fn new(registry: &'r StrategyRegistry) -> Self {
        Self {
            registry,
            settings: ViewSettings::default(),
            loader: None,
            renderer: None,
            response: None,
            filters: Vec::new(),
        }
    }

    /// Replaces the settings wholesale: strategy names, encoding and paths.
    pub fn settings(mut self, settings: ViewSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Uses the loader registered under `name`.
    pub fn loader(mut self, name: impl Into<String>) -> Self {
        self.settings.loader = name.into();
        self.loader = None;
        self
    }

    /// Uses the renderer registered under `name`.
    pub fn renderer(mut self, name: impl Into<String>) -> Self {
        self.settings.renderer = name.into();
        self.renderer = None;
        self
    }

    pub fn loader_instance(mut self, loader: Arc<dyn Loader>) -> Self {
        self.loader = Some(loader);
        self
    }

    pub fn renderer_instance(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Takes the output encoding from `response`.
    pub fn response(mut self, response: Response) -> Self {
        self.response = Some(response);
        self
    }

    /// Adds an output filter, replacing a default of the same key.
    pub fn filter<F>(mut self, key: impl Into<String>, filter: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.filters.push((key.into(), Arc::new(filter)));
        self
    }

    pub fn build(self) -> Result<View> {
        let loader = match self.loader {
            Some(loader) => loader,
            None => self.registry.loader(&self.settings.loader, &self.settings)?,
        };
        let renderer = match self.renderer {
            Some(renderer) => renderer,
            None => self.registry.renderer(&self.settings.renderer, &self.settings)?,
        };
        let charset = match &self.response {
            Some(response) => response.charset()?,
            None => self.settings.charset()?,
        };

        let mut filters = OutputFilters::for_charset(charset);
        for (key, filter) in self.filters {
            filters.insert(key, filter);
        }

        debug!(
            loader = loader.name(),
            renderer = renderer.name(),
            %charset,
            "view constructed"
        );

        Ok(View {
            loader,
            renderer,
            charset,
            filters,
        })
    }
}
