//! # stepview - Two-Step View Rendering
//!
//! `stepview` renders views in steps: an optional *element*, a *template*, and
//! an optional *layout* that wraps whatever came before it through a
//! `{:content}` placeholder. Each step is loaded by a [`Loader`](template::Loader)
//! and rendered by a [`Renderer`](template::Renderer); both are pluggable and
//! can be picked by name through a [`StrategyRegistry`].
//!
//! ## Core Concepts
//!
//! - [`View`]: Loader + renderer + output filters, fixed at construction
//! - [`Steps`]: What to render: `"template"`, `"all"`, a step list, or inline text
//! - [`Context`]: Variables for `{:name}` placeholders
//! - [`Overrides`]: Per-render loader input (template text or template names)
//! - [`OutputFilters`]: Named text transforms such as the `h` HTML escaper
//!
//! ## Quick Start
//!
//! ```rust
//! use stepview::{Context, Overrides, View};
//!
//! let view = View::new();
//!
//! let out = view.render(
//!     "all",
//!     &Context::new().with("type", "auth").with("success", "true"),
//!     &Overrides::new()
//!         .with("layout", "<?xml version=\"1.0\" ?>\n\n{:content}\n")
//!         .with("template", "<{:type}>{:success}</{:type}>"),
//! ).unwrap();
//!
//! assert_eq!(out, "<?xml version=\"1.0\" ?>\n\n<auth>true</auth>\n");
//! ```
//!
//! ## Escaping
//!
//! Renderers insert values unescaped. Escape explicitly with the view's `h`
//! filter, which targets the response encoding:
//!
//! ```rust
//! use stepview::View;
//!
//! let view = View::new();
//! let h = view.filter("h").unwrap();
//! assert_eq!(h("<p>Foo, Bar & Baz</p>"), "&lt;p&gt;Foo, Bar &amp; Baz&lt;/p&gt;");
//! ```
//!
//! ## Placeholders
//!
//! `{:name}` with `name` matching `[A-Za-z_][A-Za-z0-9_]*`. A placeholder with
//! no value in the context is left in the output unchanged.

pub mod config;
pub mod context;
mod error;
pub mod filters;
pub mod registry;
pub mod step;
pub mod template;
mod view;

pub use config::{Response, ViewSettings};
pub use context::Context;
pub use error::{Result, ViewError, ADAPTER_KIND};
pub use filters::{escape, Charset, OutputFilter, OutputFilters};
pub use registry::StrategyRegistry;
pub use step::{Capture, Overrides, Step, StepKind, Steps};
pub use view::{Strategy, View, ViewBuilder, ViewConfig, CONTENT_KEY};
