//! Loader and renderer strategies.
//!
//! A view renders each step in two moves: a [`Loader`] turns the step into
//! template text, then a [`Renderer`] substitutes the context into it. Both
//! are trait objects so views can be configured with built-ins or custom
//! strategies, by instance or by registered name (see
//! [`StrategyRegistry`](crate::StrategyRegistry)).
//!
//! | Name | Loader | Renderer |
//! |------|--------|----------|
//! | `Simple` | override text is the template | `{:name}` substitution |
//! | `File` | path patterns on disk | |
//! | `Jinja` | | MiniJinja with output filters |

mod loader;
pub mod placeholder;
mod renderer;

pub use loader::{FileLoader, Loader, SimpleLoader};
pub use placeholder::{insert, placeholders};
pub use renderer::{JinjaRenderer, Renderer, SimpleRenderer};
