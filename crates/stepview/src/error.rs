//! Error types for view construction and rendering.
//!
//! [`ViewError`] is the single error type returned by every fallible operation
//! in this crate. Strategy lookups, template loading, rendering and encoding all
//! report through it, so callers only need to match one enum.

use thiserror::Error;

/// The adapter category reported when a named strategy cannot be resolved.
pub const ADAPTER_KIND: &str = "adapter.template.view";

/// Error type for view operations.
#[derive(Debug, Error)]
pub enum ViewError {
    /// A named loader or renderer is not registered.
    #[error("Class '{name}' of type '{kind}' not found.")]
    NotFound { name: String, kind: &'static str },

    /// The loader could not produce template text for a step.
    #[error("template not found for step '{step}': {name}")]
    TemplateNotFound { step: String, name: String },

    /// A step name or step specification is malformed.
    #[error("invalid render step: {0}")]
    InvalidStep(String),

    /// The configured response encoding is not supported.
    #[error("unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    /// Template syntax or evaluation error reported by a renderer.
    #[error("template error: {0}")]
    Template(String),

    /// View settings could not be parsed.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error while reading a template from disk.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ViewError {
    /// Builds the lookup-miss error for a strategy name.
    pub fn not_found(name: impl Into<String>) -> Self {
        ViewError::NotFound {
            name: name.into(),
            kind: ADAPTER_KIND,
        }
    }
}

impl From<minijinja::Error> for ViewError {
    fn from(err: minijinja::Error) -> Self {
        ViewError::Template(err.to_string())
    }
}

impl From<serde_yaml::Error> for ViewError {
    fn from(err: serde_yaml::Error) -> Self {
        ViewError::Config(err.to_string())
    }
}

/// Result type for view operations.
pub type Result<T> = std::result::Result<T, ViewError>;
