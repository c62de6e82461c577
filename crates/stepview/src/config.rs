//! View configuration.
//!
//! [`ViewSettings`] is the serializable form of a view's setup: which loader
//! and renderer to use by name, the response encoding, and file-loader paths.
//! It is typically loaded from YAML:
//!
//! ```rust
//! use stepview::ViewSettings;
//!
//! let settings = ViewSettings::from_yaml(r#"
//! loader: File
//! renderer: Simple
//! encoding: ISO-8859-1
//! root: ./app
//! paths:
//!   template:
//!     - "views/{:controller}/{:template}.html"
//!   layout:
//!     - "layouts/{:layout}.html"
//! "#).unwrap();
//!
//! assert_eq!(settings.loader, "File");
//! ```
//!
//! Every field has a default, so an empty document yields a `Simple`/`Simple`
//! UTF-8 view.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::filters::Charset;
use crate::step::StepKind;

/// The response a view renders for. Only its encoding matters here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub encoding: String,
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    pub fn charset(&self) -> Result<Charset> {
        self.encoding.parse()
    }
}

impl Default for Response {
    fn default() -> Self {
        Self {
            encoding: Charset::Utf8.name().to_string(),
        }
    }
}

/// Named-strategy view configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewSettings {
    /// Registered loader name.
    pub loader: String,
    /// Registered renderer name.
    pub renderer: String,
    /// Response encoding used to build the output filters.
    pub encoding: String,
    /// Base directory for relative file-loader paths.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
    /// File-loader path patterns per step kind.
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub paths: HashMap<StepKind, Vec<String>>,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            loader: "Simple".to_string(),
            renderer: "Simple".to_string(),
            encoding: Charset::Utf8.name().to_string(),
            root: None,
            paths: HashMap::new(),
        }
    }
}

impl ViewSettings {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Reads settings from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn charset(&self) -> Result<Charset> {
        self.encoding.parse()
    }

    pub fn response(&self) -> Response {
        Response::new().with_encoding(self.encoding.clone())
    }
}
