//! Render steps and the shapes accepted by [`View::render`](crate::View::render).
//!
//! A render is a sequence of [`Step`]s, each naming the kind of template it
//! renders ([`StepKind`]). Steps can bind their output into the context for
//! later steps ([`Capture`]) and can be made conditional on an override key.
//!
//! Three call shapes convert into [`Steps`]:
//!
//! | Shape | Example | Meaning |
//! |-------|---------|---------|
//! | name | `"template"`, `"all"` | A preset step list |
//! | sequence | `vec![Step::new(StepKind::Element).capture("foo"), ...]` | Explicit steps |
//! | inline | `Steps::inline([("element", "Hi {:name}")])` | Steps *and* their template text |

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ViewError;

/// The kind of template a step renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Element,
    Template,
    Layout,
}

impl StepKind {
    /// All kinds, in composition order.
    pub const ALL: [StepKind; 3] = [StepKind::Element, StepKind::Template, StepKind::Layout];

    pub fn as_str(&self) -> &'static str {
        match self {
            StepKind::Element => "element",
            StepKind::Template => "template",
            StepKind::Layout => "layout",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StepKind {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "element" => Ok(StepKind::Element),
            "template" => Ok(StepKind::Template),
            "layout" => Ok(StepKind::Layout),
            other => Err(ViewError::InvalidStep(format!(
                "unknown step '{}' (expected element, template or layout)",
                other
            ))),
        }
    }
}

/// Binds a step's rendered output into the context under `key`.
///
/// Deserializes from either `{"data": "foo"}` or `{"context": "foo"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capture {
    #[serde(rename = "data", alias = "context")]
    pub key: String,
}

/// One phase of a render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Which template this step loads.
    pub path: StepKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capture: Option<Capture>,

    /// Override key that must be present for the step to run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<String>,
}

impl Step {
    pub fn new(path: StepKind) -> Self {
        Self {
            path,
            capture: None,
            conditions: None,
        }
    }

    /// Captures this step's output into the context under `key`.
    pub fn capture(mut self, key: impl Into<String>) -> Self {
        self.capture = Some(Capture { key: key.into() });
        self
    }

    /// Runs this step only when `key` is present in the overrides.
    pub fn when(mut self, key: impl Into<String>) -> Self {
        self.conditions = Some(key.into());
        self
    }

    /// Whether this step should run for the given overrides.
    pub fn applies(&self, overrides: &Overrides) -> bool {
        self.conditions
            .as_deref()
            .map_or(true, |key| overrides.contains_key(key))
    }
}

impl From<StepKind> for Step {
    fn from(kind: StepKind) -> Self {
        Step::new(kind)
    }
}

/// Per-render options handed to the loader.
///
/// For the `Simple` loader the step keys hold template text. For the `File`
/// loader they hold template names, and any other key can feed a path pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Overrides {
    values: HashMap<String, String>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Returns the override for a step kind.
    pub fn step(&self, kind: StepKind) -> Option<&str> {
        self.get(kind.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Merges `other` into this set. Values from `other` win.
    pub fn merge(&mut self, other: &Overrides) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Overrides {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut overrides = Overrides::new();
        for (key, value) in iter {
            overrides.insert(key, value);
        }
        overrides
    }
}

/// The step argument of [`View::render`](crate::View::render).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Steps {
    /// `"element"`, `"template"`, `"layout"` or `"all"`.
    Named(String),
    /// An explicit step list.
    Sequence(Vec<Step>),
    /// Step kinds mapped directly to their template text.
    Inline(Overrides),
}

impl Steps {
    /// Builds an inline render from `(step, text)` pairs.
    pub fn inline<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Steps::Inline(pairs.into_iter().collect())
    }

    /// Expands into a concrete step list and the overrides that go with it.
    ///
    /// `"all"` becomes an optional element, the template, and an optional
    /// layout; the optional steps run only when their override is present.
    pub fn expand(self, overrides: &Overrides) -> Result<(Vec<Step>, Overrides), ViewError> {
        match self {
            Steps::Named(name) if name == "all" => {
                let steps = vec![
                    Step::new(StepKind::Element).when(StepKind::Element.as_str()),
                    Step::new(StepKind::Template),
                    Step::new(StepKind::Layout).when(StepKind::Layout.as_str()),
                ];
                Ok((steps, overrides.clone()))
            }
            Steps::Named(name) => {
                let kind: StepKind = name.parse()?;
                Ok((vec![Step::new(kind)], overrides.clone()))
            }
            Steps::Sequence(steps) => {
                if steps.is_empty() {
                    return Err(ViewError::InvalidStep("empty step sequence".to_string()));
                }
                Ok((steps, overrides.clone()))
            }
            Steps::Inline(inline) => {
                let steps: Vec<Step> = StepKind::ALL
                    .iter()
                    .filter(|kind| inline.contains_key(kind.as_str()))
                    .map(|kind| Step::new(*kind))
                    .collect();
                if steps.is_empty() {
                    return Err(ViewError::InvalidStep(
                        "inline render names no element, template or layout".to_string(),
                    ));
                }
                let mut merged = overrides.clone();
                merged.merge(&inline);
                Ok((steps, merged))
            }
        }
    }
}

impl From<&str> for Steps {
    fn from(name: &str) -> Self {
        Steps::Named(name.to_string())
    }
}

impl From<String> for Steps {
    fn from(name: String) -> Self {
        Steps::Named(name)
    }
}

impl From<StepKind> for Steps {
    fn from(kind: StepKind) -> Self {
        Steps::Sequence(vec![Step::new(kind)])
    }
}

impl From<Vec<Step>> for Steps {
    fn from(steps: Vec<Step>) -> Self {
        Steps::Sequence(steps)
    }
}

impl From<Overrides> for Steps {
    fn from(inline: Overrides) -> Self {
        Steps::Inline(inline)
    }
}
