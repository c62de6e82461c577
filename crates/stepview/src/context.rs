//! Variables available to templates during a render.
//!
//! A [`Context`] maps variable names to JSON values. Every render step sees the
//! context as it stands after the previous step, including any output captured
//! by earlier steps.
//!
//! ```rust
//! use stepview::Context;
//!
//! let context = Context::new()
//!     .with("type", "auth")
//!     .with("success", "true");
//!
//! assert_eq!(context.get_str("type").as_deref(), Some("auth"));
//! ```

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Result, ViewError};

/// Named values substituted into templates.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Context {
    values: Map<String, Value>,
}

impl Context {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a context from any serializable struct or map.
    ///
    /// The value must serialize to an object; anything else is rejected.
    pub fn from_serialize<T: Serialize>(data: &T) -> Result<Self> {
        match serde_json::to_value(data) {
            Ok(Value::Object(values)) => Ok(Self { values }),
            Ok(other) => Err(ViewError::Template(format!(
                "render context must be an object, got {}",
                type_name(&other)
            ))),
            Err(err) => Err(ViewError::Template(err.to_string())),
        }
    }

    /// Adds a value, returning the updated context.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Sets a value. An existing value under the same key is replaced.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Returns the value under `key` formatted as template text.
    pub fn get_str(&self, key: &str) -> Option<String> {
        self.values.get(key).map(format_value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Merges `other` into this context. Values from `other` win.
    pub fn merge(&mut self, other: &Context) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut context = Context::new();
        for (key, value) in iter {
            context.insert(key, value);
        }
        context
    }
}

/// Formats a JSON value as template text.
///
/// Strings are inserted verbatim, `null` becomes empty, and arrays or objects
/// use their compact JSON form.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
