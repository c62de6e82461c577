//! Output filters and response encodings.
//!
//! Renderers never escape on their own. Escaping is exposed as a named
//! *output filter* that templates apply explicitly. The default registry holds
//! a single filter, `h`, which HTML-escapes its input for the view's response
//! [`Charset`].
//!
//! ## The `h` filter
//!
//! `h` escapes `&`, `<`, `>`, `"` and `'`. It then replaces every character the
//! charset cannot represent with a decimal character reference, so the result
//! always encodes cleanly:
//!
//! ```rust
//! use stepview::{Charset, OutputFilters};
//!
//! let filters = OutputFilters::for_charset(Charset::Latin1);
//! let out = filters.apply("h", "Joël <€>").unwrap();
//! assert_eq!(out, "Joël &lt;&#8364;&gt;");
//! assert!(Charset::Latin1.encode(&out).is_ok());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::ViewError;

/// Character encodings a view can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Charset {
    #[default]
    Utf8,
    /// ISO-8859-1.
    Latin1,
    /// US-ASCII.
    Ascii,
}

impl Charset {
    /// Canonical name, as it would appear in a `Content-Type` header.
    pub fn name(&self) -> &'static str {
        match self {
            Charset::Utf8 => "UTF-8",
            Charset::Latin1 => "ISO-8859-1",
            Charset::Ascii => "US-ASCII",
        }
    }

    /// Whether `c` has a representation in this charset.
    pub fn can_encode(&self, c: char) -> bool {
        match self {
            Charset::Utf8 => true,
            Charset::Latin1 => (c as u32) <= 0xFF,
            Charset::Ascii => c.is_ascii(),
        }
    }

    /// Encodes text into this charset.
    ///
    /// Fails with [`ViewError::UnsupportedEncoding`] on the first character
    /// that has no representation.
    pub fn encode(&self, text: &str) -> Result<Vec<u8>, ViewError> {
        match self {
            Charset::Utf8 => Ok(text.as_bytes().to_vec()),
            Charset::Latin1 | Charset::Ascii => text
                .chars()
                .map(|c| {
                    if self.can_encode(c) {
                        Ok(c as u32 as u8)
                    } else {
                        Err(ViewError::UnsupportedEncoding(format!(
                            "character U+{:04X} cannot be encoded as {}",
                            c as u32,
                            self.name()
                        )))
                    }
                })
                .collect(),
        }
    }

    /// Whether `bytes` form valid text in this charset.
    pub fn is_valid(&self, bytes: &[u8]) -> bool {
        match self {
            Charset::Utf8 => std::str::from_utf8(bytes).is_ok(),
            // Every byte is a Latin-1 character.
            Charset::Latin1 => true,
            Charset::Ascii => bytes.is_ascii(),
        }
    }

    /// Replaces characters outside this charset with `&#N;` references.
    pub fn to_references(&self, text: &str) -> String {
        if text.chars().all(|c| self.can_encode(c)) {
            return text.to_string();
        }
        let mut out = String::with_capacity(text.len() + 8);
        for c in text.chars() {
            if self.can_encode(c) {
                out.push(c);
            } else {
                out.push_str(&format!("&#{};", c as u32));
            }
        }
        out
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Charset {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Charset::Utf8),
            "iso-8859-1" | "iso8859-1" | "latin1" | "latin-1" => Ok(Charset::Latin1),
            "us-ascii" | "ascii" => Ok(Charset::Ascii),
            _ => Err(ViewError::UnsupportedEncoding(s.to_string())),
        }
    }
}

/// HTML-escapes `text` for the given charset.
pub fn escape(text: &str, charset: Charset) -> String {
    let escaped = html_escape::encode_quoted_attribute(text);
    charset.to_references(&escaped)
}

/// A unary text transform exposed to templates.
pub type OutputFilter = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Named output filters available to a view's templates.
#[derive(Clone, Default)]
pub struct OutputFilters {
    filters: HashMap<String, OutputFilter>,
}

impl OutputFilters {
    /// Creates a registry with no filters.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates the default registry for a charset: `h` escapes for it.
    pub fn for_charset(charset: Charset) -> Self {
        Self::empty().with("h", move |text: &str| escape(text, charset))
    }

    /// Adds or replaces a filter, returning the updated registry.
    pub fn with<F>(mut self, key: impl Into<String>, filter: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.insert(key, Arc::new(filter));
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, filter: OutputFilter) {
        self.filters.insert(key.into(), filter);
    }

    pub fn get(&self, key: &str) -> Option<&OutputFilter> {
        self.filters.get(key)
    }

    /// Applies the filter named `key`, or returns `None` if there is none.
    pub fn apply(&self, key: &str, input: &str) -> Option<String> {
        self.filters.get(key).map(|filter| filter(input))
    }

    /// Chains two registered filters: `first` then `second`.
    pub fn compose(&self, first: &str, second: &str) -> Option<OutputFilter> {
        let a = Arc::clone(self.filters.get(first)?);
        let b = Arc::clone(self.filters.get(second)?);
        Some(Arc::new(move |text: &str| b(a(text).as_str())))
    }

    /// Filter keys, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.filters.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &OutputFilter)> {
        self.filters.iter()
    }
}

impl fmt::Debug for OutputFilters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputFilters")
            .field("keys", &self.keys())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape("<p>Foo, Bar & Baz</p>", Charset::Utf8),
            "&lt;p&gt;Foo, Bar &amp; Baz&lt;/p&gt;"
        );
    }

    #[test]
    fn test_escape_quotes() {
        let out = escape("<a title='Cap\"n'>", Charset::Utf8);
        assert!(!out.contains('\''));
        assert!(!out.contains('"'));
        assert!(out.starts_with("&lt;a title="));
        assert!(out.contains("&quot;"));
    }

    #[test]
    fn test_escape_utf8_keeps_multibyte() {
        assert_eq!(escape("Joël €", Charset::Utf8), "Joël €");
    }

    #[test]
    fn test_escape_ascii_references_non_ascii() {
        assert_eq!(escape("Joël", Charset::Ascii), "Jo&#235;l");
    }

    #[test]
    fn test_charset_parse_aliases() {
        assert_eq!("utf-8".parse::<Charset>().unwrap(), Charset::Utf8);
        assert_eq!("ISO-8859-1".parse::<Charset>().unwrap(), Charset::Latin1);
        assert_eq!("latin1".parse::<Charset>().unwrap(), Charset::Latin1);
        assert_eq!("ASCII".parse::<Charset>().unwrap(), Charset::Ascii);
        assert!(matches!(
            "EBCDIC".parse::<Charset>(),
            Err(ViewError::UnsupportedEncoding(name)) if name == "EBCDIC"
        ));
    }

    #[test]
    fn test_latin1_encode() {
        assert_eq!(Charset::Latin1.encode("Joël").unwrap(), vec![b'J', b'o', 0xEB, b'l']);
        assert!(Charset::Latin1.encode("€").is_err());
    }

    #[test]
    fn test_is_valid() {
        assert!(Charset::Utf8.is_valid("Joël".as_bytes()));
        assert!(!Charset::Utf8.is_valid(&[b'J', 0xEB]));
        assert!(!Charset::Ascii.is_valid(&[0xEB]));
    }

    #[test]
    fn test_filters_override_and_compose() {
        let filters = OutputFilters::for_charset(Charset::Utf8)
            .with("upper", |text: &str| text.to_uppercase());

        assert_eq!(filters.keys(), vec!["h", "upper"]);
        let both = filters.compose("upper", "h").unwrap();
        assert_eq!(both("a & b"), "A &amp; B");
        assert!(filters.compose("h", "missing").is_none());

        let replaced = filters.with("h", |text: &str| format!("[{}]", text));
        assert_eq!(replaced.apply("h", "<x>").as_deref(), Some("[<x>]"));
    }
}
