//! `{:name}` placeholder substitution.
//!
//! This is the one piece of syntax shared by the [`SimpleRenderer`](super::SimpleRenderer)
//! and the path patterns of the [`FileLoader`](super::FileLoader).
//!
//! # Syntax
//!
//! - `{:name}` - replaced by the value for `name`
//! - names match `[A-Za-z_][A-Za-z0-9_]*`
//!
//! A placeholder with no value is left in the output exactly as written.
//! Anything that does not form a complete placeholder (`{:`, `{:1st}`, `{name}`)
//! is ordinary text. Substituted values are not scanned again.
//!
//! ```rust
//! use stepview::template::insert;
//!
//! let out = insert("Hello {:who}, {:missing}!", |name| {
//!     (name == "who").then(|| "world".to_string())
//! });
//! assert_eq!(out, "Hello world, {:missing}!");
//! ```

const OPEN: &str = "{:";

/// Substitutes every `{:name}` in `template` using `lookup`.
pub fn insert<F>(template: &str, mut lookup: F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find(OPEN) {
        result.push_str(&rest[..start]);
        let after = &rest[start + OPEN.len()..];

        match identifier_len(after) {
            Some(len) if after[len..].starts_with('}') => {
                let name = &after[..len];
                match lookup(name) {
                    Some(value) => result.push_str(&value),
                    None => result.push_str(&rest[start..start + OPEN.len() + len + 1]),
                }
                rest = &after[len + 1..];
            }
            _ => {
                result.push_str(OPEN);
                rest = after;
            }
        }
    }

    result.push_str(rest);
    result
}

/// Returns the names of all well-formed placeholders, in order of appearance.
pub fn placeholders(template: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = template;

    while let Some(start) = rest.find(OPEN) {
        let after = &rest[start + OPEN.len()..];
        match identifier_len(after) {
            Some(len) if after[len..].starts_with('}') => {
                names.push(&after[..len]);
                rest = &after[len + 1..];
            }
            _ => rest = after,
        }
    }

    names
}

/// Length in bytes of the identifier at the start of `s`, if there is one.
fn identifier_len(s: &str) -> Option<usize> {
    let first = s.chars().next()?;
    if !(first.is_ascii_alphabetic() || first == '_') {
        return None;
    }
    let len = s
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_'))
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    Some(len)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(name: &str) -> Option<String> {
        match name {
            "content" => Some("world".to_string()),
            "type" => Some("auth".to_string()),
            "nested" => Some("{:content}".to_string()),
            _ => None,
        }
    }

    #[test]
    fn test_simple_substitution() {
        assert_eq!(insert("Hello {:content}!", lookup), "Hello world!");
    }

    #[test]
    fn test_repeated_placeholder() {
        assert_eq!(insert("<{:type}></{:type}>", lookup), "<auth></auth>");
    }

    #[test]
    fn test_missing_placeholder_left_verbatim() {
        assert_eq!(insert("a {:nope} b", lookup), "a {:nope} b");
    }

    #[test]
    fn test_malformed_sequences_are_literal() {
        assert_eq!(insert("{: content}", lookup), "{: content}");
        assert_eq!(insert("{:1st}", lookup), "{:1st}");
        assert_eq!(insert("{content}", lookup), "{content}");
        assert_eq!(insert("trailing {:", lookup), "trailing {:");
        assert_eq!(insert("{:content", lookup), "{:content");
    }

    #[test]
    fn test_adjacent_open_after_malformed() {
        assert_eq!(insert("{:{:content}", lookup), "{:world");
    }

    #[test]
    fn test_values_are_not_rescanned() {
        assert_eq!(insert("[{:nested}]", lookup), "[{:content}]");
    }

    #[test]
    fn test_multibyte_text_around_placeholders() {
        assert_eq!(insert("Joël → {:type} ✓", lookup), "Joël → auth ✓");
    }

    #[test]
    fn test_placeholders_lists_names() {
        assert_eq!(
            placeholders("<{:type}>{:success}</{:type}> {:9} {:_x}"),
            vec!["type", "success", "type", "_x"]
        );
    }
}
