//! Dotted key paths (`a.b.c`) and the helpers the mapper uses to read and
//! write them.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::Value;

static SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("static regex"));

static LITERAL_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+(\.[0-9]+)?$").expect("static regex"));

/// The sentinel path addressing the whole document.
pub const WHOLE: &str = "*";

/// A validated key path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyPath {
    /// `*`, the whole document
    Whole,
    /// One or more identifier segments
    Fields(Vec<String>),
}

impl KeyPath {
    /// Parse a key path, returning `None` if it is not valid.
    ///
    /// # Examples
    ///
    /// ```
    /// use sql_rules::keypath::KeyPath;
    ///
    /// assert_eq!(KeyPath::parse("*"), Some(KeyPath::Whole));
    /// assert!(KeyPath::parse("a.b_1.c").is_some());
    /// assert!(KeyPath::parse("a..b").is_none());
    /// assert!(KeyPath::parse("1a").is_none());
    /// ```
    pub fn parse(text: &str) -> Option<KeyPath> {
        if text == WHOLE {
            return Some(KeyPath::Whole);
        }
        if !is_valid_key_path(text) {
            return None;
        }
        Some(KeyPath::Fields(text.split('.').map(str::to_string).collect()))
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPath::Whole => f.write_str(WHOLE),
            KeyPath::Fields(segments) => f.write_str(&segments.join(".")),
        }
    }
}

/// True iff `text` is `*` or a dot-separated list of identifiers.
pub fn is_valid_key_path(text: &str) -> bool {
    if text.is_empty() {
        return false;
    }
    if text == WHOLE {
        return true;
    }
    text.split('.').all(|segment| SEGMENT.is_match(segment))
}

/// True for bare unsigned decimal literals such as `3` or `1.5`.
pub fn is_literal_number(text: &str) -> bool {
    LITERAL_NUMBER.is_match(text)
}

pub fn literal_number(text: &str) -> Option<f64> {
    if !is_literal_number(text) {
        return None;
    }
    text.parse().ok()
}

/// True for text wrapped in a matching pair of `'` or `"`.
pub fn is_literal_string(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() >= 2
        && bytes[0] == bytes[bytes.len() - 1]
        && (bytes[0] == b'"' || bytes[0] == b'\'')
}

pub fn literal_string(text: &str) -> Option<&str> {
    if !is_literal_string(text) {
        return None;
    }
    Some(&text[1..text.len() - 1])
}

/// Read the value at `path`, walking nested objects.
///
/// Missing segments and non-object intermediates give `Null`; this never fails.
pub fn get_by_path(doc: &Value, path: &KeyPath) -> Value {
    let segments = match path {
        KeyPath::Whole => return doc.clone(),
        KeyPath::Fields(segments) => segments,
    };

    let mut current = doc;
    for segment in segments {
        match current {
            Value::Object(map) => match map.get(segment) {
                Some(value) => current = value,
                None => return Value::Null,
            },
            _ => return Value::Null,
        }
    }
    current.clone()
}

/// Write `value` at `path`, creating (or replacing non-object) intermediates.
///
/// A [`KeyPath::Whole`] target is ignored here; the mapper handles it.
pub fn set_by_path(obj: &mut HashMap<String, Value>, path: &KeyPath, value: Value) {
    let KeyPath::Fields(segments) = path else {
        return;
    };
    let Some((last, parents)) = segments.split_last() else {
        return;
    };

    let mut current = obj;
    for segment in parents {
        let slot = current
            .entry(segment.clone())
            .or_insert_with(Value::object);
        if !matches!(slot, Value::Object(_)) {
            *slot = Value::object();
        }
        let Value::Object(map) = slot else {
            return;
        };
        current = map;
    }
    current.insert(last.clone(), value);
}

/// Turn arbitrary source text into something usable as a field name.
///
/// Characters outside `[A-Za-z0-9_]` become `_`, dots are kept as separators,
/// and a digit opening a segment is replaced too. A dot that would leave an
/// empty segment becomes `_`.
///
/// ```
/// use sql_rules::keypath::sanitize_identifier;
///
/// assert_eq!(sanitize_identifier("Sum(b.c)"), "Sum_b.c_");
/// assert_eq!(sanitize_identifier("b.c[2] + b.c[3]"), "b.c_2____b.c_3_");
/// assert_eq!(sanitize_identifier("v1."), "v1_");
/// ```
pub fn sanitize_identifier(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut segment_start = true;
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        let keep = match ch {
            '.' => !segment_start && chars.peek().is_some(),
            '_' => true,
            _ => ch.is_ascii_alphabetic() || (ch.is_ascii_digit() && !segment_start),
        };
        out.push(if keep { ch } else { '_' });
        segment_start = keep && ch == '.';
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Value {
        Value::from_json_str(r#"{"a":{"b":{"c":1}},"x":5}"#).unwrap()
    }

    #[test]
    fn test_get_by_path() {
        let path = KeyPath::parse("a.b.c").unwrap();
        assert_eq!(get_by_path(&doc(), &path), Value::Number(1.0));

        let missing = KeyPath::parse("a.z.c").unwrap();
        assert_eq!(get_by_path(&doc(), &missing), Value::Null);

        let through_scalar = KeyPath::parse("x.y").unwrap();
        assert_eq!(get_by_path(&doc(), &through_scalar), Value::Null);
    }

    #[test]
    fn test_set_then_get() {
        let mut map = HashMap::new();
        map.insert("x".to_string(), Value::Number(5.0));

        let path = KeyPath::parse("x.y.z").unwrap();
        set_by_path(&mut map, &path, Value::from("v"));

        let doc = Value::Object(map);
        assert_eq!(get_by_path(&doc, &path), Value::from("v"));
    }

    #[test]
    fn test_literals() {
        assert!(is_literal_number("3"));
        assert!(is_literal_number("3.25"));
        assert!(!is_literal_number("3."));
        assert!(!is_literal_number("a3"));
        assert_eq!(literal_string("'hello'"), Some("hello"));
        assert_eq!(literal_string("\"x'"), None);
        assert!(!is_literal_string("\""));
    }

    #[test]
    fn test_sanitize_leading_digit() {
        assert_eq!(sanitize_identifier("3"), "_");
        assert_eq!(sanitize_identifier("a.1b"), "a._b");
    }

    #[test]
    fn test_sanitize_never_leaves_empty_segments() {
        assert_eq!(sanitize_identifier("v1."), "v1_");
        assert_eq!(sanitize_identifier(".a"), "_a");
        assert_eq!(sanitize_identifier("a..b"), "a._b");
        for text in ["v1.", "a + '..'", "...", "x.[0]."] {
            assert!(is_valid_key_path(&sanitize_identifier(text)), "{}", text);
        }
    }
}
