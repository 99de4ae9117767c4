use std::collections::HashMap;

use thiserror::Error;

/// Tolerance used wherever two numbers are compared "loosely", e.g. by `in()`
/// and `nullif()`.
pub const NUMBER_TOLERANCE: f64 = 1e-6;

/// A document value as seen by filters and mappers.
///
/// Every JSON number becomes a [`Value::Number`]; there is no separate integer
/// kind. Objects are unordered.
///
/// # Examples
///
/// ```
/// use sql_rules::Value;
/// use std::collections::HashMap;
///
/// let null = Value::Null;
/// let number = Value::Number(42.0);
/// let string = Value::String("hello".to_string());
///
/// let array = Value::Array(vec![Value::Number(1.0), Value::Number(2.0)]);
///
/// let mut obj = HashMap::new();
/// obj.insert("key".to_string(), Value::String("value".to_string()));
/// let object = Value::Object(obj);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// JSON null, also the result of every failed evaluation
    #[default]
    Null,

    /// JSON boolean (true/false)
    Boolean(bool),

    /// Any JSON number
    Number(f64),

    /// UTF-8 string
    String(String),

    /// Array of values (homogeneous or heterogeneous)
    Array(Vec<Value>),

    /// Object with string keys
    Object(HashMap<String, Value>),
}

/// Returned when a value cannot be read as the requested kind.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("cannot use {found} as {expected}")]
pub struct CoercionError {
    pub expected: &'static str,
    pub found: &'static str,
}

impl Value {
    /// An empty object, the starting point of every mapper.
    pub fn object() -> Self {
        Value::Object(HashMap::new())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Human-readable kind name, used in error messages and `typeof`-style output.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    /// Read the value as a number.
    ///
    /// Only [`Value::Number`] qualifies; strings are never parsed here.
    pub fn as_number(&self) -> Result<f64, CoercionError> {
        match self {
            Value::Number(n) => Ok(*n),
            other => Err(CoercionError {
                expected: "number",
                found: other.type_name(),
            }),
        }
    }

    /// Read the value as a 64-bit integer, truncating any fraction.
    pub fn as_int(&self) -> Result<i64, CoercionError> {
        self.as_number().map(|n| n as i64)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&HashMap<String, Value>> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// True only for `Boolean(true)`. Filters match on exactly this.
    pub fn is_true(&self) -> bool {
        matches!(self, Value::Boolean(true))
    }

    /// Equality that treats numbers within [`NUMBER_TOLERANCE`] as equal and
    /// falls back to structural equality for everything else.
    pub fn approx_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => (a - b).abs() < NUMBER_TOLERANCE,
            (a, b) => a == b,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<HashMap<String, Value>> for Value {
    fn from(map: HashMap<String, Value>) -> Self {
        Value::Object(map)
    }
}
