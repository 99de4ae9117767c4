//! Function tables and the built-in function library.
//!
//! Functions are looked up by lowercase name. Every compiled filter or mapper
//! carries a [`FunctionScope`]: an optional override table consulted first,
//! then the process-wide [`default_functions`].

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::Value;

pub mod aggregate;
pub mod datetime;
pub mod scalar;

/// A native function. Receives evaluated arguments and never fails: bad input
/// produces `Null` or a documented default.
pub type NativeFn = Arc<dyn Fn(&[Value]) -> Value + Send + Sync>;

type Builtin = fn(&[Value]) -> Value;

/// Every built-in, by name.
const BUILTINS: &[(&str, Builtin)] = &[
    // aggregate
    ("len", aggregate::len),
    ("sum", aggregate::sum),
    ("average", aggregate::average),
    ("max", aggregate::max),
    ("min", aggregate::min),
    ("array", aggregate::array),
    // strings and predicates
    ("substr", scalar::substr),
    ("inrange", scalar::inrange),
    ("regex", scalar::regex),
    ("in", scalar::in_list),
    ("nullif", scalar::nullif),
    ("ifnull", scalar::ifnull),
    ("iif", scalar::iif),
    // conversion
    ("int", scalar::int),
    ("float", scalar::float),
    ("string", scalar::string),
    // math
    ("abs", scalar::abs),
    ("power", scalar::power),
    ("sqrt", scalar::sqrt),
    ("exp", scalar::exp),
    ("ceil", scalar::ceil),
    ("floor", scalar::floor),
    // date and time
    ("timestamp", datetime::timestamp),
    ("currenttimestamp", datetime::current_timestamp),
    ("year", datetime::year),
    ("month", datetime::month),
    ("day", datetime::day),
    ("hour", datetime::hour),
    ("minute", datetime::minute),
    ("second", datetime::second),
];

/// Name → function mapping with case-insensitive names.
#[derive(Clone, Default)]
pub struct FunctionTable {
    functions: HashMap<String, NativeFn>,
}

impl FunctionTable {
    /// An empty table, typically used for per-rule overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// A table holding every built-in function.
    pub fn with_builtins() -> Self {
        let mut table = Self::new();
        for (name, f) in BUILTINS {
            table.register(name, *f);
        }
        table
    }

    /// Register `f` under `name`, replacing any earlier binding.
    pub fn register<F>(&mut self, name: &str, f: F) -> &mut Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        self.insert(name, Arc::new(f))
    }

    /// Like [`FunctionTable::register`], for an already shared function.
    pub fn insert(&mut self, name: &str, f: NativeFn) -> &mut Self {
        self.functions.insert(name.to_lowercase(), f);
        self
    }

    pub fn get(&self, name: &str) -> Option<&NativeFn> {
        self.functions.get(&name.to_lowercase())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Call `name`, or return `None` when it is not registered.
    pub fn call(&self, name: &str, args: &[Value]) -> Option<Value> {
        self.get(name).map(|f| f(args))
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl fmt::Debug for FunctionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionTable")
            .field("functions", &self.names())
            .finish()
    }
}

static DEFAULT_FUNCTIONS: OnceLock<FunctionTable> = OnceLock::new();

/// The built-in table, constructed on first use and read-only afterwards.
#[inline]
pub fn default_functions() -> &'static FunctionTable {
    DEFAULT_FUNCTIONS.get_or_init(FunctionTable::with_builtins)
}

/// The functions visible to one compiled artifact.
#[derive(Debug, Clone, Default)]
pub struct FunctionScope {
    overrides: Option<Arc<FunctionTable>>,
}

impl FunctionScope {
    /// Built-ins only.
    pub fn defaults() -> Self {
        Self::default()
    }

    /// `overrides` first, then the built-ins.
    pub fn with_overrides(overrides: Arc<FunctionTable>) -> Self {
        FunctionScope {
            overrides: Some(overrides),
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&NativeFn> {
        self.overrides
            .as_deref()
            .and_then(|table| table.get(name))
            .or_else(|| default_functions().get(name))
    }
}

impl From<Option<Arc<FunctionTable>>> for FunctionScope {
    fn from(overrides: Option<Arc<FunctionTable>>) -> Self {
        FunctionScope { overrides }
    }
}

/// Numeric value of an argument, if it is a number.
pub(crate) fn number_arg(args: &[Value], index: usize) -> Option<f64> {
    args.get(index).and_then(|v| v.as_number().ok())
}

/// Keep finite results, turn NaN and infinities into `Null`.
pub(crate) fn finite(n: f64) -> Value {
    if n.is_finite() {
        Value::Number(n)
    } else {
        Value::Null
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_registration() {
        let mut table = FunctionTable::new();
        table.register("ClientId", |_| Value::from("c1"));
        assert!(table.contains("clientid"));
        assert_eq!(table.call("CLIENTID", &[]), Some(Value::from("c1")));
    }

    #[test]
    fn test_override_shadows_default() {
        let mut table = FunctionTable::new();
        table.register("sum", |_| Value::from("shadowed"));
        let scope = FunctionScope::with_overrides(Arc::new(table));

        let f = scope.lookup("SUM").unwrap();
        assert_eq!(f(&[]), Value::from("shadowed"));
        assert!(scope.lookup("max").is_some());
        assert!(scope.lookup("nope").is_none());
    }

    #[test]
    fn test_every_builtin_registered() {
        assert_eq!(default_functions().len(), BUILTINS.len());
    }
}
