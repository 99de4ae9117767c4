//! Counting, summing and collecting built-ins.
//!
//! Each of these accepts either a single Array argument or any number of
//! scalar arguments; Null elements are skipped.

use crate::Value;

/// The values an aggregate runs over: the elements of a lone Array argument,
/// otherwise the argument list itself. Nulls are dropped.
fn elements(args: &[Value]) -> impl Iterator<Item = &Value> {
    let items = match args {
        [Value::Array(items)] => items.as_slice(),
        _ => args,
    };
    items.iter().filter(|v| !v.is_null())
}

/// Every element as a number, or `None` if any of them is not one.
fn numbers(args: &[Value]) -> Option<Vec<f64>> {
    elements(args).map(|v| v.as_number().ok()).collect()
}

/// `len(x)`: elements of an Array, characters of a String, keys of an Object,
/// `1` for any other non-Null value.
pub fn len(args: &[Value]) -> Value {
    let count = match args {
        [Value::Null] => return Value::Null,
        [Value::Array(items)] => items.len(),
        [Value::String(s)] => s.chars().count(),
        [Value::Object(map)] => map.len(),
        [_] => 1,
        _ => args.len(),
    };
    Value::Number(count as f64)
}

/// `sum(...)`: `0` for no input, and also for input holding a non-number.
pub fn sum(args: &[Value]) -> Value {
    let total = numbers(args).map_or(0.0, |ns| ns.iter().sum::<f64>());
    super::finite(total)
}

pub fn average(args: &[Value]) -> Value {
    match numbers(args) {
        Some(ns) if !ns.is_empty() => super::finite(ns.iter().sum::<f64>() / ns.len() as f64),
        _ => Value::Null,
    }
}

fn extremum(args: &[Value], pick: fn(f64, f64) -> f64) -> Value {
    numbers(args)
        .and_then(|ns| ns.into_iter().reduce(pick))
        .map_or(Value::Null, Value::Number)
}

pub fn max(args: &[Value]) -> Value {
    extremum(args, f64::max)
}

pub fn min(args: &[Value]) -> Value {
    extremum(args, f64::min)
}

/// `array(...)`: the arguments, in order.
pub fn array(args: &[Value]) -> Value {
    Value::Array(args.to_vec())
}
