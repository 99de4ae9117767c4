//! String, predicate, conversion and math built-ins.

use std::cmp::Ordering;

use regex::Regex;

use super::{finite, number_arg};
use crate::Value;

/// `substr(text, start[, length])`, counted in characters.
///
/// Out-of-range positions yield Null rather than clamping.
pub fn substr(args: &[Value]) -> Value {
    let Some(Value::String(text)) = args.first() else {
        return Value::Null;
    };
    if args.len() == 1 {
        return Value::String(text.clone());
    }

    let count = text.chars().count();
    let Some(start) = args[1].as_int().ok().and_then(|n| usize::try_from(n).ok()) else {
        return Value::Null;
    };
    let end = match args.get(2) {
        None => count,
        Some(length) => match length.as_int().ok().and_then(|n| usize::try_from(n).ok()) {
            Some(length) => start.saturating_add(length),
            None => return Value::Null,
        },
    };
    if start > count || end > count {
        return Value::Null;
    }

    Value::String(text.chars().skip(start).take(end - start).collect())
}

/// `inrange(target, low, high)`: half-open `[low, high)`, or its complement
/// when `low > high` so the range wraps around.
pub fn inrange(args: &[Value]) -> Value {
    let [target, low, high, ..] = args else {
        return Value::Null;
    };

    match (compare(low, high), compare(target, low), compare(target, high)) {
        (Some(range), Some(to_low), Some(to_high)) => {
            let above_low = to_low != Ordering::Less;
            let below_high = to_high == Ordering::Less;
            Value::Boolean(if range == Ordering::Greater {
                above_low || below_high
            } else {
                above_low && below_high
            })
        }
        _ => Value::Null,
    }
}

/// Ordering of two Numbers or two Strings; anything else is incomparable.
fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// `regex(text, pattern)`: unanchored match. Never Null.
pub fn regex(args: &[Value]) -> Value {
    let (Some(Value::String(text)), Some(Value::String(pattern))) = (args.first(), args.get(1))
    else {
        return Value::Boolean(false);
    };
    match Regex::new(pattern) {
        Ok(re) => Value::Boolean(re.is_match(text)),
        Err(err) => {
            log::debug!("regex(): invalid pattern {:?}: {}", pattern, err);
            Value::Boolean(false)
        }
    }
}

/// `in(target, candidates...)`. With exactly one candidate that is an Array,
/// its elements are the candidates.
pub fn in_list(args: &[Value]) -> Value {
    let (target, candidates) = match args {
        [Value::Null, ..] | [_, Value::Null, ..] | [] | [_] => return Value::Boolean(false),
        [target, Value::Array(items)] => (target, items.as_slice()),
        [target, rest @ ..] => (target, rest),
    };
    Value::Boolean(candidates.iter().any(|c| target.approx_eq(c)))
}

/// `nullif(a, b)`: Null when `a` equals `b`, `a` otherwise.
pub fn nullif(args: &[Value]) -> Value {
    match args {
        [a, b, ..] if !a.approx_eq(b) => a.clone(),
        _ => Value::Null,
    }
}

/// `ifnull(x)`: whether `x` is Null. A missing argument counts as Null.
pub fn ifnull(args: &[Value]) -> Value {
    Value::Boolean(args.first().is_none_or(Value::is_null))
}

/// `iif(cond, then, else)`
pub fn iif(args: &[Value]) -> Value {
    match args {
        [Value::Boolean(true), then, _, ..] => then.clone(),
        [Value::Boolean(false), _, otherwise, ..] => otherwise.clone(),
        _ => Value::Null,
    }
}

/// Numbers and numeric strings, truncated toward zero.
pub fn int(args: &[Value]) -> Value {
    match args.first() {
        Some(Value::Number(n)) => finite(n.trunc()),
        Some(Value::String(s)) => parse_number(s).map_or(Value::Null, |n| finite(n.trunc())),
        _ => Value::Null,
    }
}

pub fn float(args: &[Value]) -> Value {
    match args.first() {
        Some(Value::Number(n)) => finite(*n),
        Some(Value::String(s)) => parse_number(s).map_or(Value::Null, finite),
        _ => Value::Null,
    }
}

/// Numbers print without a trailing `.0`; strings pass through.
pub fn string(args: &[Value]) -> Value {
    match args.first() {
        Some(Value::Number(n)) => Value::String(n.to_string()),
        Some(Value::String(s)) => Value::String(s.clone()),
        _ => Value::Null,
    }
}

fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok()
}

fn unary_math(args: &[Value], f: fn(f64) -> f64) -> Value {
    number_arg(args, 0).map_or(Value::Null, |n| finite(f(n)))
}

pub fn abs(args: &[Value]) -> Value {
    unary_math(args, f64::abs)
}

pub fn sqrt(args: &[Value]) -> Value {
    unary_math(args, f64::sqrt)
}

pub fn exp(args: &[Value]) -> Value {
    unary_math(args, f64::exp)
}

pub fn ceil(args: &[Value]) -> Value {
    unary_math(args, f64::ceil)
}

pub fn floor(args: &[Value]) -> Value {
    unary_math(args, f64::floor)
}

pub fn power(args: &[Value]) -> Value {
    match (number_arg(args, 0), number_arg(args, 1)) {
        (Some(base), Some(exponent)) => finite(base.powf(exponent)),
        _ => Value::Null,
    }
}
