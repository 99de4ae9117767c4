use std::borrow::Cow;

use rust_decimal::{Decimal, prelude::FromPrimitive, prelude::ToPrimitive};

use crate::{
    ast::{BinOp, Expr, Index, UnaryOp},
    function::FunctionScope,
    value::Value,
};

/// Identifier bound to the whole document.
pub const ROOT: &str = "root";

/// Tree-walking resolver for parsed expressions.
///
/// Evaluation never fails. A missing field, a type mismatch, a bad index, a
/// division by zero or an unknown function all turn the affected
/// subexpression into [`Value::Null`] and evaluation carries on. Internally
/// every step returns `Option`, and `None` is Null.
///
/// Values are borrowed from the document for as long as possible, so walking
/// a path like `a.b.c[2]` copies only the final value.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'f> {
    functions: &'f FunctionScope,
}

impl<'f> Evaluator<'f> {
    pub fn new(functions: &'f FunctionScope) -> Self {
        Evaluator { functions }
    }

    /// Evaluates an expression against a document.
    ///
    /// # Arguments
    ///
    /// * `expr` - The parsed expression
    /// * `document` - The value identifiers are resolved against
    ///
    /// # Examples
    ///
    /// ```
    /// use sql_rules::{Evaluator, FunctionScope, Value};
    /// use sql_rules::parser::parse_expression;
    ///
    /// let doc = Value::from_json_str(r#"{"b": {"c": [1, 2, 3]}}"#).unwrap();
    /// let expr = parse_expression("b.c[2] * 2").unwrap();
    ///
    /// let scope = FunctionScope::defaults();
    /// assert_eq!(Evaluator::new(&scope).evaluate(&expr, &doc), Value::Number(6.0));
    /// ```
    pub fn evaluate(&self, expr: &Expr, document: &Value) -> Value {
        self.eval(expr, document)
            .map(Cow::into_owned)
            .unwrap_or_default()
    }

    fn eval<'d>(&self, expr: &Expr, doc: &'d Value) -> Option<Cow<'d, Value>> {
        match expr {
            Expr::Literal(value) => Some(Cow::Owned(value.clone())),
            Expr::Identifier(name) => resolve_identifier(name, doc).map(Cow::Borrowed),
            Expr::Field { base, name } => match self.eval(base, doc)? {
                Cow::Borrowed(value) => field(value, name),
                Cow::Owned(value) => field(&value, name).map(|v| Cow::Owned(v.into_owned())),
            },
            Expr::Index { base, index } => {
                let base = self.eval(base, doc)?;
                let at = match index {
                    Index::Wildcard => return Some(base),
                    Index::At(index) => self.eval(index, doc)?.as_number().ok()?,
                };
                match base {
                    Cow::Borrowed(value) => element(value, at),
                    Cow::Owned(value) => element(&value, at).map(|v| Cow::Owned(v.into_owned())),
                }
            }
            Expr::Binary { op, left, right } if op.is_logical() => {
                self.logical(*op, left, right, doc).map(Cow::Owned)
            }
            Expr::Binary { op, left, right } => {
                // right before left, like the logical operators
                let right = self.eval_or_null(right, doc);
                let left = self.eval_or_null(left, doc);
                binary(*op, &left, &right).map(Cow::Owned)
            }
            Expr::Unary { op, operand } => unary(*op, &*self.eval(operand, doc)?).map(Cow::Owned),
            Expr::Call { name, args } => {
                let args: Vec<Value> = args
                    .iter()
                    .map(|arg| self.eval_or_null(arg, doc).into_owned())
                    .collect();
                let function = self.functions.lookup(name)?;
                Some(Cow::Owned(function(&args)))
            }
            Expr::Group(inner) => self.eval(inner, doc),
        }
    }

    fn eval_or_null<'d>(&self, expr: &Expr, doc: &'d Value) -> Cow<'d, Value> {
        self.eval(expr, doc).unwrap_or(Cow::Owned(Value::Null))
    }

    /// `&&` and `||` evaluate their right operand first and only look at the
    /// left one when the right one did not decide the result.
    fn logical(&self, op: BinOp, left: &Expr, right: &Expr, doc: &Value) -> Option<Value> {
        let right = self.eval_or_null(right, doc);
        match (op, right.as_ref()) {
            (BinOp::And, Value::Null | Value::Boolean(false)) => return Some(Value::Boolean(false)),
            (BinOp::Or, Value::Boolean(true)) => return Some(Value::Boolean(true)),
            (_, Value::Null | Value::Boolean(_)) => {}
            _ => return None,
        }

        match self.eval_or_null(left, doc).as_ref() {
            Value::Null => Some(Value::Boolean(false)),
            Value::Boolean(b) => Some(Value::Boolean(*b)),
            _ => None,
        }
    }
}

/// Top-level field of an Object document. `root` falls back to the document
/// itself when no field of that name exists.
fn resolve_identifier<'d>(name: &str, doc: &'d Value) -> Option<&'d Value> {
    let found = match doc {
        Value::Object(map) => map.get(name),
        _ => None,
    };
    found.or_else(|| (name == ROOT).then_some(doc))
}

/// `.name` on an Object, or on every Object of an Array.
fn field<'v>(base: &'v Value, name: &str) -> Option<Cow<'v, Value>> {
    match base {
        Value::Object(map) => map.get(name).map(Cow::Borrowed),
        Value::Array(items) => Some(Cow::Owned(Value::Array(
            items
                .iter()
                .filter_map(|item| item.as_object()?.get(name).cloned())
                .collect(),
        ))),
        _ => None,
    }
}

/// `[at]` on an Array or a String (one-character String).
fn element(base: &Value, at: f64) -> Option<Cow<'_, Value>> {
    if at < 0.0 {
        return None;
    }
    let at = at as usize;
    match base {
        Value::Array(items) => items.get(at).map(Cow::Borrowed),
        Value::String(s) => s
            .chars()
            .nth(at)
            .map(|ch| Cow::Owned(Value::String(ch.to_string()))),
        _ => None,
    }
}

/// Numbers first, then Strings, then plain equality; anything else is Null.
fn binary(op: BinOp, left: &Value, right: &Value) -> Option<Value> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => numeric(op, *a, *b),
        (Value::String(a), Value::String(b)) => textual(op, a, b),
        _ => match op {
            BinOp::Equal => Some(Value::Boolean(left == right)),
            BinOp::NotEqual => Some(Value::Boolean(left != right)),
            _ => None,
        },
    }
}

fn numeric(op: BinOp, a: f64, b: f64) -> Option<Value> {
    let value = match op {
        BinOp::Equal => Value::Boolean(a == b),
        BinOp::NotEqual => Value::Boolean(a != b),
        BinOp::LessThan => Value::Boolean(a < b),
        BinOp::GreaterThan => Value::Boolean(a > b),
        BinOp::LessEqual => Value::Boolean(a <= b),
        BinOp::GreaterEqual => Value::Boolean(a >= b),
        BinOp::Add | BinOp::Subtract | BinOp::Multiply | BinOp::Divide => {
            if op == BinOp::Divide && b == 0.0 {
                return None;
            }
            let native = match op {
                BinOp::Add => a + b,
                BinOp::Subtract => a - b,
                BinOp::Multiply => a * b,
                _ => a / b,
            };
            let result = decimal_arithmetic(op, a, b)
                .filter(|exact| within_rounding(*exact, native))
                .unwrap_or(native);
            if !result.is_finite() {
                return None;
            }
            Value::Number(result)
        }
        BinOp::Modulo => {
            let (a, b) = (a as i64, b as i64);
            Value::from(a.checked_rem(b)?)
        }
        BinOp::BitAnd => Value::from(a as i64 & b as i64),
        BinOp::BitOr => Value::from(a as i64 | b as i64),
        BinOp::BitXor => Value::from(a as i64 ^ b as i64),
        BinOp::ShiftLeft => Value::from((a as i64).checked_shl(shift_amount(b)?)?),
        BinOp::ShiftRight => Value::from((a as i64).checked_shr(shift_amount(b)?)?),
        BinOp::And | BinOp::Or => return None,
    };
    Some(value)
}

fn shift_amount(b: f64) -> Option<u32> {
    u32::try_from(b as i64).ok()
}

/// Exact decimal arithmetic, so that `0.1 + 0.2 == 0.3`. `None` when either
/// side does not survive the trip through [`Decimal`] unchanged.
fn decimal_arithmetic(op: BinOp, a: f64, b: f64) -> Option<f64> {
    let (a, b) = (exact_decimal(a)?, exact_decimal(b)?);
    let result = match op {
        BinOp::Add => a.checked_add(b),
        BinOp::Subtract => a.checked_sub(b),
        BinOp::Multiply => a.checked_mul(b),
        BinOp::Divide => a.checked_div(b),
        _ => None,
    }?;
    result.to_f64()
}

fn exact_decimal(n: f64) -> Option<Decimal> {
    let decimal = Decimal::from_f64(n)?;
    (decimal.to_f64()? == n).then_some(decimal)
}

/// The decimal result only replaces the native one when they differ by
/// rounding noise.
fn within_rounding(exact: f64, native: f64) -> bool {
    (exact - native).abs() <= exact.abs().max(native.abs()) * 4.0 * f64::EPSILON
}

fn textual(op: BinOp, a: &str, b: &str) -> Option<Value> {
    let value = match op {
        BinOp::Equal => Value::Boolean(a == b),
        BinOp::NotEqual => Value::Boolean(a != b),
        BinOp::LessThan => Value::Boolean(a < b),
        BinOp::GreaterThan => Value::Boolean(a > b),
        BinOp::LessEqual => Value::Boolean(a <= b),
        BinOp::GreaterEqual => Value::Boolean(a >= b),
        BinOp::Add => Value::String(format!("{}{}", a, b)),
        _ => return None,
    };
    Some(value)
}

fn unary(op: UnaryOp, operand: &Value) -> Option<Value> {
    match (op, operand) {
        (UnaryOp::Not, Value::Boolean(b)) => Some(Value::Boolean(!b)),
        (UnaryOp::Negate, Value::Number(n)) => Some(Value::Number(-n)),
        (UnaryOp::Complement, Value::Number(n)) => Some(Value::from(!(*n as i64))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_expression;

    fn eval(text: &str, doc: &str) -> Value {
        let doc = Value::from_json_str(doc).unwrap();
        let expr = parse_expression(text).unwrap();
        Evaluator::new(&FunctionScope::defaults()).evaluate(&expr, &doc)
    }

    #[test]
    fn test_root_prefers_real_field() {
        assert_eq!(eval("root", r#"{"root": 1}"#), Value::Number(1.0));
        assert_eq!(eval("root[1]", "[5, 6]"), Value::Number(6.0));
    }

    #[test]
    fn test_string_indexing() {
        assert_eq!(eval("s[1]", r#"{"s": "abc"}"#), Value::from("b"));
        assert_eq!(eval("s[3]", r#"{"s": "abc"}"#), Value::Null);
    }

    #[test]
    fn test_decimal_addition() {
        assert_eq!(eval("0.1 + 0.2 == 0.3", "{}"), Value::Boolean(true));
    }

    #[test]
    fn test_shift_out_of_range() {
        assert_eq!(eval("1 << 3", "{}"), Value::Number(8.0));
        assert_eq!(eval("1 << 64", "{}"), Value::Null);
        assert_eq!(eval("1 << -1", "{}"), Value::Null);
    }
}
