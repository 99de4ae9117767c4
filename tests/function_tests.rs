// tests/function_tests.rs

use sql_rules::{Filter, Value, default_functions};

const DOC: &str = r#"{"a":1,"b":{"c":[1,2,3,4,5]},"c":"123456789","t":[3,null,"x"]}"#;

fn eval(expr: &str) -> Value {
    let doc = Value::from_json_str(DOC).unwrap();
    Filter::compile(expr, None).unwrap().evaluate(&doc)
}

fn n(x: f64) -> Value {
    Value::Number(x)
}

fn s(text: &str) -> Value {
    Value::from(text)
}

// ============================================================================
// Aggregates
// ============================================================================

#[test]
fn test_aggregates_over_paths() {
    assert_eq!(eval("sum(b.c)"), n(15.0));
    assert_eq!(eval("average(b.c)"), n(3.0));
    assert_eq!(eval("max(b.c)"), n(5.0));
    assert_eq!(eval("min(b.c)"), n(1.0));
    assert_eq!(eval("len(b.c)"), n(5.0));
}

#[test]
fn test_aggregates_over_arguments() {
    assert_eq!(eval("sum(1, 2, a)"), n(4.0));
    assert_eq!(eval("max(a, 7, 3)"), n(7.0));
    assert_eq!(eval("len(1, 2, 3)"), n(3.0));
    assert_eq!(eval("len(c)"), n(9.0));
    assert_eq!(eval("len(b)"), n(1.0));
}

#[test]
fn test_aggregates_with_bad_elements() {
    assert_eq!(eval("sum(t)"), n(0.0));
    assert_eq!(eval("average(t)"), Value::Null);
    assert_eq!(eval("max(t)"), Value::Null);
    assert_eq!(eval("sum(missing)"), n(0.0));
}

#[test]
fn test_array() {
    assert_eq!(eval("array(1, a, 3)"), Value::Array(vec![n(1.0), n(1.0), n(3.0)]));
    assert_eq!(eval("array()"), Value::Array(vec![]));
}

// ============================================================================
// Strings and predicates
// ============================================================================

#[test]
fn test_substr() {
    assert_eq!(eval("Substr(c, 2, 4)"), s("3456"));
    assert_eq!(eval("substr(c, 2)"), s("3456789"));
    assert_eq!(eval("substr(c, 20)"), Value::Null);
}

#[test]
fn test_regex() {
    assert_eq!(eval("regex(c, '^12[0-9]+9$')"), Value::Boolean(true));
    assert_eq!(eval("regex(c, 'abc')"), Value::Boolean(false));
    assert_eq!(eval("regex(c, '(')"), Value::Boolean(false));
    assert_eq!(eval("regex(a, '1')"), Value::Boolean(false));
}

#[test]
fn test_in_function() {
    assert_eq!(eval("in(a, 3, 2, 1)"), Value::Boolean(true));
    assert_eq!(eval("in(3, b.c)"), Value::Boolean(true));
    assert_eq!(eval("in(9, b.c)"), Value::Boolean(false));
    assert_eq!(eval("in(missing, 1)"), Value::Boolean(false));
}

#[test]
fn test_inrange() {
    assert_eq!(eval("inrange(a, 1, 3)"), Value::Boolean(true));
    assert_eq!(eval("inrange(3, 1, 3)"), Value::Boolean(false));
    // low > high wraps around
    assert_eq!(eval("inrange(23, 22, 6)"), Value::Boolean(true));
    assert_eq!(eval("inrange(12, 22, 6)"), Value::Boolean(false));
    assert_eq!(eval("inrange('b', 'a', 'c')"), Value::Boolean(true));
    assert_eq!(eval("inrange(1, 'a', 3)"), Value::Null);
}

#[test]
fn test_null_helpers() {
    assert_eq!(eval("ifnull(missing)"), Value::Boolean(true));
    assert_eq!(eval("ifnull(a)"), Value::Boolean(false));
    assert_eq!(eval("nullif(a, 1)"), Value::Null);
    assert_eq!(eval("nullif(a, 2)"), n(1.0));
}

#[test]
fn test_iif() {
    assert_eq!(eval("iif(a == 1, 'one', 'other')"), s("one"));
    assert_eq!(eval("iif(a == 2, 'one', 'other')"), s("other"));
    assert_eq!(eval("iif(a, 'one', 'other')"), Value::Null);
}

// ============================================================================
// Conversion and math
// ============================================================================

#[test]
fn test_conversions() {
    assert_eq!(eval("int('3.7')"), n(3.0));
    assert_eq!(eval("int(-2.5)"), n(-2.0));
    assert_eq!(eval("float('2.5')"), n(2.5));
    assert_eq!(eval("float('abc')"), Value::Null);
    assert_eq!(eval("string(12)"), s("12"));
    assert_eq!(eval("string(1.5)"), s("1.5"));
    assert_eq!(eval("string(true)"), Value::Null);
}

#[test]
fn test_math() {
    assert_eq!(eval("ceil(1.5)"), n(2.0));
    assert_eq!(eval("floor(1.5)"), n(1.0));
    assert_eq!(eval("abs(0 - 3)"), n(3.0));
    assert_eq!(eval("sqrt(16)"), n(4.0));
    assert_eq!(eval("sqrt(0 - 1)"), Value::Null);
    assert_eq!(eval("power(2, 10)"), n(1024.0));
    assert_eq!(eval("exp(0)"), n(1.0));
}

// ============================================================================
// Date and time
// ============================================================================

#[test]
fn test_timestamp_components_round_trip() {
    let ts = eval("timestamp(2021, 3, 14, 15, 9, 26)");
    assert!(matches!(ts, Value::Number(_)));

    assert_eq!(eval("year(timestamp(2021, 3, 14, 15, 9, 26))"), n(2021.0));
    assert_eq!(eval("month(timestamp(2021, 3, 14, 15, 9, 26))"), n(3.0));
    assert_eq!(eval("day(timestamp(2021, 3, 14, 15, 9, 26))"), n(14.0));
    assert_eq!(eval("minute(timestamp(2021, 3, 14, 15, 9, 26))"), n(9.0));
    assert_eq!(eval("second(timestamp(2021, 3, 14, 15, 9, 26))"), n(26.0));
}

#[test]
fn test_current_timestamp_year() {
    let year = eval("year(currenttimestamp())");
    assert!(matches!(year, Value::Number(y) if y >= 2024.0));
    assert!(matches!(eval("string(year(currenttimestamp()))"), Value::String(_)));
}

#[test]
fn test_date_functions_reject_non_numbers() {
    assert_eq!(eval("year('now')"), Value::Null);
    assert_eq!(eval("timestamp('2021')"), Value::Null);
}

#[test]
fn test_builtin_names() {
    let names = default_functions().names();
    for name in ["sum", "substr", "currenttimestamp", "in", "iif", "power"] {
        assert!(names.contains(&name), "missing builtin {}", name);
    }
    let mut sorted = names.clone();
    sorted.sort_unstable();
    assert_eq!(names, sorted);
}
