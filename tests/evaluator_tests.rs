// tests/evaluator_tests.rs

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use sql_rules::{Filter, FunctionTable, Value};

const DOC: &str = r#"{"a":1,"b":{"c":[1,2,3,4,5]},"c":"123456789","e":{"f":2}}"#;
const OTHER: &str = r#"{"a":5,"b":{"c":[6,5,4,3,2,1]},"c":"987654321"}"#;

fn doc(text: &str) -> Value {
    Value::from_json_str(text).unwrap()
}

fn eval(expr: &str, input: &str) -> Value {
    Filter::compile(expr, None).unwrap().evaluate(&doc(input))
}

fn matches(expr: &str, input: &str) -> bool {
    Filter::compile(expr, None).unwrap().matches(&doc(input))
}

// ============================================================================
// Filters
// ============================================================================

#[test]
fn test_canonical_filter() {
    let filter = "a < 2 && (b.c[4] == 5 || e.f == 2)";
    assert!(matches(filter, DOC));
    assert!(!matches(filter, OTHER));
}

#[test]
fn test_sql_filter() {
    let filter = "a < 2 and (b.c[4] = 5 or e.f = 2)";
    assert!(matches(filter, DOC));
    assert!(!matches(filter, OTHER));
}

#[test]
fn test_mixed_and_or() {
    let filter = "a < 2 && b == 5 || c == 2";
    assert!(matches(filter, r#"{"a": 1, "b": 5, "c": 3}"#));
    assert!(matches(filter, r#"{"a": 1, "b": 6, "c": 2}"#));
    assert!(!matches(filter, r#"{"a": 1, "b": 6, "c": 3}"#));
}

#[test]
fn test_strings_and_mismatched_kinds() {
    let filter = r#"name == "aaa" && value < 2 || c >= "bbb""#;
    assert!(matches(filter, r#"{"value": 1, "name": "aaa", "c": 3}"#));
    assert!(matches(filter, r#"{"value": 1, "name": "bbb", "c": "ccc"}"#));
    assert!(!matches(filter, r#"{"value": 1, "name": 6, "c": 3}"#));
}

#[test]
fn test_boolean_fields() {
    let filter = "a == true && b == false";
    assert!(matches(filter, r#"{"a": true, "b": false}"#));
    assert!(!matches(filter, r#"{"a": true, "b": true}"#));
    assert!(!matches(filter, r#"{"a": true, "b": 1}"#));
}

#[test]
fn test_only_true_matches() {
    assert!(!matches("a", r#"{"a": 1}"#));
    assert!(!matches("a", r#"{"a": "true"}"#));
    assert!(!matches("missing", "{}"));
    assert!(matches("a", r#"{"a": true}"#));
    assert_eq!(eval("a == 1", r#"{"a": 1}"#).as_bool(), Some(true));
}

// ============================================================================
// Paths
// ============================================================================

#[test]
fn test_root_of_array_document() {
    let input = r#"[{"a":1,"b":{"c":[1,2,3]}}]"#;
    assert_eq!(eval("sum(root[0].b.c)", input), Value::Number(6.0));
    assert!(matches("root[0].a < 2", input));
}

#[test]
fn test_wildcard_projection() {
    let input = r#"{"items": [{"n": 1}, {"n": 2}, {"m": 3}]}"#;
    assert_eq!(
        eval("items[*].n", input),
        Value::Array(vec![Value::Number(1.0), Value::Number(2.0)])
    );
    assert_eq!(eval("sum(items[*].n)", input), Value::Number(3.0));
    assert_eq!(eval("len(items[*])", input), Value::Number(3.0));
}

#[test]
fn test_missing_paths_are_null() {
    assert_eq!(eval("x.y.z", DOC), Value::Null);
    assert_eq!(eval("b.c[10]", DOC), Value::Null);
    assert_eq!(eval("a.b", DOC), Value::Null);
    assert_eq!(eval("b.c['x']", DOC), Value::Null);
}

// ============================================================================
// Operators
// ============================================================================

#[test]
fn test_arithmetic() {
    assert_eq!(eval("b.c[2] + b.c[3]", DOC), Value::Number(7.0));
    assert_eq!(eval("7 / 2", "{}"), Value::Number(3.5));
    assert_eq!(eval("1.1 * 3", "{}"), Value::Number(3.3));
    assert_eq!(eval("1 - 0.9", "{}"), Value::Number(0.1));
    assert_eq!(eval("-a + 1", DOC), Value::Number(0.0));
}

#[test]
fn test_arithmetic_keeps_full_precision() {
    let tiny = r#"{"x": 1e-30}"#;
    let x = eval("x", tiny).as_number().unwrap();
    assert!(x > 0.0);
    assert_eq!(eval("x * 1", tiny), Value::Number(x));
    assert_eq!(eval("x + x", tiny), Value::Number(x + x));
    assert!(matches("x * 1 == x", tiny));

    for input in [r#"{"y": 1e-20}"#, r#"{"y": 1e-200}"#] {
        let y = eval("y", input).as_number().unwrap();
        assert_eq!(eval("y / 3", input), Value::Number(y / 3.0));
    }
}

#[test]
fn test_division_by_zero_is_null() {
    assert_eq!(eval("1 / 0", "{}"), Value::Null);
    assert_eq!(eval("5 % 0", "{}"), Value::Null);
    assert!(!matches("1 / 0 > 0", "{}"));
}

#[test]
fn test_integer_operators() {
    assert_eq!(eval("7 % 3", "{}"), Value::Number(1.0));
    assert_eq!(eval("6 & 3", "{}"), Value::Number(2.0));
    assert_eq!(eval("6 | 3", "{}"), Value::Number(7.0));
    assert_eq!(eval("6 ^ 3", "{}"), Value::Number(5.0));
    assert_eq!(eval("16 >> 2", "{}"), Value::Number(4.0));
    assert_eq!(eval("^0", "{}"), Value::Number(-1.0));
}

#[test]
fn test_string_concatenation_and_ordering() {
    assert_eq!(eval("'ab' + 'cd'", "{}"), Value::from("abcd"));
    assert_eq!(eval("'abc' < 'abd'", "{}"), Value::Boolean(true));
    assert_eq!(eval("'a' - 'b'", "{}"), Value::Null);
}

#[test]
fn test_not() {
    assert!(matches("NOT (a > 1)", r#"{"a": 1}"#));
    // `NOT` binds tighter than comparisons
    assert!(!matches("NOT a > 1", r#"{"a": 1}"#));
    assert_eq!(eval("!a", r#"{"a": 1}"#), Value::Null);
}

#[test]
fn test_in_operator() {
    assert!(matches("a IN (1, 2, 3)", DOC));
    assert!(!matches("a IN (2, 3)", DOC));
    assert!(matches("c in ('x', '123456789')", DOC));
    assert!(matches("b.c[0] in (0.9999999)", DOC));
    assert_eq!(eval("a in (1, 2)", DOC), eval("in(a, 1, 2)", DOC));
}

#[test]
fn test_logical_operands_must_be_boolean() {
    assert_eq!(eval("1 && true", "{}"), Value::Null);
    assert_eq!(eval("true || 1", "{}"), Value::Null);
    // a Null left side counts as false
    assert_eq!(eval("missing || true", "{}"), Value::Boolean(true));
    assert_eq!(eval("missing || false", "{}"), Value::Boolean(false));
}

// ============================================================================
// Evaluation order
// ============================================================================

fn counting_table() -> (Arc<FunctionTable>, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let mut table = FunctionTable::new();
    table.register("touch", move |_: &[Value]| {
        counter.fetch_add(1, Ordering::SeqCst);
        Value::Boolean(true)
    });
    (Arc::new(table), calls)
}

#[test]
fn test_and_skips_left_when_right_is_false() {
    let (table, calls) = counting_table();
    let filter = Filter::compile("touch() AND a > 10", Some(table)).unwrap();

    assert!(!filter.matches(&doc(DOC)));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_and_evaluates_right_first() {
    let (table, calls) = counting_table();
    let filter = Filter::compile("a > 10 AND touch()", Some(table)).unwrap();

    assert!(!filter.matches(&doc(DOC)));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_or_skips_left_when_right_is_true() {
    let (table, calls) = counting_table();
    let filter = Filter::compile("touch() OR a == 1", Some(table)).unwrap();

    assert!(filter.matches(&doc(DOC)));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_unknown_function_is_null() {
    assert_eq!(eval("nosuchfn(1)", "{}"), Value::Null);
    assert!(matches("nosuchfn(1) == null", "{}"));
    assert!(matches("ifnull(nosuchfn(1))", "{}"));
}

#[test]
fn test_function_names_are_case_insensitive() {
    assert_eq!(eval("SUM(b.c)", DOC), Value::Number(15.0));
    assert_eq!(eval("Max(b.c)", DOC), Value::Number(5.0));
}

#[test]
fn test_filter_is_shareable_across_threads() {
    let filter = Arc::new(Filter::compile("a < 2", None).unwrap());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let filter = Arc::clone(&filter);
            std::thread::spawn(move || filter.matches(&doc(&format!(r#"{{"a": {}}}"#, i))))
        })
        .collect();
    let results: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results, vec![true, true, false, false]);
}
