// tests/translate_tests.rs

use std::borrow::Cow;

use sql_rules::translate::translate;

fn tr(text: &str) -> String {
    translate(text).unwrap().into_owned()
}

#[test]
fn test_logical_keywords() {
    assert_eq!(
        tr("a < 2 and (b.c[4] = 5 or e.f = 2)"),
        "a < 2 && (b.c[4] == 5 || e.f == 2)"
    );
    assert_eq!(tr("NOT ok AND done"), "! ok && done");
    assert_eq!(tr("a Or b"), "a || b");
}

#[test]
fn test_literal_keywords_are_lowercased() {
    assert_eq!(tr("a = TRUE or b = False"), "a == true || b == false");
    assert_eq!(tr("x != NULL"), "x != null");
}

#[test]
fn test_canonical_text_is_borrowed() {
    let text = "a == true && b != null";
    assert!(matches!(translate(text).unwrap(), Cow::Borrowed(s) if s == text));
}

#[test]
fn test_in_rewrite() {
    assert_eq!(tr("status IN ('open', 'pending')"), r#"in(status, "open", "pending")"#);
    assert_eq!(tr("a.b[0] in (1, 2)"), "in(a.b[0], 1, 2)");
    assert_eq!(tr("sum(b.c) in (6)"), "in(sum(b.c), 6)");
    assert_eq!(tr("x in ()"), "in(x)");
}

#[test]
fn test_in_rewrite_inside_larger_condition() {
    assert_eq!(
        tr("a > 1 and t.k in (1, 2) or z"),
        "a > 1 && in(t.k, 1, 2) || z"
    );
}

#[test]
fn test_canonical_in_call_is_untouched() {
    assert_eq!(tr("in(x, 1, 2)"), "in(x, 1, 2)");
}

#[test]
fn test_wildcard_index() {
    assert_eq!(tr("sum(items[*].price) > 10"), "sum(items[-1].price) > 10");
    assert_eq!(tr("root[ * ].a"), "root[-1].a");
}

#[test]
fn test_multiplication_is_not_a_wildcard() {
    assert_eq!(tr("a * 2 = 4"), "a * 2 == 4");
}

#[test]
fn test_keywords_as_field_names() {
    assert_eq!(tr("order.and = 1"), "order.and == 1");
    assert_eq!(tr("not.x = 1"), "not.x == 1");
}

#[test]
fn test_strings_are_never_rewritten() {
    assert_eq!(tr("name = 'a and b'"), r#"name == "a and b""#);
}

#[test]
fn test_lex_errors_surface() {
    assert!(translate("a = 'open").is_err());
    assert!(translate("a # b").is_err());
}
