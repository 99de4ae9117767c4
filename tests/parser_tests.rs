// tests/parser_tests.rs

use sql_rules::Value;
use sql_rules::ast::{BinOp, Expr, Index, Token, UnaryOp};
use sql_rules::parser::{ParseError, parse_expression};

fn parse(text: &str) -> Expr {
    parse_expression(text).unwrap()
}

fn num(n: f64) -> Expr {
    Expr::Literal(Value::Number(n))
}

// ============================================================================
// Simple tests
// ============================================================================

#[test]
fn test_comparison() {
    assert_eq!(
        parse("price > 100"),
        Expr::binary(BinOp::GreaterThan, Expr::identifier("price"), num(100.0))
    );
}

#[test]
fn test_parentheses() {
    // Should be: Multiply(Group(Add(1, 2)), 3)
    match parse("(1 + 2) * 3") {
        Expr::Binary {
            op: BinOp::Multiply,
            left,
            right,
        } => {
            assert!(matches!(
                *left,
                Expr::Group(ref inner) if matches!(**inner, Expr::Binary { op: BinOp::Add, .. })
            ));
            assert_eq!(*right, num(3.0));
        }
        other => panic!("Expected multiplication, got {:?}", other),
    }
}

#[test]
fn test_literals() {
    assert_eq!(parse("true"), Expr::Literal(Value::Boolean(true)));
    assert_eq!(parse("false"), Expr::Literal(Value::Boolean(false)));
    assert_eq!(parse("null"), Expr::Literal(Value::Null));
    assert_eq!(parse("'x'"), Expr::Literal(Value::from("x")));
}

// ============================================================================
// Precedence
// ============================================================================

#[test]
fn test_and_binds_tighter_than_or() {
    // a || (b && c)
    match parse("a || b && c") {
        Expr::Binary {
            op: BinOp::Or,
            left,
            right,
        } => {
            assert_eq!(*left, Expr::identifier("a"));
            assert!(matches!(*right, Expr::Binary { op: BinOp::And, .. }));
        }
        other => panic!("Expected OR at the top, got {:?}", other),
    }
}

#[test]
fn test_comparison_binds_tighter_than_and() {
    let expected = Expr::binary(
        BinOp::And,
        Expr::binary(BinOp::LessThan, Expr::identifier("a"), num(2.0)),
        Expr::binary(BinOp::Equal, Expr::identifier("b"), num(5.0)),
    );
    assert_eq!(parse("a < 2 && b == 5"), expected);
}

#[test]
fn test_multiplicative_over_additive() {
    let expected = Expr::binary(
        BinOp::Add,
        num(1.0),
        Expr::binary(BinOp::Multiply, num(2.0), num(3.0)),
    );
    assert_eq!(parse("1 + 2 * 3"), expected);
}

#[test]
fn test_shift_and_bitand_are_multiplicative() {
    assert!(matches!(
        parse("1 | 2 << 3"),
        Expr::Binary { op: BinOp::BitOr, .. }
    ));
    assert!(matches!(
        parse("1 ^ 6 & 3"),
        Expr::Binary { op: BinOp::BitXor, .. }
    ));
}

#[test]
fn test_left_associative() {
    let expected = Expr::binary(
        BinOp::Subtract,
        Expr::binary(BinOp::Subtract, num(10.0), num(3.0)),
        num(2.0),
    );
    assert_eq!(parse("10 - 3 - 2"), expected);
}

#[test]
fn test_unary_operators() {
    assert_eq!(
        parse("!ok"),
        Expr::Unary {
            op: UnaryOp::Not,
            operand: Box::new(Expr::identifier("ok")),
        }
    );
    assert!(matches!(parse("-x"), Expr::Unary { op: UnaryOp::Negate, .. }));
    assert!(matches!(parse("^x"), Expr::Unary { op: UnaryOp::Complement, .. }));
    assert!(matches!(parse("!!x"), Expr::Unary { op: UnaryOp::Not, .. }));
}

// ============================================================================
// Paths and calls
// ============================================================================

#[test]
fn test_field_and_index_chain() {
    let expected = Expr::Index {
        base: Box::new(Expr::Field {
            base: Box::new(Expr::identifier("b")),
            name: "c".to_string(),
        }),
        index: Index::At(Box::new(num(4.0))),
    };
    assert_eq!(parse("b.c[4]"), expected);
}

#[test]
fn test_negative_literal_index_is_wildcard() {
    match parse("root[-1].a") {
        Expr::Field { base, name } => {
            assert_eq!(name, "a");
            assert!(matches!(
                *base,
                Expr::Index {
                    index: Index::Wildcard,
                    ..
                }
            ));
        }
        other => panic!("Expected field access, got {:?}", other),
    }
}

#[test]
fn test_computed_index() {
    assert!(matches!(
        parse("items[i + 1]"),
        Expr::Index {
            index: Index::At(_),
            ..
        }
    ));
}

#[test]
fn test_function_calls() {
    assert_eq!(
        parse("currenttimestamp()"),
        Expr::Call {
            name: "currenttimestamp".to_string(),
            args: vec![],
        }
    );

    match parse("substr(c, 2, len(x))") {
        Expr::Call { name, args } => {
            assert_eq!(name, "substr");
            assert_eq!(args.len(), 3);
            assert!(matches!(args[2], Expr::Call { .. }));
        }
        other => panic!("Expected call, got {:?}", other),
    }
}

#[test]
fn test_call_result_can_be_indexed() {
    assert!(matches!(
        parse("array(1, 2)[0]"),
        Expr::Index { base, .. } if matches!(*base, Expr::Call { .. })
    ));
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_trailing_tokens() {
    match parse_expression("a b") {
        Err(ParseError::UnexpectedToken { found, expected, .. }) => {
            assert_eq!(found, Token::Identifier("b".to_string()));
            assert_eq!(expected, "end of input");
        }
        other => panic!("Expected an error, got {:?}", other),
    }
}

#[test]
fn test_missing_operand() {
    assert!(matches!(
        parse_expression("a <"),
        Err(ParseError::UnexpectedToken {
            found: Token::Eof,
            ..
        })
    ));
}

#[test]
fn test_unclosed_call() {
    assert!(parse_expression("sum(a, b").is_err());
    assert!(parse_expression("b.c[1").is_err());
}

#[test]
fn test_only_names_can_be_called() {
    assert!(matches!(
        parse_expression("a.b(1)"),
        Err(ParseError::InvalidCallee { .. })
    ));
}

#[test]
fn test_field_name_required_after_dot() {
    let err = parse_expression("a.1").unwrap_err();
    assert!(err.to_string().contains("field name after '.'"));
}

#[test]
fn test_sql_keywords_are_not_canonical() {
    // `and` is only an operator after translation
    assert!(parse_expression("a and b").is_err());
}
