//! Rewrites the SQL-flavoured surface syntax into the canonical expression
//! grammar understood by [`crate::parser`].
//!
//! | Surface            | Canonical          |
//! |--------------------|--------------------|
//! | `a AND b`          | `a && b`           |
//! | `a OR b`           | `a || b`           |
//! | `NOT a`            | `! a`              |
//! | `NULL`, `TRUE`     | `null`, `true`     |
//! | `a = 1`            | `a == 1`           |
//! | `x.y IN (1, 2)`    | `in(x.y, 1, 2)`    |
//! | `items[*].price`   | `items[-1].price`  |
//!
//! Keywords are matched case-insensitively and only on bare identifiers: a
//! word next to a `.` is a field name (`order.and`) and string literals are
//! never touched.

use std::borrow::Cow;

use crate::{
    ast::{Token, tokens::render},
    lexer::{self, LexError},
};

/// Translate surface text to canonical text.
///
/// Returns the input unchanged (borrowed) when no rewrite applied.
///
/// # Examples
///
/// ```
/// use sql_rules::translate::translate;
///
/// assert_eq!(translate("a < 2 and b.c[4] = 5").unwrap(), "a < 2 && b.c[4] == 5");
/// assert_eq!(translate("status in ('a', 'b')").unwrap(), r#"in(status, "a", "b")"#);
/// assert_eq!(translate("a < 2 && b == 5").unwrap(), "a < 2 && b == 5");
/// ```
pub fn translate(text: &str) -> Result<Cow<'_, str>, LexError> {
    let mut tokens = lexer::tokens(text)?;
    tokens.pop(); // Eof

    if !rewrite(&mut tokens) {
        return Ok(Cow::Borrowed(text));
    }

    let canonical = render(&tokens);
    log::trace!("translated {:?} into {:?}", text, canonical);
    Ok(Cow::Owned(canonical))
}

/// Apply every rewrite rule in place. Returns whether anything changed.
pub fn rewrite(tokens: &mut Vec<Token>) -> bool {
    let mut changed = false;
    let mut i = 0;

    while i < tokens.len() {
        match &tokens[i] {
            Token::Identifier(name) if !is_field_name(tokens, i) => {
                let lower = name.to_ascii_lowercase();
                let replacement = match lower.as_str() {
                    "and" => Some(Token::AndAnd),
                    "or" => Some(Token::OrOr),
                    "not" => Some(Token::Bang),
                    "null" | "true" | "false" if *name != lower => {
                        Some(Token::Identifier(lower.clone()))
                    }
                    _ => None,
                };

                if let Some(token) = replacement {
                    tokens[i] = token;
                    changed = true;
                } else if lower == "in"
                    && let Some(next) = rewrite_in(tokens, i)
                {
                    changed = true;
                    i = next;
                    continue;
                }
            }
            Token::Assign => {
                tokens[i] = Token::EqEq;
                changed = true;
            }
            Token::Star
                if i > 0
                    && tokens[i - 1] == Token::LBracket
                    && tokens.get(i + 1) == Some(&Token::RBracket) =>
            {
                // renders as `-1`, which the parser reads back as the wildcard
                tokens[i] = Token::Number(-1.0);
                changed = true;
            }
            _ => {}
        }
        i += 1;
    }

    changed
}

/// Words touching a `.` are path segments, not keywords.
fn is_field_name(tokens: &[Token], i: usize) -> bool {
    (i > 0 && tokens[i - 1] == Token::Dot) || tokens.get(i + 1) == Some(&Token::Dot)
}

/// Turn `<operand> in ( ...` at `at` into `in ( <operand> , ...`.
///
/// Returns the index to resume scanning from, or `None` when the `in` is not
/// in infix position (e.g. an already canonical `in(x, 1)` call).
fn rewrite_in(tokens: &mut Vec<Token>, at: usize) -> Option<usize> {
    if at == 0 || tokens.get(at + 1) != Some(&Token::LParen) {
        return None;
    }
    let start = operand_start(tokens, at - 1)?;

    let mut operand: Vec<Token> = tokens.drain(start..at).collect();
    // tokens[start] is now `in`, tokens[start + 1] its `(`
    tokens[start] = Token::Identifier("in".to_string());
    if tokens.get(start + 2) != Some(&Token::RParen) {
        operand.push(Token::Comma);
    }
    let resume = start + 2 + operand.len();
    tokens.splice(start + 2..start + 2, operand);
    Some(resume)
}

/// Walk backwards over the postfix chain ending at `end` (identifiers,
/// literals, `.field`, `[...]`, calls and groups) and return where it starts.
fn operand_start(tokens: &[Token], end: usize) -> Option<usize> {
    let mut j = end;
    loop {
        match tokens[j] {
            Token::RBracket => {
                let open = matching_open(tokens, j, &Token::LBracket, &Token::RBracket)?;
                // an index always follows some base expression
                j = open.checked_sub(1)?;
                continue;
            }
            Token::RParen => {
                let open = matching_open(tokens, j, &Token::LParen, &Token::RParen)?;
                match open.checked_sub(1).map(|k| &tokens[k]) {
                    Some(Token::Identifier(_)) => j = open - 1,
                    _ => return Some(open),
                }
            }
            Token::Identifier(_) | Token::Number(_) | Token::String(_) => {}
            _ => return None,
        }

        if j >= 2 && tokens[j - 1] == Token::Dot {
            j -= 2;
        } else {
            return Some(j);
        }
    }
}

fn matching_open(tokens: &[Token], close_at: usize, open: &Token, close: &Token) -> Option<usize> {
    let mut depth = 0usize;
    for k in (0..=close_at).rev() {
        if tokens[k] == *close {
            depth += 1;
        } else if tokens[k] == *open {
            depth -= 1;
            if depth == 0 {
                return Some(k);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passthrough_is_borrowed() {
        let text = "a < 2 && (b.c[4] == 5 || e.f == 2)";
        assert!(matches!(translate(text).unwrap(), Cow::Borrowed(_)));
    }

    #[test]
    fn test_wildcard_index() {
        assert_eq!(translate("root[*].a").unwrap(), "root[-1].a");
        assert_eq!(translate("root[ * ].a").unwrap(), "root[-1].a");
    }

    #[test]
    fn test_in_with_path_operand() {
        assert_eq!(translate("a.b[0] IN (1, 2)").unwrap(), "in(a.b[0], 1, 2)");
        assert_eq!(translate("len(x) in (3)").unwrap(), "in(len(x), 3)");
    }
}
