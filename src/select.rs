//! `SELECT ... FROM ... [WHERE ...]` statements.
//!
//! ```text
//! SELECT <field> [AS <alias>] [, ...] FROM <name | "name"> [WHERE <condition>]
//! ```
//!
//! The statement is split on the shared token stream. Commas and keywords
//! nested inside parentheses or brackets belong to the field they appear in.
//! Each field goes to [`Mapper::add_field`], the condition to
//! [`Filter::compile`].

use std::mem;
use std::sync::Arc;

use crate::{
    ast::{Spanned, Token, tokens::render},
    error::CompileError,
    filter::Filter,
    function::FunctionTable,
    lexer::Lexer,
    mapper::Mapper,
};

/// A compiled SELECT statement.
#[derive(Debug, Clone)]
pub struct Select {
    /// The `FROM` target, quotes stripped
    pub name: String,
    /// The `WHERE` clause, if any
    pub filter: Option<Filter>,
    pub mapper: Mapper,
}

#[derive(Debug)]
struct FieldEntry {
    source: String,
    alias: Option<String>,
}

/// Compile a SELECT statement.
///
/// # Examples
///
/// ```
/// use sql_rules::{Value, select::compile_select};
///
/// let select = compile_select(r#"SELECT a.a FROM "t" WHERE a < 2"#, None).unwrap();
/// assert_eq!(select.name, "t");
///
/// let doc = Value::from_json_str(r#"{"a": 1}"#).unwrap();
/// assert!(select.filter.as_ref().unwrap().matches(&doc));
/// ```
pub fn compile_select(
    sql: &str,
    functions: Option<Arc<FunctionTable>>,
) -> Result<Select, CompileError> {
    let tokens = Lexer::new(sql).tokenize()?;
    let mut statement = Statement {
        tokens: &tokens,
        index: 0,
    };

    let keyword = statement.bump();
    if !keyword.token.is_keyword("select") {
        return Err(sql_error("expected SELECT", keyword));
    }
    let fields = statement.fields()?;
    let name = statement.table()?;
    let condition = statement.condition()?;

    let filter = condition
        .map(|text| Filter::compile(&text, functions.clone()))
        .transpose()?;

    let mut mapper = Mapper::new(functions);
    for field in &fields {
        mapper.add_field(&field.source, field.alias.as_deref())?;
    }

    log::debug!(
        "compiled select {:?}: {} field(s), filter: {}",
        name,
        mapper.len(),
        filter.is_some()
    );
    Ok(Select {
        name,
        filter,
        mapper,
    })
}

fn sql_error(message: &'static str, at: &Spanned) -> CompileError {
    CompileError::Sql {
        message,
        token: at.token.clone(),
        pos: at.pos,
    }
}

/// Cursor over the lexed statement. The token list always ends with Eof and
/// the cursor never moves past it.
struct Statement<'t> {
    tokens: &'t [Spanned],
    index: usize,
}

impl<'t> Statement<'t> {
    fn current(&self) -> &'t Spanned {
        &self.tokens[self.index]
    }

    fn bump(&mut self) -> &'t Spanned {
        let spanned = self.current();
        if self.index + 1 < self.tokens.len() {
            self.index += 1;
        }
        spanned
    }

    /// Everything between SELECT and FROM. Leaves the cursor after FROM.
    fn fields(&mut self) -> Result<Vec<FieldEntry>, CompileError> {
        let mut fields = Vec::new();
        let mut current: Vec<Token> = Vec::new();
        let mut after_comma = false;
        let (mut parens, mut brackets) = (0usize, 0usize);

        loop {
            let spanned = self.bump();
            let nested = parens > 0 || brackets > 0;
            // `a.from` and `from.x` are field names
            let clause = !nested
                && current.last() != Some(&Token::Dot)
                && self.current().token != Token::Dot;

            match &spanned.token {
                Token::Eof if nested => {
                    return Err(sql_error("unbalanced parentheses or brackets", spanned));
                }
                Token::Eof => return Err(sql_error("missing FROM", spanned)),
                Token::LParen => parens += 1,
                Token::LBracket => brackets += 1,
                Token::RParen => {
                    parens = parens
                        .checked_sub(1)
                        .ok_or_else(|| sql_error("unbalanced ')'", spanned))?;
                }
                Token::RBracket => {
                    brackets = brackets
                        .checked_sub(1)
                        .ok_or_else(|| sql_error("unbalanced ']'", spanned))?;
                }
                Token::Assign => {
                    return Err(sql_error("'=' is not allowed in the field list", spanned));
                }
                Token::Comma if !nested => {
                    let source = take_field(&mut current, spanned)?;
                    fields.push(FieldEntry { source, alias: None });
                    after_comma = true;
                    continue;
                }
                token if clause && token.is_keyword("as") => {
                    let source = take_field(&mut current, spanned)?;
                    let alias = self.alias()?;
                    fields.push(FieldEntry {
                        source,
                        alias: Some(alias),
                    });

                    let next = self.current();
                    if next.token == Token::Comma {
                        self.bump();
                        after_comma = true;
                    } else if !next.token.is_keyword("from") {
                        return Err(sql_error("expected ',' or FROM after alias", next));
                    }
                    continue;
                }
                token if clause && token.is_keyword("from") => {
                    if !current.is_empty() {
                        let source = take_field(&mut current, spanned)?;
                        fields.push(FieldEntry { source, alias: None });
                    } else if after_comma {
                        return Err(sql_error("empty field", spanned));
                    } else if fields.is_empty() {
                        return Err(sql_error("empty field list", spanned));
                    }
                    return Ok(fields);
                }
                _ => {}
            }

            current.push(spanned.token.clone());
            after_comma = false;
        }
    }

    /// `ident(.ident)*` after AS.
    fn alias(&mut self) -> Result<String, CompileError> {
        let mut segments = Vec::new();
        loop {
            let spanned = self.current();
            let Token::Identifier(segment) = &spanned.token else {
                return Err(sql_error("expected alias after AS", spanned));
            };
            if segments.is_empty()
                && spanned.token.is_keyword("from")
                && self
                    .tokens
                    .get(self.index + 1)
                    .is_none_or(|next| next.token != Token::Dot)
            {
                return Err(sql_error("expected alias after AS", spanned));
            }
            segments.push(segment.as_str());
            self.bump();

            if self.current().token != Token::Dot {
                return Ok(segments.join("."));
            }
            self.bump();
        }
    }

    fn table(&mut self) -> Result<String, CompileError> {
        let spanned = self.bump();
        match &spanned.token {
            Token::Identifier(name) | Token::String(name) => Ok(name.clone()),
            _ => Err(sql_error("expected a name after FROM", spanned)),
        }
    }

    /// The WHERE condition as text, if there is one.
    fn condition(&mut self) -> Result<Option<String>, CompileError> {
        let spanned = self.bump();
        match &spanned.token {
            Token::Eof => Ok(None),
            token if token.is_keyword("where") => {
                let rest = &self.tokens[self.index..];
                if rest.len() <= 1 {
                    return Err(sql_error("WHERE without a condition", self.current()));
                }
                check_balanced(rest)?;
                let body: Vec<Token> = rest.iter().map(|s| s.token.clone()).collect();
                Ok(Some(render(&body)))
            }
            _ => Err(sql_error("expected WHERE or end of statement", spanned)),
        }
    }
}

fn take_field(current: &mut Vec<Token>, at: &Spanned) -> Result<String, CompileError> {
    if current.is_empty() {
        return Err(sql_error("empty field", at));
    }
    Ok(render(&mem::take(current)))
}

fn check_balanced(tokens: &[Spanned]) -> Result<(), CompileError> {
    let (mut parens, mut brackets) = (0usize, 0usize);
    for spanned in tokens {
        match spanned.token {
            Token::LParen => parens += 1,
            Token::LBracket => brackets += 1,
            Token::RParen => {
                parens = parens
                    .checked_sub(1)
                    .ok_or_else(|| sql_error("unbalanced ')'", spanned))?;
            }
            Token::RBracket => {
                brackets = brackets
                    .checked_sub(1)
                    .ok_or_else(|| sql_error("unbalanced ']'", spanned))?;
            }
            Token::Eof if parens > 0 || brackets > 0 => {
                return Err(sql_error("unbalanced parentheses or brackets", spanned));
            }
            _ => {}
        }
    }
    Ok(())
}
