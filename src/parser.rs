use std::mem;

use thiserror::Error;

use crate::{
    ast::{BinOp, Expr, Index, Position, Spanned, Token, UnaryOp},
    lexer::{LexError, Lexer},
    value::Value,
};

/// Syntax errors in the canonical expression grammar.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("unexpected {found} at {pos}, expected {expected}")]
    UnexpectedToken {
        found: Token,
        pos: Position,
        expected: &'static str,
    },

    #[error("only named functions can be called (at {pos})")]
    InvalidCallee { pos: Position },
}

pub struct Parser {
    tokens: Vec<Spanned>,
    index: usize,
}

impl Parser {
    pub fn new(lexer: Lexer) -> Result<Self, ParseError> {
        Ok(Parser {
            tokens: lexer.tokenize()?,
            index: 0,
        })
    }

    fn current(&self) -> &Token {
        // tokenize() always ends with Eof and we never move past it
        &self.tokens[self.index].token
    }

    fn pos(&self) -> Position {
        self.tokens[self.index].pos
    }

    fn advance(&mut self) {
        if self.index + 1 < self.tokens.len() {
            self.index += 1;
        }
    }

    /// Take the current token out, leaving Eof in its place, and move on.
    fn take(&mut self) -> Token {
        let token = mem::replace(&mut self.tokens[self.index].token, Token::Eof);
        self.advance();
        token
    }

    fn check(&self, token: &Token) -> bool {
        mem::discriminant(self.current()) == mem::discriminant(token)
    }

    fn expect(&mut self, expected: Token, what: &'static str) -> Result<(), ParseError> {
        if !self.check(&expected) {
            return Err(self.unexpected(what));
        }
        self.advance();
        Ok(())
    }

    fn unexpected(&self, expected: &'static str) -> ParseError {
        ParseError::UnexpectedToken {
            found: self.current().clone(),
            pos: self.pos(),
            expected,
        }
    }

    /// Parse a complete expression; trailing tokens are an error.
    pub fn parse(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_expression()?;
        self.expect(Token::Eof, "end of input")?;
        Ok(expr)
    }

    pub fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_and()?;
        while self.check(&Token::OrOr) {
            self.advance();
            let right = self.parse_and()?;
            left = Expr::binary(BinOp::Or, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_comparison()?;
        while self.check(&Token::AndAnd) {
            self.advance();
            let right = self.parse_comparison()?;
            left = Expr::binary(BinOp::And, left, right);
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_additive()?;

        loop {
            let op = match self.current() {
                Token::EqEq => BinOp::Equal,
                Token::NotEq => BinOp::NotEqual,
                Token::Lt => BinOp::LessThan,
                Token::Gt => BinOp::GreaterThan,
                Token::LtEq => BinOp::LessEqual,
                Token::GtEq => BinOp::GreaterEqual,
                _ => break,
            };
            self.advance();
            let right = self.parse_additive()?;
            left = Expr::binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.current() {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Subtract,
                Token::Pipe => BinOp::BitOr,
                Token::Caret => BinOp::BitXor,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = Expr::binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match self.current() {
                Token::Star => BinOp::Multiply,
                Token::Slash => BinOp::Divide,
                Token::Percent => BinOp::Modulo,
                Token::Shl => BinOp::ShiftLeft,
                Token::Shr => BinOp::ShiftRight,
                Token::Ampersand => BinOp::BitAnd,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.current() {
            Token::Bang => UnaryOp::Not,
            Token::Minus => UnaryOp::Negate,
            Token::Caret => UnaryOp::Complement,
            _ => return self.parse_postfix(),
        };
        self.advance();
        let operand = self.parse_unary()?; // right-associative
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    /// Field access, indexing and calls chained after a primary expression.
    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;

        loop {
            match self.current() {
                Token::Dot => {
                    self.advance();
                    let pos = self.pos();
                    let name = match self.take() {
                        Token::Identifier(name) => name,
                        found => {
                            return Err(ParseError::UnexpectedToken {
                                found,
                                pos,
                                expected: "field name after '.'",
                            });
                        }
                    };
                    expr = Expr::Field {
                        base: Box::new(expr),
                        name,
                    };
                }
                Token::LBracket => {
                    self.advance();
                    let index = self.parse_index()?;
                    self.expect(Token::RBracket, "']'")?;
                    expr = Expr::Index {
                        base: Box::new(expr),
                        index,
                    };
                }
                Token::LParen => {
                    let pos = self.pos();
                    let Expr::Identifier(name) = expr else {
                        return Err(ParseError::InvalidCallee { pos });
                    };
                    self.advance();
                    let args = self.parse_arguments()?;
                    expr = Expr::Call { name, args };
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    /// A negated literal index (`[-1]`, which is how `[*]` arrives) means
    /// "every element".
    fn parse_index(&mut self) -> Result<Index, ParseError> {
        let index = self.parse_expression()?;
        match index {
            Expr::Unary {
                op: UnaryOp::Negate,
                ref operand,
            } if matches!(operand.as_ref(), Expr::Literal(_)) => Ok(Index::Wildcard),
            other => Ok(Index::At(Box::new(other))),
        }
    }

    fn parse_arguments(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = vec![];

        while !self.check(&Token::RParen) {
            args.push(self.parse_expression()?);

            if !self.check(&Token::RParen) {
                self.expect(Token::Comma, "',' or ')'")?;
            }
        }

        self.expect(Token::RParen, "')'")?;
        Ok(args)
    }

    /// Parse primary expressions (atoms): literals, identifiers and groups
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let pos = self.pos();
        match self.take() {
            Token::Number(n) => Ok(Expr::Literal(Value::Number(n))),
            Token::String(s) => Ok(Expr::Literal(Value::String(s))),
            Token::Identifier(name) => Ok(match name.as_str() {
                "true" => Expr::Literal(Value::Boolean(true)),
                "false" => Expr::Literal(Value::Boolean(false)),
                "null" => Expr::Literal(Value::Null),
                _ => Expr::Identifier(name),
            }),
            Token::LParen => {
                let inner = self.parse_expression()?;
                self.expect(Token::RParen, "')'")?;
                Ok(Expr::Group(Box::new(inner)))
            }
            found => Err(ParseError::UnexpectedToken {
                found,
                pos,
                expected: "expression",
            }),
        }
    }
}

/// Parse canonical expression text into an AST.
///
/// # Examples
///
/// ```
/// use sql_rules::parser::parse_expression;
/// use sql_rules::ast::{BinOp, Expr};
///
/// let expr = parse_expression("a < 2 && e.f == 2").unwrap();
/// assert!(matches!(expr, Expr::Binary { op: BinOp::And, .. }));
/// ```
pub fn parse_expression(text: &str) -> Result<Expr, ParseError> {
    Parser::new(Lexer::new(text))?.parse()
}
