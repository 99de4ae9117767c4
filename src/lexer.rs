use thiserror::Error;

use crate::ast::{Position, Spanned, Token};

/// Errors raised while splitting text into tokens.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("unexpected character '{ch}' at {pos}")]
    UnexpectedChar { ch: char, pos: Position },

    #[error("unterminated string starting at {pos}")]
    UnterminatedString { pos: Position },

    #[error("invalid escape sequence '\\{ch}' at {pos}")]
    InvalidEscape { ch: char, pos: Position },

    #[error("invalid number '{text}' at {pos}")]
    InvalidNumber { text: String, pos: Position },
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Lex the whole input. The returned vector always ends with [`Token::Eof`].
    pub fn tokenize(mut self) -> Result<Vec<Spanned>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let spanned = self.next_token()?;
            let done = spanned.token == Token::Eof;
            tokens.push(spanned);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        if self.current_char() == Some('\n') {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        self.position += 1;
    }

    fn here(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn read_string(&mut self, quote: char) -> Result<String, LexError> {
        let start = self.here();
        let mut result = String::new();
        self.advance(); // opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                c if c == quote => {
                    self.advance();
                    return Ok(result);
                }
                '\\' => {
                    let escape_pos = self.here();
                    self.advance();
                    match self.current_char() {
                        Some('n') => result.push('\n'),
                        Some('t') => result.push('\t'),
                        Some('r') => result.push('\r'),
                        Some('"') => result.push('"'),
                        Some('\'') => result.push('\''),
                        Some('\\') => result.push('\\'),
                        Some(ch) => return Err(LexError::InvalidEscape { ch, pos: escape_pos }),
                        None => return Err(LexError::UnterminatedString { pos: start }),
                    }
                    self.advance();
                }
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Err(LexError::UnterminatedString { pos: start })
    }

    fn read_number(&mut self) -> Result<Token, LexError> {
        let start = self.here();
        let mut number = String::new();
        let mut seen_dot = false;

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                number.push(ch);
                self.advance();
            } else if ch == '.'
                && !seen_dot
                && self.peek_char(1).is_some_and(|c| c.is_ascii_digit())
            {
                seen_dot = true;
                number.push(ch);
                self.advance();
            } else if (ch == 'e' || ch == 'E') && self.exponent_follows() {
                number.push(ch);
                self.advance();
                if let Some(sign @ ('+' | '-')) = self.current_char() {
                    number.push(sign);
                    self.advance();
                }
                while let Some(d) = self.current_char().filter(char::is_ascii_digit) {
                    number.push(d);
                    self.advance();
                }
                break;
            } else {
                break;
            }
        }

        number
            .parse::<f64>()
            .map(Token::Number)
            .map_err(|_| LexError::InvalidNumber { text: number, pos: start })
    }

    fn exponent_follows(&self) -> bool {
        match self.peek_char(1) {
            Some(c) if c.is_ascii_digit() => true,
            Some('+' | '-') => self.peek_char(2).is_some_and(|c| c.is_ascii_digit()),
            _ => false,
        }
    }

    /// Consume `first`, and `second` too if it follows. Returns which token applied.
    fn one_or_two(&mut self, second: char, single: Token, double: Token) -> Token {
        self.advance();
        if self.current_char() == Some(second) {
            self.advance();
            double
        } else {
            single
        }
    }

    pub fn next_token(&mut self) -> Result<Spanned, LexError> {
        self.skip_whitespace();
        let pos = self.here();

        let token = match self.current_char() {
            None => Token::Eof,
            Some('+') => {
                self.advance();
                Token::Plus
            }
            Some('-') => {
                self.advance();
                Token::Minus
            }
            Some('*') => {
                self.advance();
                Token::Star
            }
            Some('/') => {
                self.advance();
                Token::Slash
            }
            Some('%') => {
                self.advance();
                Token::Percent
            }
            Some('^') => {
                self.advance();
                Token::Caret
            }
            Some('.') => {
                self.advance();
                Token::Dot
            }
            Some(',') => {
                self.advance();
                Token::Comma
            }
            Some('(') => {
                self.advance();
                Token::LParen
            }
            Some(')') => {
                self.advance();
                Token::RParen
            }
            Some('[') => {
                self.advance();
                Token::LBracket
            }
            Some(']') => {
                self.advance();
                Token::RBracket
            }
            Some('&') => self.one_or_two('&', Token::Ampersand, Token::AndAnd),
            Some('|') => self.one_or_two('|', Token::Pipe, Token::OrOr),
            Some('=') => self.one_or_two('=', Token::Assign, Token::EqEq),
            Some('!') => self.one_or_two('=', Token::Bang, Token::NotEq),
            Some('<') => match self.peek_char(1) {
                Some('=') => self.one_or_two('=', Token::Lt, Token::LtEq),
                Some('<') => self.one_or_two('<', Token::Lt, Token::Shl),
                _ => {
                    self.advance();
                    Token::Lt
                }
            },
            Some('>') => match self.peek_char(1) {
                Some('=') => self.one_or_two('=', Token::Gt, Token::GtEq),
                Some('>') => self.one_or_two('>', Token::Gt, Token::Shr),
                _ => {
                    self.advance();
                    Token::Gt
                }
            },
            Some(quote @ ('"' | '\'')) => Token::String(self.read_string(quote)?),
            Some(ch) if ch.is_alphabetic() || ch == '_' => {
                Token::Identifier(self.read_identifier())
            }
            Some(ch) if ch.is_ascii_digit() => self.read_number()?,
            Some(ch) => return Err(LexError::UnexpectedChar { ch, pos }),
        };

        Ok(Spanned { token, pos })
    }
}

/// Lex `input` and drop positions.
pub fn tokens(input: &str) -> Result<Vec<Token>, LexError> {
    Ok(Lexer::new(input)
        .tokenize()?
        .into_iter()
        .map(|s| s.token)
        .collect())
}

#[test]
fn test_keywords_are_identifiers() {
    let toks = tokens("AND or Null true").unwrap();
    assert_eq!(toks[0], Token::Identifier("AND".to_string()));
    assert_eq!(toks[1], Token::Identifier("or".to_string()));
    assert_eq!(toks[2], Token::Identifier("Null".to_string()));
    assert_eq!(toks[3], Token::Identifier("true".to_string()));
    assert_eq!(toks[4], Token::Eof);
}

#[test]
fn test_path_tokens() {
    let toks = tokens("b.c[4] == 5").unwrap();
    assert_eq!(
        toks,
        vec![
            Token::Identifier("b".to_string()),
            Token::Dot,
            Token::Identifier("c".to_string()),
            Token::LBracket,
            Token::Number(4.0),
            Token::RBracket,
            Token::EqEq,
            Token::Number(5.0),
            Token::Eof,
        ]
    );
}

#[test]
fn test_positions() {
    let spanned = Lexer::new("a\n  < 2").tokenize().unwrap();
    assert_eq!(spanned[1].token, Token::Lt);
    assert_eq!(spanned[1].pos, Position::new(2, 3));
}
