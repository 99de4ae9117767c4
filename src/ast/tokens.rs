use std::fmt;

/// Line and column (both 1-based) of a token in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Position { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A token together with where it started.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    /// Any numeric literal
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 3.14
    /// 1e3
    /// ```
    Number(f64),

    /// String literal enclosed in double or single quotes
    ///
    /// # Examples
    /// ```text
    /// "hello"
    /// 'item #1'
    /// ```
    String(String),

    /// Field name, function name or keyword
    ///
    /// Keywords (`and`, `select`, `true`, `null`, ...) are not reserved by
    /// the lexer; the translator, the SELECT compiler and the parser each
    /// decide what a word means in their context.
    ///
    /// # Examples
    /// ```text
    /// user
    /// item_count
    /// AND
    /// ```
    Identifier(String),

    // Arithmetic
    /// Addition or string concatenation
    Plus,

    /// Subtraction or negation
    Minus,

    /// Multiplication, or the wildcard in `[*]` and `SELECT *`
    Star,

    /// Division
    Slash,

    /// Modulo
    Percent,

    // Bitwise
    /// Bitwise AND (`&`)
    Ampersand,

    /// Bitwise OR (`|`)
    Pipe,

    /// Bitwise XOR, or bitwise complement when unary (`^`)
    Caret,

    /// Shift left (`<<`)
    Shl,

    /// Shift right (`>>`)
    Shr,

    // Logical
    /// `&&`
    AndAnd,

    /// `||`
    OrOr,

    /// `!`
    Bang,

    // Comparison
    /// Equality operator (`==`)
    EqEq,

    /// Inequality operator (`!=`)
    NotEq,

    /// Single `=`; only valid in the SQL surface, where it means `==`
    Assign,

    /// Less than
    Lt,

    /// Less than or equal
    LtEq,

    /// Greater than
    Gt,

    /// Greater than or equal
    GtEq,

    // Delimiters
    /// Left parenthesis for grouping or function calls
    LParen,

    /// Right parenthesis
    RParen,

    /// Left bracket for indexing
    LBracket,

    /// Right bracket
    RBracket,

    /// Comma for separating arguments or fields
    Comma,

    /// Dot for field access
    Dot,

    /// End of input
    Eof,
}

impl Token {
    /// Canonical source text of the token. Lexing the result yields the same
    /// token again.
    pub fn lexeme(&self) -> String {
        match self {
            Token::Number(n) => n.to_string(),
            Token::String(s) => quote(s),
            Token::Identifier(name) => name.clone(),
            other => other.symbol().to_string(),
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::Percent => "%",
            Token::Ampersand => "&",
            Token::Pipe => "|",
            Token::Caret => "^",
            Token::Shl => "<<",
            Token::Shr => ">>",
            Token::AndAnd => "&&",
            Token::OrOr => "||",
            Token::Bang => "!",
            Token::EqEq => "==",
            Token::NotEq => "!=",
            Token::Assign => "=",
            Token::Lt => "<",
            Token::LtEq => "<=",
            Token::Gt => ">",
            Token::GtEq => ">=",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::LBracket => "[",
            Token::RBracket => "]",
            Token::Comma => ",",
            Token::Dot => ".",
            Token::Eof => "",
            Token::Number(_) | Token::String(_) | Token::Identifier(_) => "",
        }
    }

    /// Case-insensitive keyword check on identifiers.
    pub fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self, Token::Identifier(name) if name.eq_ignore_ascii_case(keyword))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Eof => f.write_str("end of input"),
            other => write!(f, "'{}'", other.lexeme()),
        }
    }
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Join tokens back into source text.
///
/// Spaces separate tokens except around `.`, inside brackets and parens, and
/// before a call's `(`, so paths and calls come out as `b.c[2]` and `sum(x)`.
pub fn render(tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut prev: Option<&Token> = None;
    for token in tokens {
        if matches!(token, Token::Eof) {
            break;
        }
        if let Some(prev) = prev
            && needs_space(prev, token)
        {
            out.push(' ');
        }
        out.push_str(&token.lexeme());
        prev = Some(token);
    }
    out
}

fn needs_space(prev: &Token, next: &Token) -> bool {
    if matches!(prev, Token::Dot | Token::LParen | Token::LBracket) {
        return false;
    }
    if matches!(
        next,
        Token::Dot | Token::RParen | Token::RBracket | Token::Comma | Token::LBracket
    ) {
        return false;
    }
    !(matches!(next, Token::LParen) && matches!(prev, Token::Identifier(_)))
}
