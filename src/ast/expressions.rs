use crate::{
    ast::{BinOp, UnaryOp},
    value::Value,
};

/// Abstract Syntax Tree node representing a parsed expression.
///
/// Built once by the parser and then shared read-only by every evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Literal number, string, boolean or null
    ///
    /// # Example
    /// ```text
    /// 42
    /// "hello"
    /// true
    /// null
    /// ```
    Literal(Value),

    /// Top-level field of the document, or `root`
    ///
    /// # Example
    /// ```text
    /// price
    /// root
    /// ```
    Identifier(String),

    /// Dotted field access
    ///
    /// # Example
    /// ```text
    /// user.name
    /// items[0].price
    /// ```
    Field { base: Box<Expr>, name: String },

    /// Bracket indexing
    ///
    /// # Example
    /// ```text
    /// items[0]
    /// items[-1]
    /// ```
    Index { base: Box<Expr>, index: Index },

    /// Binary operation (arithmetic, comparison, bitwise, logical)
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Prefix operation
    Unary { op: UnaryOp, operand: Box<Expr> },

    /// Function call, dispatched through the function table
    ///
    /// # Example
    /// ```text
    /// sum(b.c)
    /// currenttimestamp()
    /// ```
    Call { name: String, args: Vec<Expr> },

    /// Parenthesized expression
    Group(Box<Expr>),
}

/// What goes inside `[...]`.
#[derive(Debug, Clone, PartialEq)]
pub enum Index {
    /// `[-1]` (from `[*]`): every element, i.e. the base value itself
    Wildcard,
    /// Any other index expression
    At(Box<Expr>),
}

impl Expr {
    pub fn identifier(name: &str) -> Expr {
        Expr::Identifier(name.to_string())
    }

    pub fn binary(op: BinOp, left: Expr, right: Expr) -> Expr {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}
