//! # Abstract Syntax Tree
//!
//! The canonical expression grammar that filters, mapper fields and WHERE
//! clauses compile down to.
//!
//! - **[tokens]** - Lexical tokens shared by the translator, the parser and
//!   the SELECT compiler
//! - **[expressions]** - Expression nodes (literals, paths, operations, calls)
//! - **[operators]** - Binary and unary operators
//!
//! ## Canonical Syntax
//!
//! ```text
//! a < 2 && (b.c[4] == 5 || e.f == 2)
//! sum(root[0].b.c) > 10
//! in(status, "open", "pending")
//! items[-1].price
//! ```
//!
//! The SQL-flavoured surface (`AND`, `OR`, `NOT`, `=`, `x IN (...)`, `[*]`)
//! is rewritten into this form by [`crate::translate`] before parsing.
//!
//! ## Paths
//!
//! - `a.b` - field access; over an array of objects it maps to every element
//! - `a[0]` - zero-based index into an array or string
//! - `a[-1]` - every element (written `a[*]` in the surface syntax)
//! - `root` - the whole document
pub mod expressions;
pub mod operators;
pub mod tokens;

pub use expressions::{Expr, Index};
pub use operators::{BinOp, UnaryOp};
pub use tokens::{Position, Spanned, Token};
