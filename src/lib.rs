//! SQL-flavoured rules over JSON-like documents.
//!
//! ```
//! use sql_rules::{Filter, Value};
//!
//! let filter = Filter::compile("a < 2 AND (b.c[4] = 5 OR e.f = 2)", None).unwrap();
//! let doc = Value::from_json_str(r#"{"a": 1, "b": {"c": [1, 2, 3, 4, 5]}}"#).unwrap();
//! assert!(filter.matches(&doc));
//! ```
pub mod ast;
#[cfg(feature = "cli")]
pub mod cli;
pub mod convert;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod filter;
pub mod function;
pub mod keypath;
pub mod lexer;
pub mod mapper;
pub mod parser;
pub mod rule;
pub mod select;
pub mod topic;
pub mod translate;
pub mod value;

pub use ast::{BinOp, Expr, Position, Token, UnaryOp};
pub use engine::{Engine, EngineConfig, RuleContext};
pub use error::{CompileError, EngineError};
pub use evaluator::Evaluator;
pub use filter::{Filter, compile_filter};
pub use function::{FunctionScope, FunctionTable, NativeFn, default_functions};
pub use lexer::{LexError, Lexer};
pub use mapper::{FieldSpec, Mapper, compile_mapper};
pub use parser::{ParseError, Parser};
pub use rule::{AsyncEventHandler, EventHandler, Rule, Stage};
pub use select::{Select, compile_select};
pub use value::{CoercionError, Value};
