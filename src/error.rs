use thiserror::Error;

use crate::{
    ast::{Position, Token},
    lexer::LexError,
    parser::ParseError,
};

/// Anything that stops a filter, mapper or SELECT statement from compiling.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("invalid expression {text:?}: {source}")]
    Parse {
        text: String,
        #[source]
        source: ParseError,
    },

    #[error("invalid source path {0:?}")]
    InvalidSourcePath(String),

    #[error("invalid target path {0:?}")]
    InvalidTargetPath(String),

    #[error("field {target:?} has {count} sources but no combiner")]
    MissingCombiner { target: String, count: usize },

    #[error("SQL syntax error: {message} near {token} at {pos}")]
    Sql {
        message: &'static str,
        token: Token,
        pos: Position,
    },
}

/// Errors reported by [`crate::Engine`] and [`crate::Rule`].
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no rule named {0:?}")]
    NoRuleFound(String),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Compile(#[from] CompileError),
}
