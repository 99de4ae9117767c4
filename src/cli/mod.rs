//! CLI support for sql-rules
//!
//! Provides programmatic access to the `sql-rules` command so other tools can
//! embed it.

mod check;
mod docs;

pub use check::{CheckOptions, CheckResult, execute_check, is_select};
pub use docs::{DocCategory, get_doc_category, get_docs_overview, list_functions};

use std::io;

use thiserror::Error;

use crate::CompileError;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Compile(#[from] CompileError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("No input provided. Use --input or pipe JSON to stdin.")]
    NoInput,

    #[error("Unknown category: '{0}'\nRun 'sql-rules docs' to see available categories.")]
    UnknownCategory(String),
}
