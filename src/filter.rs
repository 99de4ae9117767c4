//! Compiled boolean predicates over documents.

use std::fmt;
use std::sync::Arc;

use crate::{
    ast::Expr,
    error::CompileError,
    evaluator::Evaluator,
    function::{FunctionScope, FunctionTable},
    parser::parse_expression,
    translate::translate,
    value::Value,
};

/// Translate surface text and parse it.
pub fn compile_expression(text: &str) -> Result<Expr, CompileError> {
    let canonical = translate(text)?;
    parse_expression(&canonical).map_err(|source| CompileError::Parse {
        text: text.to_string(),
        source,
    })
}

/// A filter expression, compiled once and evaluated against any number of
/// documents, from any number of threads.
///
/// # Examples
///
/// ```
/// use sql_rules::{Filter, Value};
///
/// let filter = Filter::compile("a < 2 AND e.f = 2", None).unwrap();
///
/// let doc = Value::from_json_str(r#"{"a": 1, "e": {"f": 2}}"#).unwrap();
/// assert!(filter.matches(&doc));
/// ```
#[derive(Clone)]
pub struct Filter {
    source: String,
    expr: Expr,
    functions: FunctionScope,
}

impl Filter {
    /// Compile surface-syntax `text`. Function calls resolve against
    /// `functions` first, then the built-ins.
    pub fn compile(
        text: &str,
        functions: Option<Arc<FunctionTable>>,
    ) -> Result<Self, CompileError> {
        let expr = compile_expression(text)?;
        log::debug!("compiled filter {:?}", text);
        Ok(Filter {
            source: text.to_string(),
            expr,
            functions: FunctionScope::from(functions),
        })
    }

    /// The text this filter was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Raw result of the expression.
    pub fn evaluate(&self, document: &Value) -> Value {
        Evaluator::new(&self.functions).evaluate(&self.expr, document)
    }

    /// True iff the expression evaluates to exactly `true`.
    pub fn matches(&self, document: &Value) -> bool {
        let result = self.evaluate(document);
        if !result.is_true() {
            log::trace!("filter {:?} rejected document ({:?})", self.source, result);
            return false;
        }
        true
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter").field("source", &self.source).finish()
    }
}

/// Shorthand for [`Filter::compile`].
pub fn compile_filter(
    text: &str,
    functions: Option<Arc<FunctionTable>>,
) -> Result<Filter, CompileError> {
    Filter::compile(text, functions)
}
