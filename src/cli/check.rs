//! Run a filter expression or a SELECT statement against JSON input

use super::CliError;
use crate::{Filter, Rule, Value, compile_select, convert::to_json, lexer};

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// A filter expression or a SELECT statement
    pub query: String,
    /// JSON input string
    pub input: Option<String>,
    /// Pretty-print the output
    pub pretty: bool,
    /// Only validate syntax, don't execute
    pub syntax_only: bool,
}

/// Result of a check operation
#[derive(Debug)]
pub enum CheckResult {
    /// Syntax validation passed
    SyntaxValid,
    /// The filter's value, or the SELECT output (`null` when the WHERE
    /// clause rejected the input)
    Success(serde_json::Value),
}

/// Whether `query` starts with the SELECT keyword.
pub fn is_select(query: &str) -> bool {
    lexer::tokens(query)
        .ok()
        .and_then(|tokens| tokens.into_iter().next())
        .is_some_and(|first| first.is_keyword("select"))
}

enum Compiled {
    Filter(Filter),
    Select(Rule),
}

/// Execute a check operation
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    let query = options.query.as_str();
    let compiled = if is_select(query) {
        Compiled::Select(Rule::from_select(compile_select(query, None)?))
    } else {
        Compiled::Filter(Filter::compile(query, None)?)
    };

    if options.syntax_only {
        return Ok(CheckResult::SyntaxValid);
    }

    let json_str = options.input.as_ref().ok_or(CliError::NoInput)?;
    let document = Value::from_json_str(json_str)?;

    let output = match compiled {
        Compiled::Filter(filter) => filter.evaluate(&document),
        Compiled::Select(rule) => rule.handle(document).unwrap_or_default(),
    };
    Ok(CheckResult::Success(to_json(output)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(query: &str, input: &str) -> serde_json::Value {
        let options = CheckOptions {
            query: query.to_string(),
            input: Some(input.to_string()),
            ..Default::default()
        };
        match execute_check(&options).unwrap() {
            CheckResult::Success(value) => value,
            CheckResult::SyntaxValid => panic!("expected output"),
        }
    }

    #[test]
    fn test_detects_select() {
        assert!(is_select("select a from t"));
        assert!(is_select("  SELECT a FROM t"));
        assert!(!is_select("selected > 1"));
        assert!(!is_select("'select'"));
        assert!(!is_select(""));
    }

    #[test]
    fn test_filter_output() {
        assert_eq!(check("a < 2", r#"{"a": 1}"#), serde_json::json!(true));
        assert_eq!(check("sum(b)", r#"{"b": [1, 2]}"#), serde_json::json!(3));
    }

    #[test]
    fn test_select_output() {
        let out = check("SELECT a AS x FROM t WHERE a > 0", r#"{"a": 4}"#);
        assert_eq!(out, serde_json::json!({"x": 4}));

        let rejected = check("SELECT a AS x FROM t WHERE a > 0", r#"{"a": -4}"#);
        assert_eq!(rejected, serde_json::Value::Null);
    }

    #[test]
    fn test_syntax_only_needs_no_input() {
        let options = CheckOptions {
            query: "SELECT FROM t".to_string(),
            syntax_only: true,
            ..Default::default()
        };
        assert!(matches!(execute_check(&options), Err(CliError::Compile(_))));
    }
}
