//! Documentation content for the sql-rules CLI

use super::CliError;
use crate::default_functions;

/// Available documentation categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocCategory {
    Syntax,
    Operators,
    Functions,
    Select,
}

impl DocCategory {
    /// Parse category name from string
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "syntax" | "paths" => Some(Self::Syntax),
            "operators" | "ops" => Some(Self::Operators),
            "functions" | "function" | "builtins" => Some(Self::Functions),
            "select" | "sql" | "mapper" => Some(Self::Select),
            _ => None,
        }
    }
}

/// Get the docs overview (category listing)
pub fn get_docs_overview() -> &'static str {
    r#"SQL-RULES DOCUMENTATION

sql-rules compiles SQL-flavoured conditions and SELECT statements and runs
them against JSON documents. A condition is true only when it evaluates to
exactly `true`; anything missing along the way is null.

DOCUMENTATION CATEGORIES

  syntax            Fields, paths, indexing, wildcards and literals
  operators         Comparison, logical, arithmetic and bitwise operators
  functions         Built-in functions
  select            SELECT ... FROM ... WHERE statements and output fields

QUICK REFERENCE

  a.b.c             Nested field
  items[0]          Array index (zero-based)
  items[*].price    Every element's price
  root              The whole document
  x IN (1, 2)       Membership
  sum(items[*].n)   Function call

Run 'sql-rules doc <category>' for detailed documentation.
Run 'sql-rules functions' to list every built-in.
"#
}

/// Get documentation for a specific category
pub fn get_doc_category(name: &str) -> Result<&'static str, CliError> {
    match DocCategory::from_name(name) {
        Some(DocCategory::Syntax) => Ok(SYNTAX_DOC),
        Some(DocCategory::Operators) => Ok(OPERATORS_DOC),
        Some(DocCategory::Functions) => Ok(FUNCTIONS_DOC),
        Some(DocCategory::Select) => Ok(SELECT_DOC),
        None => Err(CliError::UnknownCategory(name.to_string())),
    }
}

/// One built-in name per line, sorted.
pub fn list_functions() -> String {
    let mut out = String::new();
    for name in default_functions().names() {
        out.push_str(name);
        out.push('\n');
    }
    out
}

const SYNTAX_DOC: &str = r#"SYNTAX - Fields and Paths

FIELD ACCESS
  name
    A top-level field of the document.

    Example:
      Input:  {"name": "Alice"}
      Query:  name
      Output: "Alice"

  user.address.city
    Nested fields, separated by dots. Missing fields are null.

ARRAY INDEX ACCESS
  items[1]
    Zero-based index into an array, or a single character of a string.
    Out-of-range indexes are null.

  items[*]
    Every element. Following it with a field collects that field from
    each element that has it:

      Input:  {"items": [{"n": 1}, {"n": 2}, {}]}
      Query:  items[*].n
      Output: [1, 2]

ROOT
  root
    The whole document, for documents that are arrays:

      Input:  [{"b": {"c": [1, 2, 3]}}]
      Query:  sum(root[0].b.c)
      Output: 6

    A real field named "root" takes precedence.

LITERALS
  42, 3.5, 1e3      Numbers
  'text', "text"    Strings
  true, false       Booleans (any case)
  null              Null (any case)
"#;

const OPERATORS_DOC: &str = r#"OPERATORS

COMPARISON
  =  ==  !=  <  <=  >  >=
    Numbers compare numerically, strings lexically. Values of different
    kinds are only ever equal or not equal.

LOGICAL
  AND  &&
  OR   ||
  NOT  !
    The right-hand side is evaluated first. `a AND b` does not evaluate
    `a` when `b` is false or null; `a OR b` does not evaluate `a` when
    `b` is true.

MEMBERSHIP
  x IN (a, b, c)
    Same as in(x, a, b, c). Numbers match within 1e-6.

ARITHMETIC
  +  -  *  /
    Decimal arithmetic on numbers (0.1 + 0.2 = 0.3). `+` also
    concatenates two strings. Division by zero is null.

INTEGER AND BITWISE
  %  &  |  ^  <<  >>
    Operands are truncated to 64-bit integers. `^x` is the bitwise
    complement. Modulo by zero is null.

PRECEDENCE (lowest first)
  OR, AND, comparison, + - | ^, * / % << >> &, unary, . [] ()
"#;

const FUNCTIONS_DOC: &str = r#"FUNCTIONS

Function names are case-insensitive. Bad arguments give null (or the
documented default) instead of an error.

AGGREGATES (one array, or any number of values; nulls are skipped)
  len(x)                Elements, characters or keys; 1 for other values
  sum(...)              Sum, 0 when there is nothing to add
  average(...)          Mean, null when empty
  max(...)  min(...)    Largest / smallest number
  array(...)            The arguments as an array

STRINGS AND PREDICATES
  substr(s, start[, length])
  regex(s, pattern)     Unanchored match
  in(x, a, b, ...)      Membership; in(x, array) searches the array
  inrange(x, lo, hi)    lo <= x < hi; wraps around when lo > hi
  ifnull(x)             true when x is null
  nullif(a, b)          null when a equals b, otherwise a
  iif(cond, a, b)       a when cond is true, b when false

CONVERSION
  int(x)  float(x)  string(x)

MATH
  abs  ceil  floor  sqrt  exp  power(x, y)

DATE AND TIME (Unix seconds, local time zone)
  currenttimestamp()
  timestamp(y, m, d, h, mi, s)
  year(ts)  month(ts)  day(ts)  hour(ts)  minute(ts)  second(ts)
"#;

const SELECT_DOC: &str = r#"SELECT STATEMENTS

  SELECT <field> [AS <alias>], ... FROM <name> [WHERE <condition>]

  <name> is an identifier or a quoted string such as "devices/+/status".
  The WHERE condition decides whether a document produces output; the
  fields decide what that output looks like.

FIELDS
  a.b                   Copied to the same path
  a.b AS x.y            Copied to another path
  *                     The whole document
  * AS raw              The whole document under "raw"
  'v1' AS version       A constant
  b.c[2] + b.c[3]       An expression; without AS it is written under a
                        name derived from its text (b.c_2____b.c_3_)

  Null values are left out of the output.

EXAMPLE
  Input:  {"a": 1, "b": {"c": [1, 2, 3, 4, 5]}}
  Query:  SELECT a, sum(b.c) AS total FROM t WHERE a < 2
  Output: {"a": 1, "total": 15}
"#;
