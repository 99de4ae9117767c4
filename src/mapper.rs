//! Field projection: builds a new document out of values read from the input.
//!
//! A [`Mapper`] is an ordered list of [`FieldSpec`]s. Applying it starts from
//! an empty object and, field by field:
//!
//! - computes the value (constant, key path, expression, ...),
//! - skips it if it is Null,
//! - writes it at the field's target path, creating intermediate objects.
//!
//! A `*` target whose value is an object replaces everything written so far.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::{
    error::CompileError,
    evaluator::Evaluator,
    filter::compile_expression,
    function::{FunctionScope, FunctionTable},
    keypath::{self, KeyPath},
    value::Value,
};

pub mod field;

pub use field::{Combine, FieldSpec, Source, Transform};

#[derive(Clone, Default)]
pub struct Mapper {
    fields: Vec<FieldSpec>,
    functions: FunctionScope,
}

impl Mapper {
    /// An empty mapper whose expressions call into `functions` before the
    /// built-ins.
    pub fn new(functions: Option<Arc<FunctionTable>>) -> Self {
        Mapper {
            fields: Vec::new(),
            functions: FunctionScope::from(functions),
        }
    }

    /// Add a field, picking the cheapest way to compute it.
    ///
    /// * a key path (`a.b`, `*`) is read directly and written to the same
    ///   path unless `target` says otherwise;
    /// * a bare number or quoted string becomes a constant;
    /// * anything else is compiled as an expression and, without a `target`,
    ///   written under its sanitized text.
    ///
    /// # Examples
    ///
    /// ```
    /// use sql_rules::{Mapper, Value};
    ///
    /// let mut mapper = Mapper::new(None);
    /// mapper
    ///     .add_field("a.a", None)?
    ///     .add_field("b.c[2] + b.c[3]", Some("total"))?
    ///     .add_field("'v1'", Some("version"))?;
    ///
    /// let doc = Value::from_json_str(r#"{"a": {"a": 1}, "b": {"c": [1, 2, 3, 4]}}"#)?;
    /// let out = mapper.apply(&doc);
    /// let expected = Value::from_json_str(r#"{"a": {"a": 1}, "total": 7, "version": "v1"}"#)?;
    /// assert_eq!(out, expected);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn add_field(
        &mut self,
        source: &str,
        target: Option<&str>,
    ) -> Result<&mut Self, CompileError> {
        if let Some(path) = KeyPath::parse(source) {
            let target = match target {
                Some(target) => parse_target(target)?,
                None => path.clone(),
            };
            let source = match path {
                KeyPath::Whole => Source::Whole,
                path => Source::Path(path),
            };
            return Ok(self.push(FieldSpec::SingleSource {
                source,
                target,
                transform: None,
            }));
        }

        let constant = match keypath::literal_string(source) {
            Some(s) => Some((Value::from(s), s)),
            None => keypath::literal_number(source).map(|n| (Value::Number(n), source)),
        };
        if let Some((value, text)) = constant {
            let target = match target {
                Some(target) => target.to_string(),
                None => keypath::sanitize_identifier(text),
            };
            return self.add_constant(value, &target);
        }

        self.add_function_field(source, target, None)
    }

    /// Add a field holding `value`.
    pub fn add_constant(
        &mut self,
        value: impl Into<Value>,
        target: &str,
    ) -> Result<&mut Self, CompileError> {
        let target = parse_target(target)?;
        Ok(self.push(FieldSpec::Constant {
            value: value.into(),
            target,
        }))
    }

    /// Add a field holding the current Unix time, optionally transformed.
    pub fn add_current_timestamp(
        &mut self,
        target: &str,
        transform: Option<Transform>,
    ) -> Result<&mut Self, CompileError> {
        let target = parse_target(target)?;
        Ok(self.push(FieldSpec::CurrentTimestamp { target, transform }))
    }

    /// Add a field computed by an expression, optionally transformed.
    pub fn add_function_field(
        &mut self,
        source: &str,
        target: Option<&str>,
        transform: Option<Transform>,
    ) -> Result<&mut Self, CompileError> {
        let source_text = source.trim();
        if source_text.is_empty() {
            return Err(CompileError::InvalidSourcePath(source.to_string()));
        }
        let target = match target {
            Some(target) => parse_target(target)?,
            None => parse_target(&keypath::sanitize_identifier(source_text))?,
        };
        let source = compile_source(source_text)?;
        Ok(self.push(FieldSpec::SingleSource {
            source,
            target,
            transform,
        }))
    }

    /// Add a field computed from several sources by `combine`.
    pub fn add_multi_source(
        &mut self,
        sources: &[&str],
        target: &str,
        combine: Option<Combine>,
    ) -> Result<&mut Self, CompileError> {
        let compiled = sources
            .iter()
            .map(|source| {
                let source = source.trim();
                if source.is_empty() {
                    return Err(CompileError::InvalidSourcePath(source.to_string()));
                }
                compile_source(source)
            })
            .collect::<Result<Vec<_>, _>>()?;
        let target_path = parse_target(target)?;
        let combine = combine.ok_or_else(|| CompileError::MissingCombiner {
            target: target.to_string(),
            count: sources.len(),
        })?;

        Ok(self.push(FieldSpec::MultiSource {
            sources: compiled,
            target: target_path,
            combine,
        }))
    }

    fn push(&mut self, field: FieldSpec) -> &mut Self {
        log::debug!("mapper field -> {}", field.target());
        self.fields.push(field);
        self
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Build the output object for `document`.
    ///
    /// Always returns a [`Value::Object`].
    pub fn apply(&self, document: &Value) -> Value {
        let evaluator = Evaluator::new(&self.functions);
        let mut out = HashMap::new();

        for field in &self.fields {
            let value = field.value(document, &evaluator);
            if value.is_null() {
                continue;
            }
            match field.target() {
                KeyPath::Whole => {
                    if let Value::Object(map) = value {
                        out = map;
                    }
                }
                path => keypath::set_by_path(&mut out, path, value),
            }
        }

        Value::Object(out)
    }
}

impl fmt::Debug for Mapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mapper").field("fields", &self.fields).finish()
    }
}

fn parse_target(target: &str) -> Result<KeyPath, CompileError> {
    KeyPath::parse(target).ok_or_else(|| CompileError::InvalidTargetPath(target.to_string()))
}

fn compile_source(source: &str) -> Result<Source, CompileError> {
    Ok(match KeyPath::parse(source) {
        Some(KeyPath::Whole) => Source::Whole,
        Some(path) => Source::Path(path),
        None => Source::Expr(compile_expression(source)?),
    })
}

/// Compile `(source, target)` pairs with [`Mapper::add_field`].
pub fn compile_mapper(
    fields: &[(&str, Option<&str>)],
    functions: Option<Arc<FunctionTable>>,
) -> Result<Mapper, CompileError> {
    let mut mapper = Mapper::new(functions);
    for (source, target) in fields {
        mapper.add_field(source, *target)?;
    }
    Ok(mapper)
}
