use std::fmt;
use std::sync::Arc;

use crate::{
    ast::Expr,
    evaluator::Evaluator,
    function::datetime,
    keypath::{KeyPath, get_by_path},
    value::Value,
};

/// Post-processing applied to a single-source field value.
pub type Transform = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Folds the values of a multi-source field into one.
pub type Combine = Arc<dyn Fn(Vec<Value>) -> Value + Send + Sync>;

/// Where a field reads its value from.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    /// `*`: the whole input document
    Whole,
    /// A plain key path, read without going through the evaluator
    Path(KeyPath),
    /// Any other expression
    Expr(Expr),
}

impl Source {
    fn resolve(&self, document: &Value, evaluator: &Evaluator<'_>) -> Value {
        match self {
            Source::Whole => document.clone(),
            Source::Path(path) => get_by_path(document, path),
            Source::Expr(expr) => evaluator.evaluate(expr, document),
        }
    }
}

/// One output field of a [`Mapper`](super::Mapper).
#[derive(Clone)]
pub enum FieldSpec {
    /// A fixed value
    Constant { value: Value, target: KeyPath },

    /// The Unix time at which the mapper runs
    CurrentTimestamp {
        target: KeyPath,
        transform: Option<Transform>,
    },

    SingleSource {
        source: Source,
        target: KeyPath,
        transform: Option<Transform>,
    },

    /// Several sources, evaluated in order and handed to `combine`
    MultiSource {
        sources: Vec<Source>,
        target: KeyPath,
        combine: Combine,
    },
}

impl FieldSpec {
    pub fn target(&self) -> &KeyPath {
        match self {
            FieldSpec::Constant { target, .. }
            | FieldSpec::CurrentTimestamp { target, .. }
            | FieldSpec::SingleSource { target, .. }
            | FieldSpec::MultiSource { target, .. } => target,
        }
    }

    pub(crate) fn value(&self, document: &Value, evaluator: &Evaluator<'_>) -> Value {
        match self {
            FieldSpec::Constant { value, .. } => value.clone(),
            FieldSpec::CurrentTimestamp { transform, .. } => {
                apply(transform, datetime::current_timestamp(&[]))
            }
            FieldSpec::SingleSource {
                source, transform, ..
            } => apply(transform, source.resolve(document, evaluator)),
            FieldSpec::MultiSource {
                sources, combine, ..
            } => combine(
                sources
                    .iter()
                    .map(|source| source.resolve(document, evaluator))
                    .collect(),
            ),
        }
    }
}

fn apply(transform: &Option<Transform>, value: Value) -> Value {
    match transform {
        Some(transform) => transform(value),
        None => value,
    }
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldSpec::Constant { value, target } => f
                .debug_struct("Constant")
                .field("value", value)
                .field("target", target)
                .finish(),
            FieldSpec::CurrentTimestamp { target, transform } => f
                .debug_struct("CurrentTimestamp")
                .field("target", target)
                .field("transform", &transform.is_some())
                .finish(),
            FieldSpec::SingleSource {
                source,
                target,
                transform,
            } => f
                .debug_struct("SingleSource")
                .field("source", source)
                .field("target", target)
                .field("transform", &transform.is_some())
                .finish(),
            FieldSpec::MultiSource {
                sources, target, ..
            } => f
                .debug_struct("MultiSource")
                .field("sources", sources)
                .field("target", target)
                .finish_non_exhaustive(),
        }
    }
}
