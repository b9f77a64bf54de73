use std::ops::ControlFlow;

use serde_tagged::{Key, Value};

use crate::error::{ROOT, Reason, ValidationError};
use crate::record::{Field, Record};
use crate::schema::{FieldKind, FieldSpec, Range, Schema, UnknownKeys};

/// Validates a decoded value against a schema.
///
/// Checks happen in a fixed order: whole-tree bounds, the top-level array,
/// its keys, and then every schema field in declaration order. The first
/// failure is returned.
///
/// # Errors
///
/// Returns the first rule the value breaks.
pub fn validate(value: &Value, schema: &Schema) -> Result<Record, ValidationError> {
    let mut run = Validation::new(schema, true);
    let record = run.check(value);
    match (record, run.errors.into_iter().next()) {
        (_, Some(err)) => Err(err),
        (ControlFlow::Continue(record), None) => Ok(record),
        // stopping always records an error first
        (ControlFlow::Break(()), None) => Err(ValidationError::new(ROOT, Reason::NotAnArray)),
    }
}

/// Validates a decoded value against a schema, collecting every failure.
///
/// # Errors
///
/// Returns all broken rules, in the same order [`validate`] checks them.
/// Once the top-level value turns out not to be an array, nothing further is
/// checked.
pub fn validate_all(value: &Value, schema: &Schema) -> Result<Record, Vec<ValidationError>> {
    let mut run = Validation::new(schema, false);
    match run.check(value) {
        ControlFlow::Continue(record) if run.errors.is_empty() => Ok(record),
        _ => Err(run.errors),
    }
}

struct Validation<'a> {
    schema: &'a Schema,
    stop_early: bool,
    errors: Vec<ValidationError>,
}

impl<'a> Validation<'a> {
    fn new(schema: &'a Schema, stop_early: bool) -> Self {
        Self {
            schema,
            stop_early,
            errors: Vec::new(),
        }
    }

    fn fail(&mut self, field: impl Into<String>, reason: Reason) -> ControlFlow<()> {
        self.errors.push(ValidationError::new(field, reason));
        if self.stop_early {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }

    fn check(&mut self, value: &Value) -> ControlFlow<(), Record> {
        let schema = self.schema;

        if value.depth() > schema.max_depth {
            self.fail(ROOT, Reason::TooDeep)?;
        }

        if value.node_count() > schema.max_nodes {
            self.fail(ROOT, Reason::TooManyNodes)?;
        }

        let Some(pairs) = value.as_array() else {
            _ = self.fail(ROOT, Reason::NotAnArray);
            return ControlFlow::Break(());
        };

        // index into `schema.fields` -> the value found for it
        let mut found: Vec<Option<&Value>> = vec![None; schema.fields.len()];
        for (key, value) in pairs {
            let index = match key {
                Key::String(name) => std::str::from_utf8(name)
                    .ok()
                    .and_then(|name| schema.fields.get_index_of(name)),
                Key::Int(_) => None,
            };

            match index.and_then(|i| found.get_mut(i)) {
                Some(slot) if slot.is_none() => *slot = Some(value),
                Some(_) => self.fail(key.to_string(), Reason::Duplicate)?,
                None if schema.unknown_keys == UnknownKeys::Reject => {
                    self.fail(key.to_string(), Reason::UnknownKey)?;
                },
                None => {},
            }
        }

        let mut record = Record::default();
        for ((name, spec), value) in schema.fields.iter().zip(found) {
            match value {
                Some(value) => match project(value, spec) {
                    Ok(field) => record.insert(name, field),
                    Err(reason) => self.fail(name.as_str(), reason)?,
                },
                None if spec.required => self.fail(name.as_str(), Reason::Missing)?,
                None => {},
            }
        }

        ControlFlow::Continue(record)
    }
}

/// Checks a single value against its field rules and converts it.
fn project(value: &Value, spec: &FieldSpec) -> Result<Field, Reason> {
    let range = |n: Number| spec.range.map_or(Ok(()), |r| check_range(r, n));
    let max_len = |len: usize| match spec.max_len {
        Some(max) if len > max => Err(Reason::TooLong),
        _ => Ok(()),
    };

    match (spec.kind, value) {
        (FieldKind::Null, Value::Null) => Ok(Field::Null),
        (FieldKind::Bool, Value::Bool(v)) => Ok(Field::Bool(*v)),
        (FieldKind::Int, Value::Int(v)) => {
            range(Number::Int(*v))?;
            Ok(Field::Int(*v))
        },
        (FieldKind::Float | FieldKind::Number, Value::Float(v)) => {
            range(Number::Float(*v))?;
            Ok(Field::Float(*v))
        },
        (FieldKind::Number, Value::Int(v)) => {
            range(Number::Int(*v))?;
            Ok(Field::Float(Number::Int(*v).as_f64()))
        },
        (FieldKind::String, Value::String(v)) => {
            max_len(v.len())?;
            let text = String::from_utf8(v.clone()).map_err(|_| Reason::NotUtf8)?;
            Ok(Field::Text(text))
        },
        (FieldKind::Bytes, Value::String(v)) => {
            max_len(v.len())?;
            Ok(Field::Bytes(v.clone()))
        },
        (FieldKind::Array, Value::Array(pairs)) => {
            max_len(pairs.len())?;
            Ok(Field::Array(value.clone()))
        },
        (expected, found) => Err(Reason::WrongKind {
            expected,
            found: found.kind(),
        }),
    }
}

#[derive(Debug, Clone, Copy)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    #[allow(clippy::cast_precision_loss)]
    fn as_f64(self) -> f64 {
        match self {
            Self::Int(v) => v as f64,
            Self::Float(v) => v,
        }
    }

    fn is_negative(self) -> bool {
        match self {
            Self::Int(v) => v < 0,
            Self::Float(v) => v < 0.0,
        }
    }

    fn is_positive(self) -> bool {
        match self {
            Self::Int(v) => v > 0,
            Self::Float(v) => v > 0.0,
        }
    }
}

fn check_range(range: Range, n: Number) -> Result<(), Reason> {
    match range {
        Range::NonNegative if n.is_negative() => Err(Reason::Negative),
        Range::Positive if !n.is_positive() => Err(Reason::NotPositive),
        Range::Between { min: Some(min), .. } if n.as_f64() < min => Err(Reason::BelowMinimum),
        Range::Between { max: Some(max), .. } if n.as_f64() > max => Err(Reason::AboveMaximum),
        Range::NonNegative | Range::Positive | Range::Between { .. } => Ok(()),
    }
}
