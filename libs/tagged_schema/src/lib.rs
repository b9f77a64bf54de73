//! # Schema validation for decoded payloads
//!
//! Checks a [`Value`] produced by [`serde_tagged::decode`] against a
//! [`Schema`] and projects it into a typed [`Record`].
//!
//! Validation never touches the input bytes again and never performs I/O.
//! [`parse`] runs both stages in one call.

use serde_tagged::{Limits, Value};

mod error;
mod record;
mod schema;
mod validate;

pub use error::{Error, ROOT, Reason, ValidationError};
pub use record::{Field, Record};
pub use schema::{FieldKind, FieldSpec, Range, Schema, UnknownKeys};
pub use validate::{validate, validate_all};


/// Decodes `input` within `limits` and validates the result against `schema`.
///
/// # Errors
///
/// Returns [`Error::Decode`] if the input is malformed or disallowed, and
/// [`Error::ValidationFailed`] if it decodes but doesn't match the schema.
pub fn parse(input: &[u8], limits: Limits, schema: &Schema) -> Result<Record, Error> {
    let value: Value = serde_tagged::decode(input, limits)?;
    Ok(validate(&value, schema)?)
}
