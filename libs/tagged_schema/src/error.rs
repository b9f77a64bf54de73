use std::fmt;

use serde_tagged::{DecodeError, Kind};

use crate::schema::FieldKind;

/// Field name used for failures that concern the payload as a whole.
pub const ROOT: &str = "$";

/// A schema rule that a payload broke.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    /// The top-level key the failure is about, or [`ROOT`].
    pub field: String,
    pub reason: Reason,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: Reason) -> Self {
        Self {
            field: field.into(),
            reason,
        }
    }
}

/// Why a field failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Reason {
    Missing,
    WrongKind { expected: FieldKind, found: Kind },
    NotUtf8,
    Negative,
    NotPositive,
    BelowMinimum,
    AboveMaximum,
    TooLong,
    UnknownKey,
    Duplicate,
    NotAnArray,
    TooManyNodes,
    TooDeep,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => f.write_str("missing"),
            Self::WrongKind { expected, found } => write!(f, "expected {expected}, found {found}"),
            Self::NotUtf8 => f.write_str("not valid utf-8"),
            Self::Negative => f.write_str("negative"),
            Self::NotPositive => f.write_str("not positive"),
            Self::BelowMinimum => f.write_str("below minimum"),
            Self::AboveMaximum => f.write_str("above maximum"),
            Self::TooLong => f.write_str("too long"),
            Self::UnknownKey => f.write_str("unknown key"),
            Self::Duplicate => f.write_str("duplicate key"),
            Self::NotAnArray => f.write_str("not an array"),
            Self::TooManyNodes => f.write_str("too many nodes"),
            Self::TooDeep => f.write_str("nested too deeply"),
        }
    }
}

/// Either stage of [`parse`](crate::parse) failing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),
    #[error("validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

impl Error {
    /// A stable, machine-friendly label for the failure.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Decode(err) => err.kind(),
            Self::ValidationFailed(_) => "validation_failed",
        }
    }
}
