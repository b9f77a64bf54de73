use std::fmt;

use indexmap::IndexMap;
use serde::Deserialize;

/// Describes the accepted shape of a decoded payload.
///
/// The top-level value must be an array whose string keys name the fields.
/// A schema can be built in code or deserialized, for example from TOML:
///
/// ```toml
/// unknown_keys = "reject"
/// max_nodes = 64
///
/// [fields.sku]
/// kind = "string"
/// max_len = 32
///
/// [fields.quantity]
/// kind = "int"
/// range = "non_negative"
///
/// [fields.note]
/// kind = "string"
/// required = false
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Schema {
    /// Top-level fields in the order they are checked.
    #[serde(default)]
    pub fields: IndexMap<String, FieldSpec>,
    /// Maximum number of nodes in the whole tree, counting keys and values.
    #[serde(default = "default_max_nodes")]
    pub max_nodes: usize,
    /// Maximum array nesting depth of the whole tree.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    #[serde(default)]
    pub unknown_keys: UnknownKeys,
}

const fn default_max_nodes() -> usize {
    1024
}

const fn default_max_depth() -> usize {
    8
}

/// What to do with top-level keys the schema doesn't name.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownKeys {
    #[default]
    Reject,
    Ignore,
}

/// Rules for a single top-level field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSpec {
    pub kind: FieldKind,
    #[serde(default = "default_required")]
    pub required: bool,
    /// Only checked for numeric kinds.
    #[serde(default)]
    pub range: Option<Range>,
    /// Byte length for strings, pair count for arrays.
    #[serde(default)]
    pub max_len: Option<usize>,
}

const fn default_required() -> bool {
    true
}

/// The expected kind of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Null,
    Bool,
    Int,
    Float,
    /// Either an int or a float, projected to a float.
    Number,
    /// A string holding valid UTF-8.
    String,
    /// A string with arbitrary bytes.
    Bytes,
    Array,
}

impl FieldKind {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Number => "number",
            Self::String => "string",
            Self::Bytes => "bytes",
            Self::Array => "array",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A numeric range constraint.
///
/// Deserializes from `"non_negative"`, `"positive"`, or a table with
/// optional inclusive `min` and `max` bounds.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(from = "RawRange")]
pub enum Range {
    /// Zero or more.
    NonNegative,
    /// Strictly more than zero.
    Positive,
    /// Inclusive bounds, either of which may be absent.
    Between { min: Option<f64>, max: Option<f64> },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRange {
    Named(NamedRange),
    Bounds(Bounds),
}

/// A misspelled bound must not silently leave the range open.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Bounds {
    #[serde(default)]
    min: Option<f64>,
    #[serde(default)]
    max: Option<f64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum NamedRange {
    NonNegative,
    Positive,
}

impl From<RawRange> for Range {
    fn from(value: RawRange) -> Self {
        match value {
            RawRange::Named(NamedRange::NonNegative) => Self::NonNegative,
            RawRange::Named(NamedRange::Positive) => Self::Positive,
            RawRange::Bounds(Bounds { min, max }) => Self::Between { min, max },
        }
    }
}

impl Schema {
    /// Creates an empty schema with default bounds that rejects unknown keys.
    pub fn new() -> Self {
        Self {
            fields: IndexMap::new(),
            max_nodes: default_max_nodes(),
            max_depth: default_max_depth(),
            unknown_keys: UnknownKeys::Reject,
        }
    }

    /// Adds or replaces a field.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, spec: FieldSpec) -> Self {
        self.fields.insert(name.into(), spec);
        self
    }

    #[must_use]
    pub fn max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    #[must_use]
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn unknown_keys(mut self, unknown_keys: UnknownKeys) -> Self {
        self.unknown_keys = unknown_keys;
        self
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldSpec {
    /// Creates a required field of the given kind with no further rules.
    pub const fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            required: true,
            range: None,
            max_len: None,
        }
    }

    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    #[must_use]
    pub const fn range(mut self, range: Range) -> Self {
        self.range = Some(range);
        self
    }

    #[must_use]
    pub const fn max_len(mut self, max_len: usize) -> Self {
        self.max_len = Some(max_len);
        self
    }
}
