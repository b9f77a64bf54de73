use indexmap::IndexMap;
use serde_tagged::{Kind, Value};

/// A typed field of a validated [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    /// Arrays are kept as-is. Their content was only checked for its length.
    Array(Value),
}

impl Field {
    /// Gets the kind of value this field was projected from.
    pub const fn kind(&self) -> Kind {
        match self {
            Self::Null => Kind::Null,
            Self::Bool(_) => Kind::Bool,
            Self::Int(_) => Kind::Int,
            Self::Float(_) => Kind::Float,
            Self::Text(_) | Self::Bytes(_) => Kind::String,
            Self::Array(_) => Kind::Array,
        }
    }
}

/// The validated, typed projection of a payload.
///
/// Holds one entry per schema field that was present, in schema order.
/// Optional fields that were absent are not included.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: IndexMap<String, Field>,
}

impl Record {
    pub(crate) fn insert(&mut self, name: &str, field: Field) {
        self.fields.insert(name.to_owned(), field);
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            Field::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            Field::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn float(&self, name: &str) -> Option<f64> {
        match self.get(name)? {
            Field::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            Field::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn bytes(&self, name: &str) -> Option<&[u8]> {
        match self.get(name)? {
            Field::Bytes(v) => Some(v),
            Field::Text(v) => Some(v.as_bytes()),
            _ => None,
        }
    }

    pub fn array(&self, name: &str) -> Option<&Value> {
        match self.get(name)? {
            Field::Array(v) => Some(v),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates the fields in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}
