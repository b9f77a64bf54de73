//! The in-memory model for decoded payloads.

use std::convert::identity;
use std::fmt;

use serde_core::ser::{Serialize, SerializeSeq as _, SerializeTuple as _, Serializer};

/// A decoded value.
///
/// These are the only kinds the decoder will ever produce. There is no
/// variant for objects or references, so a tree of [`Value`] cannot carry an
/// attacker-chosen type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `N;`
    Null,
    /// `b:0;` or `b:1;`
    Bool(bool),
    /// `i:<int>;`
    Int(i64),
    /// `d:<float>;`
    Float(f64),
    /// `s:<len>:"<bytes>";`
    ///
    /// Strings are raw bytes. They are not required to be UTF-8.
    String(Vec<u8>),
    /// `a:<count>:{<pairs>}`
    ///
    /// Pairs keep their input order. Duplicate keys are not merged.
    Array(Vec<(Key, Value)>),
}

/// A key of an [`Value::Array`] pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// An integer key, encoded with the `i` tag.
    Int(i64),
    /// A string key, encoded with the `s` tag.
    String(Vec<u8>),
}

/// The kind of a [`Value`], without its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Null,
    Bool,
    Int,
    Float,
    String,
    Array,
}

impl Kind {
    /// A short lowercase name for the kind.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::String => "string",
            Self::Array => "array",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Value {
    /// Gets the kind of this value.
    pub const fn kind(&self) -> Kind {
        match self {
            Self::Null => Kind::Null,
            Self::Bool(_) => Kind::Bool,
            Self::Int(_) => Kind::Int,
            Self::Float(_) => Kind::Float,
            Self::String(_) => Kind::String,
            Self::Array(_) => Kind::Array,
        }
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    /// Gets the string data if this is a string holding valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|v| std::str::from_utf8(v).ok())
    }

    pub fn as_array(&self) -> Option<&[(Key, Self)]> {
        match self {
            Self::Array(v) => Some(v),
            _ => None,
        }
    }

    /// Looks up the first pair with the given string key.
    ///
    /// Returns [`None`] if this isn't an array or no such key exists.
    pub fn get(&self, key: &str) -> Option<&Self> {
        self.get_key(&Key::from(key))
    }

    /// Looks up the first pair with the given key.
    pub fn get_key(&self, key: &Key) -> Option<&Self> {
        self.as_array()?
            .iter()
            .find_map(|(k, v)| (k == key).then_some(v))
    }

    /// Counts the nodes in this tree. Every value and every key is one node.
    pub fn node_count(&self) -> usize {
        match self {
            Self::Array(pairs) => pairs
                .iter()
                .fold(1, |acc, (_, v)| acc.saturating_add(1).saturating_add(v.node_count())),
            _ => 1,
        }
    }

    /// Gets the array nesting depth of this tree.
    ///
    /// Scalars have a depth of 0 and an array is one deeper than its deepest
    /// element.
    pub fn depth(&self) -> usize {
        match self {
            Self::Array(pairs) => 1 + pairs.iter().map(|(_, v)| v.depth()).max().unwrap_or(0),
            _ => 0,
        }
    }
}

impl Key {
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::String(_) => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Int(_) => None,
            Self::String(v) => Some(v),
        }
    }

    /// Gets the key as a string if it is a string holding valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|v| std::str::from_utf8(v).ok())
    }
}

/// Formats integer keys as decimal and string keys lossily as UTF-8.
impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::String(v) => f.write_str(&String::from_utf8_lossy(v)),
        }
    }
}

impl TryFrom<Value> for Key {
    type Error = Value;

    /// Converts an [`Value::Int`] or [`Value::String`] into a key. Any other
    /// value is returned as the error.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Int(v) => Ok(Self::Int(v)),
            Value::String(v) => Ok(Self::String(v)),
            other => Err(other),
        }
    }
}

impl From<Key> for Value {
    fn from(value: Key) -> Self {
        match value {
            Key::Int(v) => Self::Int(v),
            Key::String(v) => Self::String(v),
        }
    }
}

macro_rules! impl_from {
    ($($Ty:ty => $Target:ident :: $Var:ident ($conv:expr)),* $(,)?) => {
        $(
            impl From<$Ty> for $Target {
                fn from(value: $Ty) -> Self {
                    Self::$Var($conv(value))
                }
            }
        )*
    };
}

impl_from!(
    bool => Value::Bool(identity),
    i32 => Value::Int(i64::from),
    i64 => Value::Int(identity),
    f64 => Value::Float(identity),
    &str => Value::String(|v: &str| v.as_bytes().to_vec()),
    String => Value::String(String::into_bytes),
    &[u8] => Value::String(<[u8]>::to_vec),
    Vec<u8> => Value::String(identity),
    Vec<(Key, Value)> => Value::Array(identity),
    i32 => Key::Int(i64::from),
    i64 => Key::Int(identity),
    &str => Key::String(|v: &str| v.as_bytes().to_vec()),
    String => Key::String(String::into_bytes),
    &[u8] => Key::String(<[u8]>::to_vec),
);

impl FromIterator<(Key, Value)> for Value {
    fn from_iter<T: IntoIterator<Item = (Key, Value)>>(iter: T) -> Self {
        Self::Array(iter.into_iter().collect())
    }
}

/// Serializes byte strings as `str` when they are valid UTF-8 and as bytes
/// otherwise.
fn serialize_bytes<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    match std::str::from_utf8(bytes) {
        Ok(s) => serializer.serialize_str(s),
        Err(_) => serializer.serialize_bytes(bytes),
    }
}

/// Arrays serialize as a sequence of `[key, value]` pairs so that order and
/// duplicate keys survive formats like JSON.
impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(v) => serializer.serialize_bool(*v),
            Self::Int(v) => serializer.serialize_i64(*v),
            Self::Float(v) => serializer.serialize_f64(*v),
            Self::String(v) => serialize_bytes(v, serializer),
            Self::Array(pairs) => {
                let mut seq = serializer.serialize_seq(Some(pairs.len()))?;
                for pair in pairs {
                    seq.serialize_element(&Pair(pair))?;
                }
                seq.end()
            },
        }
    }
}

impl Serialize for Key {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Int(v) => serializer.serialize_i64(*v),
            Self::String(v) => serialize_bytes(v, serializer),
        }
    }
}

struct Pair<'a>(&'a (Key, Value));

impl Serialize for Pair<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let (key, value) = self.0;
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(key)?;
        tuple.serialize_element(value)?;
        tuple.end()
    }
}
