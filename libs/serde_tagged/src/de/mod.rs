//! Exposes the decoder and its resource limits.

use crate::value::{Key, Value};

mod error;
mod read;

pub use error::DecodeError;
use read::Cursor;

/// Minimum encoded size of one array pair, `i:0;N;`.
const MIN_PAIR_LEN: usize = 6;

/// Upper bound for capacity reserved up-front for an array's pairs.
const MAX_PREALLOC: usize = 0x100;

/// Resource bounds enforced while decoding.
///
/// These are operational constants and should never be taken from the
/// payload's sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum array nesting. A top-level array is at depth 1.
    pub max_depth: usize,
    /// Maximum number of array pairs in the whole tree.
    pub max_elements: usize,
    /// Maximum input length in bytes.
    pub max_input_len: usize,
}

impl Limits {
    pub const DEFAULT: Self = Self {
        max_depth: 32,
        max_elements: 0x1_0000,
        max_input_len: 0x10_0000,
    };

    /// Creates the default limits.
    pub const fn new() -> Self {
        Self::DEFAULT
    }

    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub const fn with_max_elements(mut self, max_elements: usize) -> Self {
        self.max_elements = max_elements;
        self
    }

    #[must_use]
    pub const fn with_max_input_len(mut self, max_input_len: usize) -> Self {
        self.max_input_len = max_input_len;
        self
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Decodes a value from a byte slice.
///
/// The whole slice must be consumed by exactly one value, otherwise this
/// returns [`DecodeError::TrailingData`]. Only the `N`, `b`, `i`, `d`, `s`,
/// and `a` tags are accepted. Object, class, and reference tags are rejected
/// with [`DecodeError::DisallowedType`] wherever they appear.
///
/// # Errors
///
/// Returns the first [`DecodeError`] encountered. No partial value is
/// returned on failure.
///
/// # Examples
///
/// ```
/// use serde_tagged::{DecodeError, Limits, Value, decode};
///
/// let value = decode(b"s:5:\"hello\";", Limits::new());
/// assert_eq!(value, Ok(Value::from("hello")));
///
/// let object = decode(b"O:8:\"stdClass\":0:{}", Limits::new());
/// assert_eq!(object, Err(DecodeError::DisallowedType));
/// ```
pub fn decode(input: &[u8], limits: Limits) -> Result<Value, DecodeError> {
    if input.len() > limits.max_input_len {
        return Err(DecodeError::SizeExceeded);
    }

    let mut de = Decoder::new(input, limits);
    let value = de.parse_value(Position::Value)?;

    if !de.cursor.is_empty() {
        return Err(DecodeError::TrailingData);
    }

    Ok(value)
}

/// The type tag that starts every token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Null,
    Bool,
    Int,
    Float,
    String,
    Array,
    /// Part of the full grammar, but never accepted: objects (`O`), custom
    /// serialized classes (`C`), references (`R`, `r`), escaped strings (`S`)
    /// and enum cases (`E`).
    Disallowed,
    /// Not part of the grammar at all.
    Unknown,
}

impl Tag {
    fn from_byte(b: u8) -> Self {
        match b {
            b'N' => Self::Null,
            b'b' => Self::Bool,
            b'i' => Self::Int,
            b'd' => Self::Float,
            b's' => Self::String,
            b'a' => Self::Array,
            b'O' | b'C' | b'R' | b'r' | b'S' | b'E' => Self::Disallowed,
            _ => Self::Unknown,
        }
    }

    fn is_key(self) -> bool {
        matches!(self, Self::Int | Self::String)
    }
}

/// Where in the grammar a value is being parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    /// Top-level value or array element value.
    Value,
    /// Array element key. Only integers and strings are allowed here.
    Key,
}

/// Parser state for one decode call.
#[derive(Debug)]
struct Decoder<'a> {
    cursor: Cursor<'a>,
    limits: Limits,
    depth: usize,
    elements: usize,
}

impl<'a> Decoder<'a> {
    fn new(input: &'a [u8], limits: Limits) -> Self {
        Self {
            cursor: Cursor::new(input),
            limits,
            depth: 0,
            elements: 0,
        }
    }

    fn parse_value(&mut self, position: Position) -> Result<Value, DecodeError> {
        let tag = Tag::from_byte(self.cursor.next_byte()?);

        // disallowed tags are reported as such even in key position
        match tag {
            Tag::Disallowed => Err(DecodeError::DisallowedType),
            Tag::Unknown => Err(DecodeError::InvalidTag),
            _ if position == Position::Key && !tag.is_key() => Err(DecodeError::InvalidKeyType),
            Tag::Null => {
                self.cursor.expect(b';')?;
                Ok(Value::Null)
            },
            Tag::Bool => self.parse_bool(),
            Tag::Int => self.parse_int(),
            Tag::Float => self.parse_float(),
            Tag::String => self.parse_string(),
            Tag::Array => self.parse_array(),
        }
    }

    fn parse_key(&mut self) -> Result<Key, DecodeError> {
        let value = self.parse_value(Position::Key)?;
        Key::try_from(value).map_err(|_| DecodeError::InvalidKeyType)
    }

    fn parse_bool(&mut self) -> Result<Value, DecodeError> {
        self.cursor.expect(b':')?;
        let v = match self.cursor.next_byte()? {
            b'0' => false,
            b'1' => true,
            _ => return Err(DecodeError::InvalidTag),
        };

        self.cursor.expect(b';')?;
        Ok(Value::Bool(v))
    }

    fn parse_int(&mut self) -> Result<Value, DecodeError> {
        self.cursor.expect(b':')?;
        let mut first = true;
        let literal = self.cursor.take_while(|b| {
            let ok = b.is_ascii_digit() || (first && b == b'-');
            first = false;
            ok
        });
        self.end_number()?;

        // out of range integers are rejected rather than widened to floats
        let v: i64 = parse_ascii(literal).ok_or(DecodeError::InvalidNumber)?;
        Ok(Value::Int(v))
    }

    fn parse_float(&mut self) -> Result<Value, DecodeError> {
        self.cursor.expect(b':')?;
        let literal = self
            .cursor
            .take_while(|b| matches!(b, b'0'..=b'9' | b'+' | b'-' | b'.' | b'e' | b'E'));
        self.end_number()?;

        let v: f64 = parse_ascii(literal).ok_or(DecodeError::InvalidNumber)?;
        if !v.is_finite() {
            return Err(DecodeError::InvalidNumber);
        }

        Ok(Value::Float(v))
    }

    fn parse_string(&mut self) -> Result<Value, DecodeError> {
        self.cursor.expect(b':')?;
        let len = self.parse_len(b':')?;
        self.cursor.expect(b'"')?;

        if len > self.cursor.remaining() {
            return Err(DecodeError::InvalidLength);
        }

        let bytes = self.cursor.take(len)?;

        // anything but the closing quote right after the content means the
        // length prefix lied, including running out of input
        if self.cursor.next_byte() != Ok(b'"') {
            return Err(DecodeError::LengthMismatch);
        }

        self.cursor.expect(b';')?;
        Ok(Value::String(bytes.to_vec()))
    }

    fn parse_array(&mut self) -> Result<Value, DecodeError> {
        self.cursor.expect(b':')?;
        let count = self.parse_len(b':')?;
        self.cursor.expect(b'{')?;

        if self.depth >= self.limits.max_depth {
            return Err(DecodeError::DepthExceeded);
        }

        let elements = self
            .elements
            .checked_add(count)
            .filter(|&e| e <= self.limits.max_elements)
            .ok_or(DecodeError::SizeExceeded)?;

        // a count that can't fit the remaining input is reported as such,
        // unless a disallowed tag shows up in the pairs before parsing stops
        let fits = count
            .checked_mul(MIN_PAIR_LEN)
            .is_some_and(|min| min <= self.cursor.remaining());

        self.elements = elements;
        self.depth += 1;

        let mut pairs = Vec::with_capacity(count.min(MAX_PREALLOC));
        for _ in 0..count {
            match self.parse_pair() {
                Ok(pair) => pairs.push(pair),
                Err(err @ DecodeError::DisallowedType) => return Err(err),
                Err(_) if !fits => return Err(DecodeError::InvalidCount),
                Err(err) => return Err(err),
            }
        }

        match self.cursor.next_byte()? {
            b'}' => {},
            _ => return Err(DecodeError::InvalidCount),
        }

        self.depth -= 1;
        Ok(Value::Array(pairs))
    }

    fn parse_pair(&mut self) -> Result<(Key, Value), DecodeError> {
        if self.cursor.peek() == Some(b'}') {
            return Err(DecodeError::InvalidCount);
        }

        let key = self.parse_key()?;
        let value = self.parse_value(Position::Value)?;
        Ok((key, value))
    }

    /// Parses an unsigned decimal length terminated by `end`.
    fn parse_len(&mut self, end: u8) -> Result<usize, DecodeError> {
        let digits = self.cursor.take_while(|b| b.is_ascii_digit());
        if self.cursor.next_byte()? != end || digits.is_empty() {
            return Err(DecodeError::InvalidLength);
        }

        parse_ascii(digits).ok_or(DecodeError::InvalidLength)
    }

    /// Consumes the `;` that ends a numeric token.
    fn end_number(&mut self) -> Result<(), DecodeError> {
        match self.cursor.next_byte()? {
            b';' => Ok(()),
            _ => Err(DecodeError::InvalidNumber),
        }
    }
}

/// Parses ASCII digits and punctuation via [`str::parse`].
fn parse_ascii<T: std::str::FromStr>(bytes: &[u8]) -> Option<T> {
    std::str::from_utf8(bytes).ok()?.parse().ok()
}
