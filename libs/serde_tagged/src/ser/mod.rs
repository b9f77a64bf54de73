//! Exposes the encoder.

use std::io::{self, Write as _};

use crate::value::{Key, Value};

/// Encodes a value into a new buffer.
///
/// Every [`Value`] has an encoding. For every value produced by
/// [`decode`](crate::decode), decoding the output yields an equal value.
///
/// Floats that are not finite are written as `INF`, `-INF`, or `NAN`. The
/// decoder rejects those, so such values do not round-trip.
///
/// # Examples
///
/// ```
/// use serde_tagged::{Key, Value, encode};
///
/// let value = Value::from_iter([(Key::from("qty"), Value::from(3))]);
/// assert_eq!(encode(&value), b"a:1:{s:3:\"qty\";i:3;}");
/// ```
pub fn encode(value: &Value) -> Vec<u8> {
    let mut buf = Vec::new();
    // writing into a vec never fails
    _ = encode_into(&mut buf, value);
    buf
}

/// Encodes a value into a [`io::Write`].
///
/// Tokens are written as they are produced, so the full encoding is never
/// held in memory. Wrap unbuffered writers in an [`io::BufWriter`].
///
/// # Errors
///
/// Returns the first error from the writer. Anything written before it stays
/// written.
pub fn encode_into<W>(writer: W, value: &Value) -> io::Result<()>
where
    W: io::Write,
{
    Encoder { out: writer }.write_value(value)
}

/// Writes tokens to an [`io::Write`].
#[derive(Debug)]
struct Encoder<W> {
    out: W,
}

impl<W: io::Write> Encoder<W> {
    fn raw(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.out.write_all(bytes)
    }

    fn write_value(&mut self, value: &Value) -> io::Result<()> {
        match value {
            Value::Null => self.raw(b"N;"),
            Value::Bool(v) => self.raw(if *v { b"b:1;" } else { b"b:0;" }),
            Value::Int(v) => self.write_int(*v),
            Value::Float(v) => self.write_float(*v),
            Value::String(v) => self.write_string(v),
            Value::Array(pairs) => {
                write!(self.out, "a:{}:{{", pairs.len())?;
                for (key, value) in pairs {
                    self.write_key(key)?;
                    self.write_value(value)?;
                }
                self.raw(b"}")
            },
        }
    }

    fn write_key(&mut self, key: &Key) -> io::Result<()> {
        match key {
            Key::Int(v) => self.write_int(*v),
            Key::String(v) => self.write_string(v),
        }
    }

    fn write_int(&mut self, v: i64) -> io::Result<()> {
        write!(self.out, "i:{v};")
    }

    fn write_float(&mut self, v: f64) -> io::Result<()> {
        if v.is_nan() {
            self.raw(b"d:NAN;")
        } else if v == f64::INFINITY {
            self.raw(b"d:INF;")
        } else if v == f64::NEG_INFINITY {
            self.raw(b"d:-INF;")
        } else {
            // debug formatting is the shortest representation that parses back
            // to the same value and switches to exponents for extreme values
            write!(self.out, "d:{v:?};")
        }
    }

    fn write_string(&mut self, v: &[u8]) -> io::Result<()> {
        write!(self.out, "s:{}:\"", v.len())?;
        self.raw(v)?;
        self.raw(b"\";")
    }
}
