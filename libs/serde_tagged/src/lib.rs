//! # Safe decoding of tagged serialized payloads
//!
//! Decoder and encoder for the scalar and array subset of a textual,
//! type-tagged serialization grammar (the one PHP's `serialize` emits).
//!
//! The full grammar can name classes to instantiate and references to reuse,
//! which makes decoding untrusted input dangerous. This crate only accepts
//! the following tokens:
//!
//! - `N;`: null
//! - `b:0;` and `b:1;`: bool
//! - `i:<int>;`: 64-bit signed integer, optional `-`, decimal digits only
//! - `d:<float>;`: finite 64-bit float in decimal or exponent notation
//! - `s:<len>:"<bytes>";`: byte string, `len` being its exact byte length
//! - `a:<count>:{<key><value>...}`: ordered pairs, keys being `i` or `s`
//!
//! Any other tag fails the whole decode. Object (`O`), custom class (`C`),
//! reference (`R`, `r`), escaped string (`S`) and enum (`E`) tags are
//! reported as [`DecodeError::DisallowedType`] so callers can tell probing
//! apart from plain garbage.
//!
//! Decoding is bounded by [`Limits`]: total input length, array nesting depth
//! and total element count are checked while parsing, before anything is
//! allocated based on a length or count taken from the input.
//!
//! [`encode`] writes values back out. It exists mostly to build fixtures and
//! to check that `decode(encode(v)) == v`.

pub mod de;
pub mod ser;
mod value;

pub use de::{DecodeError, Limits, decode};
pub use ser::{encode, encode_into};
pub use value::{Key, Kind, Value};

#[cfg(test)]
mod tests;
