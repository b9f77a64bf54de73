/// Potential errors to encounter when decoding a payload.
///
/// Every variant is terminal for the decode call that returned it. No
/// partially decoded value is ever returned alongside an error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum DecodeError {
    /// The input ended in the middle of a token.
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,
    /// A type tag was not part of the grammar, or a fixed literal such as a
    /// bool held something other than `0` or `1`.
    #[error("invalid type tag")]
    InvalidTag,
    /// A length or count prefix was empty, not all digits, or too large for
    /// the remaining input.
    #[error("malformed or unsatisfiable length prefix")]
    InvalidLength,
    /// A string's content did not end exactly where its length prefix said it
    /// would.
    #[error("string length prefix does not match its content")]
    LengthMismatch,
    /// An array held more or fewer pairs than its count prefix, or the count
    /// cannot fit in the remaining input.
    #[error("array element count does not match its content")]
    InvalidCount,
    /// An object, class, or reference tag was found.
    ///
    /// These are valid in the full grammar but are never accepted here.
    #[error("disallowed type tag")]
    DisallowedType,
    /// A complete top-level value was decoded but input bytes remain.
    #[error("trailing bytes after the top-level value")]
    TrailingData,
    /// Arrays were nested deeper than [`Limits::max_depth`](super::Limits).
    #[error("array nesting exceeds the depth limit")]
    DepthExceeded,
    /// The input or the total element count exceeded its limit.
    #[error("input exceeds a size limit")]
    SizeExceeded,
    /// An array key was something other than an integer or a string.
    #[error("array key must be an integer or a string")]
    InvalidKeyType,
    /// An `i` or `d` value was malformed, out of range, or not finite.
    #[error("malformed numeric literal")]
    InvalidNumber,
    /// A structural character was missing.
    #[error("expected `{0}`")]
    Expected(char),
}

impl DecodeError {
    /// A stable, machine-friendly label for the error.
    ///
    /// Suitable for logs and metrics where the display message is too loose.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::UnexpectedEndOfInput => "unexpected_end_of_input",
            Self::InvalidTag => "invalid_tag",
            Self::InvalidLength => "invalid_length",
            Self::LengthMismatch => "length_mismatch",
            Self::InvalidCount => "invalid_count",
            Self::DisallowedType => "disallowed_type",
            Self::TrailingData => "trailing_data",
            Self::DepthExceeded => "depth_exceeded",
            Self::SizeExceeded => "size_exceeded",
            Self::InvalidKeyType => "invalid_key_type",
            Self::InvalidNumber => "invalid_number",
            Self::Expected(_) => "syntax",
        }
    }
}
