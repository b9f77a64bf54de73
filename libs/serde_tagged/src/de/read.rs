use super::DecodeError;

/// Read position over the input of a single decode call.
///
/// The cursor only ever moves forward and never past the end of the input.
#[derive(Debug)]
pub(super) struct Cursor<'a> {
    rest: &'a [u8],
}

impl<'a> Cursor<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self { rest: input }
    }

    /// Number of bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.rest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rest.is_empty()
    }

    pub fn peek(&self) -> Option<u8> {
        self.rest.first().copied()
    }

    /// Reads a single byte.
    pub fn next_byte(&mut self) -> Result<u8, DecodeError> {
        let (&out, rem) = self
            .rest
            .split_first()
            .ok_or(DecodeError::UnexpectedEndOfInput)?;
        self.rest = rem;
        Ok(out)
    }

    /// Reads a single byte and checks that it is `byte`.
    pub fn expect(&mut self, byte: u8) -> Result<(), DecodeError> {
        if self.next_byte()? == byte {
            Ok(())
        } else {
            Err(DecodeError::Expected(char::from(byte)))
        }
    }

    /// Reads exactly `len` bytes.
    pub fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let (out, rem) = self
            .rest
            .split_at_checked(len)
            .ok_or(DecodeError::UnexpectedEndOfInput)?;
        self.rest = rem;
        Ok(out)
    }

    /// Reads the longest prefix whose bytes all match `pred`. May be empty.
    pub fn take_while(&mut self, mut pred: impl FnMut(u8) -> bool) -> &'a [u8] {
        let len = self
            .rest
            .iter()
            .position(|&b| !pred(b))
            .unwrap_or(self.rest.len());

        let (out, rem) = self.rest.split_at(len);
        self.rest = rem;
        out
    }
}
