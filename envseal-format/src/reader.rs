//! Incremental, bounds-checked reads over a borrowed buffer.

use crate::error::{FormatError, FormatResult};

/// Cursor over caller-owned bytes. Every read is bounds-checked; running off
/// the end reports how many more bytes would be required, which is what lets
/// callers distinguish truncated input from corrupt input.
pub(crate) struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes consumed so far.
    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn read_u8(&mut self) -> FormatResult<u8> {
        let bytes = self.read_bytes(1)?;
        Ok(bytes[0])
    }

    pub(crate) fn read_u16(&mut self) -> FormatResult<u16> {
        let bytes = self.read_bytes(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    pub(crate) fn read_u32(&mut self) -> FormatResult<u32> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub(crate) fn read_bytes(&mut self, len: usize) -> FormatResult<&'a [u8]> {
        let remaining = self.buf.len() - self.pos;
        if len > remaining {
            return Err(FormatError::Truncated {
                needed: len - remaining,
            });
        }
        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Reads a u16 length prefix followed by that many bytes.
    pub(crate) fn read_len_prefixed(&mut self) -> FormatResult<&'a [u8]> {
        let len = self.read_u16()? as usize;
        self.read_bytes(len)
    }
}
