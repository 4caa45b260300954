//! Read-only inspection view over an unparsed ciphertext buffer.

use crate::error::FormatResult;
use crate::header::MessageHeader;

/// A parsed header plus a borrow of the original ciphertext bytes.
///
/// No defensive copy is made: the view borrows the caller's buffer for its
/// lifetime, and the borrow checker enforces that the buffer cannot be
/// mutated while the view is alive. This exists so callers can audit the
/// algorithm suite, key providers, and encryption context of a message
/// before committing to any cryptographic work.
pub struct ParsedCiphertext<'a> {
    ciphertext: &'a [u8],
    header: MessageHeader,
    body_offset: usize,
}

impl<'a> ParsedCiphertext<'a> {
    /// Parses the header of `ciphertext`, bounded by `max_encrypted_data_keys`
    /// ([`crate::NO_MAX_ENCRYPTED_DATA_KEYS`] disables the cap).
    ///
    /// Succeeds only on a complete header; truncated input surfaces as the
    /// distinct [`crate::FormatError::Truncated`].
    pub fn parse(ciphertext: &'a [u8], max_encrypted_data_keys: usize) -> FormatResult<Self> {
        let (header, body_offset) =
            MessageHeader::deserialize(ciphertext, 0, max_encrypted_data_keys)?;
        Ok(Self {
            ciphertext,
            header,
            body_offset,
        })
    }

    pub fn header(&self) -> &MessageHeader {
        &self.header
    }

    /// The raw bytes backing this view: the caller's buffer, not a copy.
    pub fn raw(&self) -> &'a [u8] {
        self.ciphertext
    }

    /// Offset of the first non-header byte.
    pub fn body_offset(&self) -> usize {
        self.body_offset
    }

    /// The encrypted body: everything after the header.
    pub fn body(&self) -> &'a [u8] {
        &self.ciphertext[self.body_offset..]
    }
}
