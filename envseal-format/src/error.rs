//! Message format error types.

use thiserror::Error;

/// Result type for format operations.
pub type FormatResult<T> = Result<T, FormatError>;

/// Errors produced by the header codec.
///
/// Truncation and the encrypted-data-key limit are deliberately distinct from
/// generic malformed input: callers buffering a stream need to tell "not
/// enough bytes yet" from "corrupt", and callers tuning resource limits need
/// to tell "over the cap" from "garbage".
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("ciphertext truncated: {needed} more bytes required")]
    Truncated { needed: usize },

    #[error("unsupported message format version {0}")]
    UnsupportedVersion(u8),

    #[error("unknown algorithm suite id {0:#06x}")]
    UnknownSuite(u16),

    #[error("unknown content type {0}")]
    UnknownContentType(u8),

    #[error("malformed header: {0}")]
    Malformed(&'static str),

    #[error("header field {field} is {len} bytes, exceeding the u16 length prefix")]
    FieldTooLong { field: &'static str, len: usize },

    #[error("header claims {count} encrypted data keys, limit is {max}")]
    TooManyDataKeys { count: usize, max: usize },
}
