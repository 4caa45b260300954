//! Engine error types.

use envseal_format::{FormatError, PolicyViolation};
use envseal_keyring::KeyringError;
use thiserror::Error;

/// Result type for engine operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors surfaced by [`crate::EnvelopeClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Keyring(#[from] KeyringError),

    #[error(transparent)]
    Policy(#[from] PolicyViolation),

    #[error("provider supplied no encryption keys")]
    NoEncryptKeys,

    /// AEAD sealing failed. The underlying cipher reports no detail.
    #[error("body encryption failed")]
    Seal,

    /// AEAD opening failed: tampered body, altered header, or wrong data key.
    #[error("body authentication failed")]
    Open,

    /// The commitment value in the body was not produced by the unwrapped
    /// data key. Checked before any AEAD work on committing suites.
    #[error("key commitment does not match the unwrapped data key")]
    CommitmentMismatch,

    #[error("framed content is not supported")]
    UnsupportedContent,
}
