//! Keyring error types.

use thiserror::Error;

/// Result type for keyring operations.
pub type KeyringResult<T> = Result<T, KeyringError>;

/// Errors surfaced by the external key-management backend collaborator.
///
/// The orchestration layer never interprets these beyond "failed, try the
/// next key"; once every candidate is exhausted the last backend error is
/// preserved as the source of [`KeyringError::NoUsableDataKey`].
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("key backend unavailable: {0}")]
    Unavailable(String),

    #[error("access denied by key backend: {0}")]
    AccessDenied(String),

    #[error("backend could not decrypt with key {key_id}")]
    IncorrectKey { key_id: String },
}

/// Errors from master key providers and their orchestration.
#[derive(Debug, Error)]
pub enum KeyringError {
    #[error("strict mode requires at least one key id")]
    EmptyStrictKeyIds,

    #[error("multi-provider requires at least one member")]
    EmptyMultiProvider,

    #[error("discovery-mode providers cannot encrypt")]
    EncryptWithDiscovery,

    #[error("master key {key_id} is not available from provider {provider_id}")]
    UnknownMasterKey {
        provider_id: String,
        key_id: String,
    },

    #[error("key id {key_id} rejected by discovery filter")]
    FilteredKeyId { key_id: String },

    #[error("no region in key id {key_id} and no default region configured")]
    NoRegion { key_id: String },

    #[error("encrypted data key carries non-UTF-8 key info")]
    InvalidKeyInfo,

    #[error("unwrapped data key is {actual} bytes, suite requires {expected}")]
    WrongDataKeyLength { expected: usize, actual: usize },

    #[error(
        "no encrypted data key could be unwrapped: {records} records, providers attempted: [{}]",
        .attempted.join(", ")
    )]
    NoUsableDataKey {
        records: usize,
        attempted: Vec<String>,
        #[source]
        source: Option<Box<KeyringError>>,
    },

    #[error("key backend call failed for key {key_id}")]
    Backend {
        key_id: String,
        #[source]
        source: BackendError,
    },
}
