//! Ciphertext message format for envseal.
//!
//! A message is a self-describing header followed by the encrypted body. The
//! header carries the algorithm suite id, a random message id, the
//! authenticated encryption context, and an ordered list of independently
//! wrapped copies of the single data key (EDK records). This crate owns the
//! structural layer only:
//!
//! - the [`AlgorithmSuite`] registry and [`CommitmentPolicy`] gating
//! - the [`MessageHeader`] binary codec (serialize / deserialize)
//! - the borrowed [`ParsedCiphertext`] inspection view
//!
//! No cryptography happens here; wrapping, unwrapping, and body sealing live
//! in `envseal-keyring` and `envseal-client`.

mod context;
mod edk;
mod error;
mod header;
mod parsed;
mod policy;
mod reader;
mod suite;

pub use context::EncryptionContext;
pub use edk::EncryptedDataKey;
pub use error::{FormatError, FormatResult};
pub use header::{
    ContentType, MessageHeader, FORMAT_VERSION_1, MESSAGE_ID_LEN, NO_MAX_ENCRYPTED_DATA_KEYS,
};
pub use parsed::ParsedCiphertext;
pub use policy::{CommitmentPolicy, Operation, PolicyViolation};
pub use suite::{
    AlgorithmSuite, CipherKind, CHACHA20_POLY1305, CHACHA20_POLY1305_HKDF_SHA256_COMMITTING,
    XCHACHA20_POLY1305, XCHACHA20_POLY1305_HKDF_SHA256_COMMITTING,
};
