//! Encrypted data key records.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One wrapped copy of the message data key.
///
/// Every record in a header wraps the *same* raw data key; the record is
/// tagged with the provider that produced it and provider-specific key info
/// (typically the key identifier) so decryption can route it to the right
/// master key.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedDataKey {
    provider_id: String,
    provider_info: Vec<u8>,
    ciphertext: Vec<u8>,
}

impl EncryptedDataKey {
    pub fn new(
        provider_id: impl Into<String>,
        provider_info: impl Into<Vec<u8>>,
        ciphertext: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            provider_id: provider_id.into(),
            provider_info: provider_info.into(),
            ciphertext: ciphertext.into(),
        }
    }

    pub fn provider_id(&self) -> &str {
        &self.provider_id
    }

    pub fn provider_info(&self) -> &[u8] {
        &self.provider_info
    }

    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }
}

// Wrapped-key bytes never appear in diagnostics, only their length.
impl fmt::Debug for EncryptedDataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptedDataKey")
            .field("provider_id", &self.provider_id)
            .field("provider_info", &String::from_utf8_lossy(&self.provider_info))
            .field("ciphertext_len", &self.ciphertext.len())
            .finish()
    }
}
