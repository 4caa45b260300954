//! Ordered composition of several master key providers.

use crate::error::{KeyringError, KeyringResult};
use crate::provider::{MasterKey, MasterKeyProvider};
use envseal_format::{EncryptedDataKey, EncryptionContext};
use std::sync::Arc;
use tracing::debug;

/// An ordered, immutable sequence of master key providers.
///
/// The first key of the first member is the exclusive data-key generator on
/// encrypt; every key across every member wraps the same raw key, so one
/// ciphertext stays decryptable by each independent trust domain. On
/// decrypt, all members participate, in construction order.
///
/// The composition is never mutated after construction and is safe to share
/// across threads.
pub struct MultiProvider {
    members: Vec<Arc<dyn MasterKeyProvider>>,
}

impl MultiProvider {
    pub fn new(members: Vec<Arc<dyn MasterKeyProvider>>) -> KeyringResult<Self> {
        if members.is_empty() {
            return Err(KeyringError::EmptyMultiProvider);
        }
        Ok(Self { members })
    }

    /// The member designated as data-key generator.
    pub fn primary(&self) -> &Arc<dyn MasterKeyProvider> {
        &self.members[0]
    }

    pub fn members(&self) -> &[Arc<dyn MasterKeyProvider>] {
        &self.members
    }
}

impl MasterKeyProvider for MultiProvider {
    fn provider_id(&self) -> &str {
        "multi"
    }

    fn keys_for_encrypt(
        &self,
        context: &EncryptionContext,
    ) -> KeyringResult<Vec<Arc<dyn MasterKey>>> {
        let mut keys = Vec::new();
        for member in &self.members {
            keys.extend(member.keys_for_encrypt(context)?);
        }
        Ok(keys)
    }

    fn keys_for_decrypt(&self, edk: &EncryptedDataKey) -> KeyringResult<Vec<Arc<dyn MasterKey>>> {
        let mut keys = Vec::new();
        for member in &self.members {
            match member.keys_for_decrypt(edk) {
                Ok(matched) => keys.extend(matched),
                // One member failing to resolve must not keep the record
                // from reaching the remaining members.
                Err(err) => {
                    debug!(
                        member = member.provider_id(),
                        error = %err,
                        "member key resolution failed, skipping member"
                    );
                }
            }
        }
        Ok(keys)
    }

    fn master_key(&self, key_id: &str) -> KeyringResult<Arc<dyn MasterKey>> {
        for member in &self.members {
            if let Ok(key) = member.master_key(key_id) {
                return Ok(key);
            }
        }
        Err(KeyringError::UnknownMasterKey {
            provider_id: self.provider_id().to_string(),
            key_id: key_id.to_string(),
        })
    }
}
