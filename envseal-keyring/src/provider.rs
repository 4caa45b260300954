//! Master key and master key provider capability traits.
//!
//! A `MasterKey` is one external trust root able to wrap and unwrap data
//! keys. A `MasterKeyProvider` is an identified source of zero or more
//! master keys, and carries the decrypt orchestration: walk the header's
//! EDK records in order, hand each record only to keys whose provider id
//! matches, and stop at the first successful unwrap.

use crate::data_key::DataKey;
use crate::error::{KeyringError, KeyringResult};
use envseal_format::{AlgorithmSuite, EncryptedDataKey, EncryptionContext};
use std::sync::Arc;
use tracing::{debug, trace};

/// One master key: a trust root that can generate, wrap, and unwrap data keys.
pub trait MasterKey: Send + Sync {
    /// Id of the provider that issued this key; EDK records are routed by it.
    fn provider_id(&self) -> &str;

    /// This key's identifier within its provider.
    fn key_id(&self) -> &str;

    /// Generates a fresh raw data key for `suite` and returns it together
    /// with its wrapped form under this key.
    fn generate_data_key(
        &self,
        suite: &'static AlgorithmSuite,
        context: &EncryptionContext,
    ) -> KeyringResult<(DataKey, EncryptedDataKey)>;

    /// Wraps an existing raw data key under this key.
    fn encrypt_data_key(
        &self,
        suite: &'static AlgorithmSuite,
        data_key: &DataKey,
        context: &EncryptionContext,
    ) -> KeyringResult<EncryptedDataKey>;

    /// Unwraps an EDK record. Failure here is expected and non-fatal: the
    /// orchestration advances to the next candidate.
    fn decrypt_data_key(
        &self,
        suite: &'static AlgorithmSuite,
        edk: &EncryptedDataKey,
        context: &EncryptionContext,
    ) -> KeyringResult<DataKey>;
}

/// An identified source of master keys.
pub trait MasterKeyProvider: Send + Sync {
    fn provider_id(&self) -> &str;

    /// Keys that participate in encryption, in order. The first key listed
    /// is the data-key generator; every key (first included) contributes one
    /// EDK record.
    fn keys_for_encrypt(
        &self,
        context: &EncryptionContext,
    ) -> KeyringResult<Vec<Arc<dyn MasterKey>>>;

    /// Keys that may be able to unwrap `edk`: only keys whose provider id
    /// (and key info, where applicable) match the record.
    fn keys_for_decrypt(&self, edk: &EncryptedDataKey) -> KeyringResult<Vec<Arc<dyn MasterKey>>>;

    /// Looks up a specific master key by id.
    fn master_key(&self, key_id: &str) -> KeyringResult<Arc<dyn MasterKey>>;

    /// Unwraps the data key from a header's EDK list.
    ///
    /// Records are attempted in the exact order given (header order); the
    /// first successful unwrap short-circuits the rest. Per-record failures
    /// are non-fatal. Exhausting every record yields
    /// [`KeyringError::NoUsableDataKey`], which enumerates the provider ids
    /// attempted (never wrapped-key bytes) and keeps the last underlying
    /// error as its source.
    fn decrypt_data_key(
        &self,
        suite: &'static AlgorithmSuite,
        edks: &[EncryptedDataKey],
        context: &EncryptionContext,
    ) -> KeyringResult<DataKey> {
        let mut attempted: Vec<String> = Vec::new();
        let mut last_error: Option<Box<KeyringError>> = None;

        for edk in edks {
            let keys = match self.keys_for_decrypt(edk) {
                Ok(keys) => keys,
                Err(err) => {
                    trace!(provider = edk.provider_id(), error = %err, "key resolution failed, skipping record");
                    if !attempted.iter().any(|p| p == edk.provider_id()) {
                        attempted.push(edk.provider_id().to_string());
                    }
                    last_error = Some(Box::new(err));
                    continue;
                }
            };
            if keys.is_empty() {
                trace!(provider = edk.provider_id(), "no held key matches record, skipping");
                continue;
            }
            for key in keys {
                if !attempted.iter().any(|p| p == key.provider_id()) {
                    attempted.push(key.provider_id().to_string());
                }
                match key.decrypt_data_key(suite, edk, context) {
                    Ok(data_key) => {
                        if data_key.len() != suite.data_key_len {
                            last_error = Some(Box::new(KeyringError::WrongDataKeyLength {
                                expected: suite.data_key_len,
                                actual: data_key.len(),
                            }));
                            continue;
                        }
                        debug!(
                            provider = key.provider_id(),
                            key = key.key_id(),
                            "unwrapped data key"
                        );
                        return Ok(data_key);
                    }
                    Err(err) => {
                        debug!(
                            provider = key.provider_id(),
                            key = key.key_id(),
                            error = %err,
                            "unwrap failed, trying next candidate"
                        );
                        last_error = Some(Box::new(err));
                    }
                }
            }
        }

        Err(KeyringError::NoUsableDataKey {
            records: edks.len(),
            attempted,
            source: last_error,
        })
    }
}
