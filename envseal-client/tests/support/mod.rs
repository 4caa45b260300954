//! Shared test doubles: in-memory master keys with deterministic wrapping.

use envseal_format::{AlgorithmSuite, EncryptedDataKey, EncryptionContext};
use envseal_keyring::{
    BackendError, DataKey, KeyringError, KeyringResult, MasterKey, MasterKeyProvider,
};
use rand::RngCore;
use std::sync::Arc;

/// One in-memory master key. Wrapping is an XOR against a fixed secret, so
/// a key holding a different secret under the same key id silently yields
/// wrong data-key bytes, which is exactly what key-substitution tests need.
pub struct StaticKey {
    provider: String,
    key_id: String,
    secret: [u8; 32],
    fixed_material: Option<[u8; 32]>,
    wrap_fails: bool,
}

impl StaticKey {
    pub fn new(provider: &str, key_id: &str, secret: [u8; 32]) -> Arc<Self> {
        Arc::new(Self {
            provider: provider.to_string(),
            key_id: key_id.to_string(),
            secret,
            fixed_material: None,
            wrap_fails: false,
        })
    }

    /// Key whose wrap operation always fails, for whole-call-abort tests.
    pub fn failing_wrap(provider: &str, key_id: &str) -> Arc<Self> {
        Arc::new(Self {
            provider: provider.to_string(),
            key_id: key_id.to_string(),
            secret: [0u8; 32],
            fixed_material: None,
            wrap_fails: true,
        })
    }

    /// Key that always generates the same data-key material, for
    /// header-determinism assertions.
    pub fn with_fixed_material(
        provider: &str,
        key_id: &str,
        secret: [u8; 32],
        material: [u8; 32],
    ) -> Arc<Self> {
        Arc::new(Self {
            provider: provider.to_string(),
            key_id: key_id.to_string(),
            secret,
            fixed_material: Some(material),
            wrap_fails: false,
        })
    }

    pub fn random(provider: &str, key_id: &str) -> Arc<Self> {
        let mut secret = [0u8; 32];
        rand::rng().fill_bytes(&mut secret);
        Self::new(provider, key_id, secret)
    }

    fn xor(&self, data: &[u8]) -> Vec<u8> {
        data.iter()
            .zip(self.secret.iter().cycle())
            .map(|(b, s)| b ^ s)
            .collect()
    }
}

impl MasterKey for StaticKey {
    fn provider_id(&self) -> &str {
        &self.provider
    }

    fn key_id(&self) -> &str {
        &self.key_id
    }

    fn generate_data_key(
        &self,
        suite: &'static AlgorithmSuite,
        context: &EncryptionContext,
    ) -> KeyringResult<(DataKey, EncryptedDataKey)> {
        let material = match self.fixed_material {
            Some(fixed) => fixed.to_vec(),
            None => {
                let mut material = vec![0u8; suite.data_key_len];
                rand::rng().fill_bytes(&mut material);
                material
            }
        };
        let data_key = DataKey::new(material);
        let edk = self.encrypt_data_key(suite, &data_key, context)?;
        Ok((data_key, edk))
    }

    fn encrypt_data_key(
        &self,
        _suite: &'static AlgorithmSuite,
        data_key: &DataKey,
        _context: &EncryptionContext,
    ) -> KeyringResult<EncryptedDataKey> {
        if self.wrap_fails {
            return Err(KeyringError::Backend {
                key_id: self.key_id.clone(),
                source: BackendError::Unavailable(format!("key {} is down", self.key_id)),
            });
        }
        Ok(EncryptedDataKey::new(
            &self.provider,
            self.key_id.as_bytes().to_vec(),
            self.xor(data_key.as_bytes()),
        ))
    }

    fn decrypt_data_key(
        &self,
        _suite: &'static AlgorithmSuite,
        edk: &EncryptedDataKey,
        _context: &EncryptionContext,
    ) -> KeyringResult<DataKey> {
        Ok(DataKey::new(self.xor(edk.ciphertext())))
    }
}

/// Provider over a fixed key set; no remote backend involved.
pub struct StaticProvider {
    id: String,
    keys: Vec<Arc<StaticKey>>,
}

impl StaticProvider {
    pub fn new(id: &str, keys: Vec<Arc<StaticKey>>) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            keys,
        })
    }

    /// Provider with a single randomly-secreted key.
    pub fn single(id: &str, key_id: &str) -> Arc<Self> {
        Self::new(id, vec![StaticKey::random(id, key_id)])
    }
}

impl MasterKeyProvider for StaticProvider {
    fn provider_id(&self) -> &str {
        &self.id
    }

    fn keys_for_encrypt(
        &self,
        _context: &EncryptionContext,
    ) -> KeyringResult<Vec<Arc<dyn MasterKey>>> {
        Ok(self
            .keys
            .iter()
            .map(|k| k.clone() as Arc<dyn MasterKey>)
            .collect())
    }

    fn keys_for_decrypt(&self, edk: &EncryptedDataKey) -> KeyringResult<Vec<Arc<dyn MasterKey>>> {
        Ok(self
            .keys
            .iter()
            .filter(|k| edk.provider_id() == k.provider && edk.provider_info() == k.key_id.as_bytes())
            .map(|k| k.clone() as Arc<dyn MasterKey>)
            .collect())
    }

    fn master_key(&self, key_id: &str) -> KeyringResult<Arc<dyn MasterKey>> {
        self.keys
            .iter()
            .find(|k| k.key_id == key_id)
            .map(|k| k.clone() as Arc<dyn MasterKey>)
            .ok_or_else(|| envseal_keyring::KeyringError::UnknownMasterKey {
                provider_id: self.id.clone(),
                key_id: key_id.to_string(),
            })
    }
}

/// Provider that claims no keys at all, for empty-key-list paths.
pub struct EmptyProvider;

impl MasterKeyProvider for EmptyProvider {
    fn provider_id(&self) -> &str {
        "empty"
    }

    fn keys_for_encrypt(
        &self,
        _context: &EncryptionContext,
    ) -> KeyringResult<Vec<Arc<dyn MasterKey>>> {
        Ok(Vec::new())
    }

    fn keys_for_decrypt(&self, _edk: &EncryptedDataKey) -> KeyringResult<Vec<Arc<dyn MasterKey>>> {
        Ok(Vec::new())
    }

    fn master_key(&self, key_id: &str) -> KeyringResult<Arc<dyn MasterKey>> {
        Err(envseal_keyring::KeyringError::UnknownMasterKey {
            provider_id: "empty".to_string(),
            key_id: key_id.to_string(),
        })
    }
}
