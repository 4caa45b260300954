//! Key-management backend collaborator interface and the provider built on it.
//!
//! The backend (a remote key-management service, an HSM, a local key store)
//! is external to this crate and reached through [`KeyBackend`]. Grant
//! tokens and the client-identification string are passed through unmodified
//! on every call; the orchestration interprets nothing about backend errors
//! beyond "failed, try the next key".

use crate::data_key::DataKey;
use crate::error::{BackendError, KeyringError, KeyringResult};
use crate::provider::{MasterKey, MasterKeyProvider};
use envseal_format::{AlgorithmSuite, EncryptedDataKey, EncryptionContext};
use std::sync::Arc;
use tracing::debug;

/// Provider id stamped on every EDK record produced by backend master keys.
pub const BACKEND_PROVIDER_ID: &str = "kms";

/// Request to generate a fresh data key under a backend key.
pub struct GenerateDataKeyRequest<'a> {
    pub key_id: &'a str,
    pub key_len: usize,
    pub grant_tokens: &'a [String],
    pub encryption_context: &'a EncryptionContext,
    pub client_identifier: &'a str,
}

/// Request to wrap an existing data key under a backend key.
pub struct EncryptDataKeyRequest<'a> {
    pub key_id: &'a str,
    pub plaintext: &'a [u8],
    pub grant_tokens: &'a [String],
    pub encryption_context: &'a EncryptionContext,
    pub client_identifier: &'a str,
}

/// Request to unwrap a wrapped data key.
pub struct DecryptDataKeyRequest<'a> {
    pub key_id: &'a str,
    pub ciphertext: &'a [u8],
    pub grant_tokens: &'a [String],
    pub encryption_context: &'a EncryptionContext,
    pub client_identifier: &'a str,
}

/// A generated data key: plaintext material plus its wrapped form.
pub struct GeneratedDataKey {
    pub plaintext: Vec<u8>,
    pub ciphertext: Vec<u8>,
}

/// The external key-management backend capability.
///
/// Implementations own their transport, retry, and timeout behavior; the
/// core never retries backend calls itself.
pub trait KeyBackend: Send + Sync {
    fn generate_data_key(
        &self,
        request: GenerateDataKeyRequest<'_>,
    ) -> Result<GeneratedDataKey, BackendError>;

    fn encrypt_data_key(&self, request: EncryptDataKeyRequest<'_>)
        -> Result<Vec<u8>, BackendError>;

    fn decrypt_data_key(&self, request: DecryptDataKeyRequest<'_>)
        -> Result<Vec<u8>, BackendError>;
}

/// Regional routing collaborator: yields a backend client for a region.
/// The core treats this as an opaque factory and caches nothing.
pub trait ClientSupplier: Send + Sync {
    fn client_for_region(&self, region: &str) -> KeyringResult<Arc<dyn KeyBackend>>;
}

/// Allow/deny predicate over key ids resolved from ciphertext in discovery
/// mode. Mandatory there: key ids embedded in attacker-controlled ciphertext
/// are never trusted before passing the filter.
pub type KeyIdFilter = Arc<dyn Fn(&str) -> bool + Send + Sync>;

#[derive(Clone)]
enum ResolutionMode {
    /// Fixed key-id list established at construction; these are the encrypt
    /// keys, in order.
    Strict(Vec<String>),
    /// Key ids resolved from EDK key info during decrypt, gated by the filter.
    Discovery(KeyIdFilter),
}

/// Master key provider backed by an external key-management service.
///
/// Immutable after construction. The `with_*` methods are value-style
/// derivations returning a new provider view over the same client supplier;
/// concurrent holders of the original are unaffected.
#[derive(Clone)]
pub struct BackendKeyProvider {
    mode: ResolutionMode,
    clients: Arc<dyn ClientSupplier>,
    default_region: Option<String>,
    grant_tokens: Vec<String>,
    client_identifier: String,
}

impl BackendKeyProvider {
    /// Builds a strict provider over an explicit, non-empty key-id list.
    pub fn strict<I, S>(clients: Arc<dyn ClientSupplier>, key_ids: I) -> KeyringResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let key_ids: Vec<String> = key_ids.into_iter().map(Into::into).collect();
        if key_ids.is_empty() {
            return Err(KeyringError::EmptyStrictKeyIds);
        }
        Ok(Self {
            mode: ResolutionMode::Strict(key_ids),
            clients,
            default_region: None,
            grant_tokens: Vec::new(),
            client_identifier: default_client_identifier(),
        })
    }

    /// Builds a discovery provider. Decrypt-only: key ids are taken from EDK
    /// key info and must pass `filter` before any backend call is made.
    pub fn discovery(clients: Arc<dyn ClientSupplier>, filter: KeyIdFilter) -> Self {
        Self {
            mode: ResolutionMode::Discovery(filter),
            clients,
            default_region: None,
            grant_tokens: Vec::new(),
            client_identifier: default_client_identifier(),
        }
    }

    /// Derives a provider view with a different grant-token list applied to
    /// every subsequent backend call.
    pub fn with_grant_tokens<I, S>(&self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            grant_tokens: tokens.into_iter().map(Into::into).collect(),
            ..self.clone()
        }
    }

    /// Derives a provider view with a fallback region for unqualified key ids.
    pub fn with_default_region(&self, region: impl Into<String>) -> Self {
        Self {
            default_region: Some(region.into()),
            ..self.clone()
        }
    }

    /// Derives a provider view with a different client-identification string.
    pub fn with_client_identifier(&self, identifier: impl Into<String>) -> Self {
        Self {
            client_identifier: identifier.into(),
            ..self.clone()
        }
    }

    pub fn grant_tokens(&self) -> &[String] {
        &self.grant_tokens
    }

    /// Region for a key id: the `region:` prefix when present, otherwise the
    /// configured default region.
    fn region_for(&self, key_id: &str) -> KeyringResult<String> {
        if let Some((region, _)) = key_id.split_once(':') {
            return Ok(region.to_string());
        }
        self.default_region
            .clone()
            .ok_or_else(|| KeyringError::NoRegion {
                key_id: key_id.to_string(),
            })
    }

    fn key(&self, key_id: &str) -> KeyringResult<Arc<dyn MasterKey>> {
        let region = self.region_for(key_id)?;
        let client = self.clients.client_for_region(&region)?;
        Ok(Arc::new(BackendMasterKey {
            key_id: key_id.to_string(),
            client,
            grant_tokens: self.grant_tokens.clone(),
            client_identifier: self.client_identifier.clone(),
        }))
    }
}

impl MasterKeyProvider for BackendKeyProvider {
    fn provider_id(&self) -> &str {
        BACKEND_PROVIDER_ID
    }

    fn keys_for_encrypt(
        &self,
        _context: &EncryptionContext,
    ) -> KeyringResult<Vec<Arc<dyn MasterKey>>> {
        match &self.mode {
            ResolutionMode::Strict(key_ids) => {
                key_ids.iter().map(|id| self.key(id)).collect()
            }
            ResolutionMode::Discovery(_) => Err(KeyringError::EncryptWithDiscovery),
        }
    }

    fn keys_for_decrypt(&self, edk: &EncryptedDataKey) -> KeyringResult<Vec<Arc<dyn MasterKey>>> {
        if edk.provider_id() != BACKEND_PROVIDER_ID {
            return Ok(Vec::new());
        }
        let key_id =
            std::str::from_utf8(edk.provider_info()).map_err(|_| KeyringError::InvalidKeyInfo)?;
        match &self.mode {
            ResolutionMode::Strict(key_ids) => {
                if key_ids.iter().any(|id| id == key_id) {
                    Ok(vec![self.key(key_id)?])
                } else {
                    Ok(Vec::new())
                }
            }
            ResolutionMode::Discovery(filter) => {
                if filter(key_id) {
                    Ok(vec![self.key(key_id)?])
                } else {
                    debug!(key = key_id, "discovery filter rejected key id from ciphertext");
                    Ok(Vec::new())
                }
            }
        }
    }

    fn master_key(&self, key_id: &str) -> KeyringResult<Arc<dyn MasterKey>> {
        match &self.mode {
            ResolutionMode::Strict(key_ids) => {
                if key_ids.iter().any(|id| id == key_id) {
                    self.key(key_id)
                } else {
                    Err(KeyringError::UnknownMasterKey {
                        provider_id: BACKEND_PROVIDER_ID.to_string(),
                        key_id: key_id.to_string(),
                    })
                }
            }
            ResolutionMode::Discovery(filter) => {
                if filter(key_id) {
                    self.key(key_id)
                } else {
                    Err(KeyringError::FilteredKeyId {
                        key_id: key_id.to_string(),
                    })
                }
            }
        }
    }
}

fn default_client_identifier() -> String {
    concat!("envseal/", env!("CARGO_PKG_VERSION")).to_string()
}

/// One backend-held master key, bound to a regional client.
struct BackendMasterKey {
    key_id: String,
    client: Arc<dyn KeyBackend>,
    grant_tokens: Vec<String>,
    client_identifier: String,
}

impl BackendMasterKey {
    fn backend_error(&self, source: BackendError) -> KeyringError {
        KeyringError::Backend {
            key_id: self.key_id.clone(),
            source,
        }
    }
}

impl MasterKey for BackendMasterKey {
    fn provider_id(&self) -> &str {
        BACKEND_PROVIDER_ID
    }

    fn key_id(&self) -> &str {
        &self.key_id
    }

    fn generate_data_key(
        &self,
        suite: &'static AlgorithmSuite,
        context: &EncryptionContext,
    ) -> KeyringResult<(DataKey, EncryptedDataKey)> {
        let generated = self
            .client
            .generate_data_key(GenerateDataKeyRequest {
                key_id: &self.key_id,
                key_len: suite.data_key_len,
                grant_tokens: &self.grant_tokens,
                encryption_context: context,
                client_identifier: &self.client_identifier,
            })
            .map_err(|e| self.backend_error(e))?;
        if generated.plaintext.len() != suite.data_key_len {
            return Err(KeyringError::WrongDataKeyLength {
                expected: suite.data_key_len,
                actual: generated.plaintext.len(),
            });
        }
        let edk = EncryptedDataKey::new(
            BACKEND_PROVIDER_ID,
            self.key_id.as_bytes().to_vec(),
            generated.ciphertext,
        );
        Ok((DataKey::new(generated.plaintext), edk))
    }

    fn encrypt_data_key(
        &self,
        _suite: &'static AlgorithmSuite,
        data_key: &DataKey,
        context: &EncryptionContext,
    ) -> KeyringResult<EncryptedDataKey> {
        let ciphertext = self
            .client
            .encrypt_data_key(EncryptDataKeyRequest {
                key_id: &self.key_id,
                plaintext: data_key.as_bytes(),
                grant_tokens: &self.grant_tokens,
                encryption_context: context,
                client_identifier: &self.client_identifier,
            })
            .map_err(|e| self.backend_error(e))?;
        Ok(EncryptedDataKey::new(
            BACKEND_PROVIDER_ID,
            self.key_id.as_bytes().to_vec(),
            ciphertext,
        ))
    }

    fn decrypt_data_key(
        &self,
        _suite: &'static AlgorithmSuite,
        edk: &EncryptedDataKey,
        context: &EncryptionContext,
    ) -> KeyringResult<DataKey> {
        let plaintext = self
            .client
            .decrypt_data_key(DecryptDataKeyRequest {
                key_id: &self.key_id,
                ciphertext: edk.ciphertext(),
                grant_tokens: &self.grant_tokens,
                encryption_context: context,
                client_identifier: &self.client_identifier,
            })
            .map_err(|e| self.backend_error(e))?;
        Ok(DataKey::new(plaintext))
    }
}
