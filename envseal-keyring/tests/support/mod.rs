//! Shared test doubles: an in-memory key backend that records every call.

use envseal_format::EncryptionContext;
use envseal_keyring::{
    BackendError, ClientSupplier, DecryptDataKeyRequest, EncryptDataKeyRequest,
    GenerateDataKeyRequest, GeneratedDataKey, KeyBackend, KeyringResult,
};
use rand::RngCore;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Api {
    GenerateDataKey,
    EncryptDataKey,
    DecryptDataKey,
}

/// One observed backend call, for passthrough assertions.
#[derive(Debug, Clone)]
pub struct CapturedCall {
    pub api: Api,
    pub key_id: String,
    pub grant_tokens: Vec<String>,
    pub client_identifier: String,
    pub context: EncryptionContext,
}

/// In-memory key backend. Wrapping is an XOR stream under a per-key secret
/// plus an FNV-1a tag over (secret, plaintext), so unwrapping with the wrong
/// key or a tampered ciphertext fails loudly, enough fidelity for
/// orchestration tests without real KMS crypto.
#[derive(Default)]
pub struct MockBackend {
    secrets: Mutex<HashMap<String, [u8; 32]>>,
    failing: Mutex<HashSet<String>>,
    calls: Mutex<Vec<CapturedCall>>,
}

const TAG_LEN: usize = 8;

impl MockBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Registers a key id with a fresh random secret.
    pub fn create_key(&self, key_id: &str) {
        let mut secret = [0u8; 32];
        rand::rng().fill_bytes(&mut secret);
        self.secrets.lock().unwrap().insert(key_id.to_string(), secret);
    }

    /// Makes every call against `key_id` fail as unavailable.
    pub fn fail_key(&self, key_id: &str) {
        self.failing.lock().unwrap().insert(key_id.to_string());
    }

    pub fn calls(&self) -> Vec<CapturedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_of(&self, api: Api) -> Vec<CapturedCall> {
        self.calls().into_iter().filter(|c| c.api == api).collect()
    }

    fn record(&self, api: Api, key_id: &str, tokens: &[String], ident: &str, ctx: &EncryptionContext) {
        self.calls.lock().unwrap().push(CapturedCall {
            api,
            key_id: key_id.to_string(),
            grant_tokens: tokens.to_vec(),
            client_identifier: ident.to_string(),
            context: ctx.clone(),
        });
    }

    fn secret_for(&self, key_id: &str) -> Result<[u8; 32], BackendError> {
        if self.failing.lock().unwrap().contains(key_id) {
            return Err(BackendError::Unavailable(format!("key {key_id} is down")));
        }
        self.secrets
            .lock()
            .unwrap()
            .get(key_id)
            .copied()
            .ok_or_else(|| BackendError::AccessDenied(format!("no such key {key_id}")))
    }

    fn wrap(secret: &[u8; 32], plaintext: &[u8]) -> Vec<u8> {
        let mut out = xor_stream(plaintext, secret);
        out.extend_from_slice(&fnv_tag(secret, plaintext));
        out
    }

    fn unwrap_key(secret: &[u8; 32], key_id: &str, wrapped: &[u8]) -> Result<Vec<u8>, BackendError> {
        if wrapped.len() < TAG_LEN {
            return Err(BackendError::IncorrectKey { key_id: key_id.to_string() });
        }
        let (body, tag) = wrapped.split_at(wrapped.len() - TAG_LEN);
        let plaintext = xor_stream(body, secret);
        if fnv_tag(secret, &plaintext).as_slice() != tag {
            return Err(BackendError::IncorrectKey { key_id: key_id.to_string() });
        }
        Ok(plaintext)
    }
}

fn xor_stream(data: &[u8], secret: &[u8; 32]) -> Vec<u8> {
    data.iter()
        .enumerate()
        .map(|(i, b)| b ^ secret[i % secret.len()])
        .collect()
}

fn fnv_tag(secret: &[u8; 32], plaintext: &[u8]) -> [u8; TAG_LEN] {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in secret.iter().chain(plaintext) {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash.to_be_bytes()
}

impl KeyBackend for MockBackend {
    fn generate_data_key(
        &self,
        request: GenerateDataKeyRequest<'_>,
    ) -> Result<GeneratedDataKey, BackendError> {
        self.record(
            Api::GenerateDataKey,
            request.key_id,
            request.grant_tokens,
            request.client_identifier,
            request.encryption_context,
        );
        let secret = self.secret_for(request.key_id)?;
        let mut plaintext = vec![0u8; request.key_len];
        rand::rng().fill_bytes(&mut plaintext);
        let ciphertext = Self::wrap(&secret, &plaintext);
        Ok(GeneratedDataKey { plaintext, ciphertext })
    }

    fn encrypt_data_key(
        &self,
        request: EncryptDataKeyRequest<'_>,
    ) -> Result<Vec<u8>, BackendError> {
        self.record(
            Api::EncryptDataKey,
            request.key_id,
            request.grant_tokens,
            request.client_identifier,
            request.encryption_context,
        );
        let secret = self.secret_for(request.key_id)?;
        Ok(Self::wrap(&secret, request.plaintext))
    }

    fn decrypt_data_key(
        &self,
        request: DecryptDataKeyRequest<'_>,
    ) -> Result<Vec<u8>, BackendError> {
        self.record(
            Api::DecryptDataKey,
            request.key_id,
            request.grant_tokens,
            request.client_identifier,
            request.encryption_context,
        );
        let secret = self.secret_for(request.key_id)?;
        Self::unwrap_key(&secret, request.key_id, request.ciphertext)
    }
}

/// Client supplier handing out one shared mock backend and recording which
/// regions were requested.
pub struct MockSupplier {
    backend: Arc<MockBackend>,
    regions: Mutex<Vec<String>>,
}

impl MockSupplier {
    pub fn new(backend: Arc<MockBackend>) -> Arc<Self> {
        Arc::new(Self {
            backend,
            regions: Mutex::new(Vec::new()),
        })
    }

    pub fn requested_regions(&self) -> Vec<String> {
        self.regions.lock().unwrap().clone()
    }
}

impl ClientSupplier for MockSupplier {
    fn client_for_region(&self, region: &str) -> KeyringResult<Arc<dyn KeyBackend>> {
        self.regions.lock().unwrap().push(region.to_string());
        Ok(self.backend.clone())
    }
}
