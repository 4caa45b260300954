//! The encryption/decryption engine.

use crate::cipher;
use crate::error::{ClientError, ClientResult};
use envseal_format::{
    AlgorithmSuite, CommitmentPolicy, ContentType, EncryptionContext, FormatError, MessageHeader,
    ParsedCiphertext, CHACHA20_POLY1305, CHACHA20_POLY1305_HKDF_SHA256_COMMITTING, MESSAGE_ID_LEN,
    NO_MAX_ENCRYPTED_DATA_KEYS,
};
use envseal_keyring::MasterKeyProvider;
use tracing::debug;
use uuid::Uuid;

/// A decrypted message: plaintext plus its authenticated metadata.
#[derive(Debug)]
pub struct DecryptOutput {
    pub plaintext: Vec<u8>,
    pub encryption_context: EncryptionContext,
    pub suite: &'static AlgorithmSuite,
}

/// Envelope encryption engine.
///
/// Holds no per-message state; one client value can serve concurrent
/// callers. Configuration is immutable, and the `with_*` methods derive new
/// values rather than mutating.
#[derive(Debug, Clone, Copy)]
pub struct EnvelopeClient {
    commitment_policy: CommitmentPolicy,
    max_encrypted_data_keys: usize,
}

impl Default for EnvelopeClient {
    fn default() -> Self {
        Self::new(CommitmentPolicy::default())
    }
}

impl EnvelopeClient {
    pub fn new(commitment_policy: CommitmentPolicy) -> Self {
        Self {
            commitment_policy,
            max_encrypted_data_keys: NO_MAX_ENCRYPTED_DATA_KEYS,
        }
    }

    /// Derives a client capping the EDK records accepted per message
    /// ([`NO_MAX_ENCRYPTED_DATA_KEYS`] disables the cap). Enforced on both
    /// the encrypt key count and, before record parsing, on decrypt.
    pub fn with_max_encrypted_data_keys(self, max: usize) -> Self {
        Self {
            max_encrypted_data_keys: max,
            ..self
        }
    }

    pub fn commitment_policy(&self) -> CommitmentPolicy {
        self.commitment_policy
    }

    pub fn max_encrypted_data_keys(&self) -> usize {
        self.max_encrypted_data_keys
    }

    /// Suite used when the caller does not pick one: committing unless the
    /// policy forbids commitment.
    fn default_suite(&self) -> &'static AlgorithmSuite {
        match self.commitment_policy {
            CommitmentPolicy::Forbid => &CHACHA20_POLY1305,
            CommitmentPolicy::Allow | CommitmentPolicy::Require => {
                &CHACHA20_POLY1305_HKDF_SHA256_COMMITTING
            }
        }
    }

    /// Encrypts `plaintext` under the default suite for this client's policy.
    pub fn encrypt(
        &self,
        provider: &dyn MasterKeyProvider,
        plaintext: &[u8],
        context: EncryptionContext,
    ) -> ClientResult<Vec<u8>> {
        self.encrypt_with_suite(provider, self.default_suite(), plaintext, context)
    }

    pub fn encrypt_with_suite(
        &self,
        provider: &dyn MasterKeyProvider,
        suite: &'static AlgorithmSuite,
        plaintext: &[u8],
        context: EncryptionContext,
    ) -> ClientResult<Vec<u8>> {
        self.encrypt_with_message_id(provider, suite, random_message_id(), plaintext, context)
    }

    /// Full-control variant for callers that manage their own message ids.
    /// Identical (suite, message id, context, key list) inputs always yield
    /// byte-identical headers.
    pub fn encrypt_with_message_id(
        &self,
        provider: &dyn MasterKeyProvider,
        suite: &'static AlgorithmSuite,
        message_id: [u8; MESSAGE_ID_LEN],
        plaintext: &[u8],
        context: EncryptionContext,
    ) -> ClientResult<Vec<u8>> {
        self.commitment_policy.validate_for_encrypt(suite)?;

        let keys = provider.keys_for_encrypt(&context)?;
        if keys.is_empty() {
            return Err(ClientError::NoEncryptKeys);
        }
        if self.max_encrypted_data_keys != NO_MAX_ENCRYPTED_DATA_KEYS
            && keys.len() > self.max_encrypted_data_keys
        {
            return Err(FormatError::TooManyDataKeys {
                count: keys.len(),
                max: self.max_encrypted_data_keys,
            }
            .into());
        }

        // The first key generates; every other key wraps the same raw key.
        // Any wrap failure fails the whole call, so a partial EDK list is
        // never emitted.
        let (data_key, first_edk) = keys[0].generate_data_key(suite, &context)?;
        let mut edks = Vec::with_capacity(keys.len());
        edks.push(first_edk);
        for key in &keys[1..] {
            edks.push(key.encrypt_data_key(suite, &data_key, &context)?);
        }
        let key_count = edks.len();

        let header = MessageHeader::for_suite(suite, message_id, context, edks);
        let header_bytes = header.serialize()?;
        let body = cipher::seal(suite, &data_key, &message_id, &header_bytes, plaintext)?;

        debug!(
            suite = %suite,
            message = %header.message_id_hex(),
            keys = key_count,
            "sealed message"
        );

        let mut out = header_bytes;
        out.extend_from_slice(&body);
        Ok(out)
    }

    /// Decrypts a message produced by [`EnvelopeClient::encrypt`].
    ///
    /// Fatal conditions abort with nothing partial returned: a truncated or
    /// malformed header never reaches the provider, a policy-rejected suite
    /// never reaches the body cipher, and a failed body authentication never
    /// yields plaintext.
    pub fn decrypt(
        &self,
        provider: &dyn MasterKeyProvider,
        ciphertext: &[u8],
    ) -> ClientResult<DecryptOutput> {
        let parsed = ParsedCiphertext::parse(ciphertext, self.max_encrypted_data_keys)?;
        let header = parsed.header();
        self.commitment_policy.validate_for_decrypt(header.suite)?;
        if header.content_type == ContentType::Framed {
            return Err(ClientError::UnsupportedContent);
        }

        let data_key = provider.decrypt_data_key(
            header.suite,
            &header.encrypted_data_keys,
            &header.encryption_context,
        )?;

        let header_bytes = &ciphertext[..parsed.body_offset()];
        let plaintext = cipher::open(
            header.suite,
            &data_key,
            &header.message_id,
            header_bytes,
            parsed.body(),
        )?;

        debug!(
            suite = %header.suite,
            message = %header.message_id_hex(),
            "opened message"
        );

        Ok(DecryptOutput {
            plaintext,
            encryption_context: header.encryption_context.clone(),
            suite: header.suite,
        })
    }
}

fn random_message_id() -> [u8; MESSAGE_ID_LEN] {
    Uuid::new_v4().into_bytes()
}
