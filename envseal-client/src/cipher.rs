//! Body sealing and opening.
//!
//! The body cipher is the seam between the structural header and the AEAD
//! primitives. Non-committing suites seal directly under the raw data key;
//! committing suites first derive an encryption key and a commitment value
//! from the data key via HKDF-SHA256 (salted by the message id), and prepend
//! the commitment to the body so a mismatched data key fails before any AEAD
//! work. The serialized header bytes are the associated data in both cases,
//! so any header alteration breaks authentication.
//!
//! Body layouts:
//! - non-committing: `IV ‖ AEAD ciphertext`
//! - committing: `commitment(32) ‖ IV ‖ AEAD ciphertext`

use crate::error::{ClientError, ClientResult};
use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{ChaCha20Poly1305, Nonce, XChaCha20Poly1305, XNonce};
use envseal_format::{AlgorithmSuite, CipherKind, MESSAGE_ID_LEN};
use envseal_keyring::DataKey;
use hkdf::Hkdf;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroizing;

/// Commitment value length for committing suites, in bytes.
pub const COMMITMENT_LEN: usize = 32;

const KEY_INFO: &[u8] = b"envseal data-encryption key";
const COMMIT_INFO: &[u8] = b"envseal key commitment";

/// Seals `plaintext` into a body, authenticating `header_bytes`.
pub(crate) fn seal(
    suite: &'static AlgorithmSuite,
    data_key: &DataKey,
    message_id: &[u8; MESSAGE_ID_LEN],
    header_bytes: &[u8],
    plaintext: &[u8],
) -> ClientResult<Vec<u8>> {
    let mut iv = vec![0u8; suite.iv_len];
    rand::rng().fill_bytes(&mut iv);

    let mut body = Vec::with_capacity(
        commitment_len(suite) + suite.iv_len + plaintext.len() + suite.tag_len,
    );
    let ciphertext = if suite.requires_commitment {
        let (key, commitment) =
            derive_committed(data_key.as_bytes(), message_id).map_err(|_| ClientError::Seal)?;
        body.extend_from_slice(&commitment);
        aead_encrypt(suite, key.as_slice(), &iv, header_bytes, plaintext)?
    } else {
        aead_encrypt(suite, data_key.as_bytes(), &iv, header_bytes, plaintext)?
    };
    body.extend_from_slice(&iv);
    body.extend_from_slice(&ciphertext);
    Ok(body)
}

/// Opens a body sealed by [`seal`], verifying `header_bytes` as associated
/// data. On committing suites the commitment is recomputed and compared
/// before any AEAD call.
pub(crate) fn open(
    suite: &'static AlgorithmSuite,
    data_key: &DataKey,
    message_id: &[u8; MESSAGE_ID_LEN],
    header_bytes: &[u8],
    body: &[u8],
) -> ClientResult<Vec<u8>> {
    if body.len() < commitment_len(suite) + suite.iv_len + suite.tag_len {
        return Err(ClientError::Open);
    }
    let (commitment, rest) = body.split_at(commitment_len(suite));
    let (iv, ciphertext) = rest.split_at(suite.iv_len);

    if suite.requires_commitment {
        let (key, expected) =
            derive_committed(data_key.as_bytes(), message_id).map_err(|_| ClientError::Open)?;
        if expected != commitment {
            return Err(ClientError::CommitmentMismatch);
        }
        aead_decrypt(suite, key.as_slice(), iv, header_bytes, ciphertext)
    } else {
        aead_decrypt(suite, data_key.as_bytes(), iv, header_bytes, ciphertext)
    }
}

fn commitment_len(suite: &AlgorithmSuite) -> usize {
    if suite.requires_commitment {
        COMMITMENT_LEN
    } else {
        0
    }
}

/// Derives the body encryption key and the commitment value from a raw data
/// key. Both come from one HKDF instance salted by the message id, under
/// distinct info strings, so neither reveals the other or the raw key.
fn derive_committed(
    data_key: &[u8],
    message_id: &[u8; MESSAGE_ID_LEN],
) -> Result<(Zeroizing<[u8; 32]>, [u8; COMMITMENT_LEN]), hkdf::InvalidLength> {
    let hk = Hkdf::<Sha256>::new(Some(message_id), data_key);
    let mut key = Zeroizing::new([0u8; 32]);
    hk.expand(KEY_INFO, key.as_mut())?;
    let mut commitment = [0u8; COMMITMENT_LEN];
    hk.expand(COMMIT_INFO, &mut commitment)?;
    Ok((key, commitment))
}

fn aead_encrypt(
    suite: &'static AlgorithmSuite,
    key: &[u8],
    iv: &[u8],
    aad: &[u8],
    plaintext: &[u8],
) -> ClientResult<Vec<u8>> {
    let payload = Payload { msg: plaintext, aad };
    match suite.cipher {
        CipherKind::ChaCha20Poly1305 => ChaCha20Poly1305::new_from_slice(key)
            .map_err(|_| ClientError::Seal)?
            .encrypt(Nonce::from_slice(iv), payload)
            .map_err(|_| ClientError::Seal),
        CipherKind::XChaCha20Poly1305 => XChaCha20Poly1305::new_from_slice(key)
            .map_err(|_| ClientError::Seal)?
            .encrypt(XNonce::from_slice(iv), payload)
            .map_err(|_| ClientError::Seal),
    }
}

fn aead_decrypt(
    suite: &'static AlgorithmSuite,
    key: &[u8],
    iv: &[u8],
    aad: &[u8],
    ciphertext: &[u8],
) -> ClientResult<Vec<u8>> {
    let payload = Payload {
        msg: ciphertext,
        aad,
    };
    match suite.cipher {
        CipherKind::ChaCha20Poly1305 => ChaCha20Poly1305::new_from_slice(key)
            .map_err(|_| ClientError::Open)?
            .decrypt(Nonce::from_slice(iv), payload)
            .map_err(|_| ClientError::Open),
        CipherKind::XChaCha20Poly1305 => XChaCha20Poly1305::new_from_slice(key)
            .map_err(|_| ClientError::Open)?
            .decrypt(XNonce::from_slice(iv), payload)
            .map_err(|_| ClientError::Open),
    }
}
