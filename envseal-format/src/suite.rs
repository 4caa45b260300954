//! Algorithm suite registry.
//!
//! Every ciphertext names its suite by a fixed-width id in the header. The
//! registry is a static table; a serialized id that does not resolve here is
//! a hard parse failure, never a best-effort guess.

use crate::header::ContentType;
use std::fmt;

/// AEAD cipher backing an algorithm suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CipherKind {
    ChaCha20Poly1305,
    XChaCha20Poly1305,
}

/// Immutable parameters of one algorithm suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlgorithmSuite {
    pub id: u16,
    pub name: &'static str,
    pub cipher: CipherKind,
    /// Raw data key length in bytes.
    pub data_key_len: usize,
    /// AEAD nonce length in bytes, also written to the header IV-length field.
    pub iv_len: usize,
    /// AEAD authentication tag length in bytes.
    pub tag_len: usize,
    /// Whether messages under this suite carry a key-commitment value.
    pub requires_commitment: bool,
    /// Reserved for trailer-signature suites; no registered suite sets it.
    pub requires_signature: bool,
    /// Body layout written by [`crate::MessageHeader::for_suite`].
    pub default_content_type: ContentType,
}

/// ChaCha20-Poly1305, no key commitment.
pub const CHACHA20_POLY1305: AlgorithmSuite = AlgorithmSuite {
    id: 0x0014,
    name: "ChaCha20-Poly1305",
    cipher: CipherKind::ChaCha20Poly1305,
    data_key_len: 32,
    iv_len: 12,
    tag_len: 16,
    requires_commitment: false,
    requires_signature: false,
    default_content_type: ContentType::NonFramed,
};

/// XChaCha20-Poly1305, no key commitment.
pub const XCHACHA20_POLY1305: AlgorithmSuite = AlgorithmSuite {
    id: 0x0046,
    name: "XChaCha20-Poly1305",
    cipher: CipherKind::XChaCha20Poly1305,
    data_key_len: 32,
    iv_len: 24,
    tag_len: 16,
    requires_commitment: false,
    requires_signature: false,
    default_content_type: ContentType::NonFramed,
};

/// ChaCha20-Poly1305 with an HKDF-SHA256 key commitment.
pub const CHACHA20_POLY1305_HKDF_SHA256_COMMITTING: AlgorithmSuite = AlgorithmSuite {
    id: 0x0114,
    name: "ChaCha20-Poly1305 HKDF-SHA256 committing",
    cipher: CipherKind::ChaCha20Poly1305,
    data_key_len: 32,
    iv_len: 12,
    tag_len: 16,
    requires_commitment: true,
    requires_signature: false,
    default_content_type: ContentType::NonFramed,
};

/// XChaCha20-Poly1305 with an HKDF-SHA256 key commitment.
pub const XCHACHA20_POLY1305_HKDF_SHA256_COMMITTING: AlgorithmSuite = AlgorithmSuite {
    id: 0x0146,
    name: "XChaCha20-Poly1305 HKDF-SHA256 committing",
    cipher: CipherKind::XChaCha20Poly1305,
    data_key_len: 32,
    iv_len: 24,
    tag_len: 16,
    requires_commitment: true,
    requires_signature: false,
    default_content_type: ContentType::NonFramed,
};

const REGISTRY: &[&AlgorithmSuite] = &[
    &CHACHA20_POLY1305,
    &XCHACHA20_POLY1305,
    &CHACHA20_POLY1305_HKDF_SHA256_COMMITTING,
    &XCHACHA20_POLY1305_HKDF_SHA256_COMMITTING,
];

impl AlgorithmSuite {
    /// Looks up a suite by its wire id.
    pub fn from_id(id: u16) -> Option<&'static AlgorithmSuite> {
        REGISTRY.iter().copied().find(|suite| suite.id == id)
    }

    /// All registered suites, in registry order.
    pub fn all() -> &'static [&'static AlgorithmSuite] {
        REGISTRY
    }
}

impl fmt::Display for AlgorithmSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:#06x})", self.name, self.id)
    }
}
