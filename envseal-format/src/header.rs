//! Binary ciphertext header codec.
//!
//! The header is the self-describing part of a message: version, algorithm
//! suite, message id, encryption context, the ordered encrypted-data-key
//! list, content type, IV length, and frame length, in that fixed order,
//! big-endian. The codec is purely structural: it performs no cryptographic
//! verification and never copies payload bytes.

use crate::context::{write_len_prefixed, EncryptionContext};
use crate::edk::EncryptedDataKey;
use crate::error::{FormatError, FormatResult};
use crate::reader::ByteReader;
use crate::suite::AlgorithmSuite;

/// Message format version written by this codec.
pub const FORMAT_VERSION_1: u8 = 1;

/// Length of the random message id, in bytes.
pub const MESSAGE_ID_LEN: usize = 16;

/// Passing this as `max_encrypted_data_keys` disables the cap.
pub const NO_MAX_ENCRYPTED_DATA_KEYS: usize = 0;

/// How the encrypted body is laid out after the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    /// Single-shot body; the frame-length field must be zero.
    NonFramed,
    /// Framed body with a fixed frame length.
    Framed,
}

impl ContentType {
    fn from_u8(byte: u8) -> FormatResult<Self> {
        match byte {
            1 => Ok(ContentType::NonFramed),
            2 => Ok(ContentType::Framed),
            other => Err(FormatError::UnknownContentType(other)),
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            ContentType::NonFramed => 1,
            ContentType::Framed => 2,
        }
    }
}

/// Parsed (or to-be-serialized) ciphertext header.
///
/// A value of this type is only ever produced by [`MessageHeader::deserialize`]
/// once every field, including the full encrypted-data-key list, has parsed;
/// there is no partially-initialized header state. The EDK list order is the
/// order records appear on the wire, which is also the attempt order on
/// decrypt.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageHeader {
    pub version: u8,
    pub suite: &'static AlgorithmSuite,
    pub message_id: [u8; MESSAGE_ID_LEN],
    pub encryption_context: EncryptionContext,
    pub encrypted_data_keys: Vec<EncryptedDataKey>,
    pub content_type: ContentType,
    pub iv_len: u8,
    pub frame_length: u32,
}

impl MessageHeader {
    /// Builds a version-1 header with the suite's content type. Every
    /// registered suite defaults to non-framed, so the frame length is zero.
    pub fn for_suite(
        suite: &'static AlgorithmSuite,
        message_id: [u8; MESSAGE_ID_LEN],
        encryption_context: EncryptionContext,
        encrypted_data_keys: Vec<EncryptedDataKey>,
    ) -> Self {
        Self {
            version: FORMAT_VERSION_1,
            suite,
            message_id,
            encryption_context,
            encrypted_data_keys,
            content_type: suite.default_content_type,
            iv_len: suite.iv_len as u8,
            frame_length: 0,
        }
    }

    /// Message id as lowercase hex, for diagnostics.
    pub fn message_id_hex(&self) -> String {
        hex::encode(self.message_id)
    }

    /// Serializes the header. Identical headers always produce identical
    /// bytes: the encryption context is written in key order and every field
    /// width is fixed or length-prefixed.
    pub fn serialize(&self) -> FormatResult<Vec<u8>> {
        if self.encrypted_data_keys.is_empty() {
            return Err(FormatError::Malformed("header contains no encrypted data keys"));
        }
        let edk_count =
            u16::try_from(self.encrypted_data_keys.len()).map_err(|_| FormatError::FieldTooLong {
                field: "encrypted data key count",
                len: self.encrypted_data_keys.len(),
            })?;

        let mut buf = Vec::new();
        buf.push(self.version);
        buf.extend_from_slice(&self.suite.id.to_be_bytes());
        buf.extend_from_slice(&self.message_id);
        self.encryption_context.write_to(&mut buf)?;
        buf.extend_from_slice(&edk_count.to_be_bytes());
        for edk in &self.encrypted_data_keys {
            write_len_prefixed(&mut buf, "provider id", edk.provider_id().as_bytes())?;
            write_len_prefixed(&mut buf, "provider key info", edk.provider_info())?;
            write_len_prefixed(&mut buf, "wrapped data key", edk.ciphertext())?;
        }
        buf.push(self.content_type.as_u8());
        buf.push(self.iv_len);
        buf.extend_from_slice(&self.frame_length.to_be_bytes());
        Ok(buf)
    }

    /// Parses a header from `bytes` starting at `offset`, returning the
    /// header and the offset of the first body byte.
    ///
    /// `max_encrypted_data_keys` caps how many EDK records will be parsed;
    /// [`NO_MAX_ENCRYPTED_DATA_KEYS`] (zero) means unbounded. The cap is
    /// checked against the claimed count before any record storage is
    /// allocated, so a hostile count field cannot drive allocation.
    ///
    /// Parsing is incremental and fail-fast: a field running past the end of
    /// the buffer yields [`FormatError::Truncated`], structural violations
    /// yield the malformed-family errors, and the codec never reads past the
    /// supplied buffer.
    pub fn deserialize(
        bytes: &[u8],
        offset: usize,
        max_encrypted_data_keys: usize,
    ) -> FormatResult<(Self, usize)> {
        if offset > bytes.len() {
            return Err(FormatError::Truncated {
                needed: offset - bytes.len(),
            });
        }
        let mut reader = ByteReader::new(&bytes[offset..]);

        let version = reader.read_u8()?;
        if version != FORMAT_VERSION_1 {
            return Err(FormatError::UnsupportedVersion(version));
        }

        let suite_id = reader.read_u16()?;
        let suite =
            AlgorithmSuite::from_id(suite_id).ok_or(FormatError::UnknownSuite(suite_id))?;

        let mut message_id = [0u8; MESSAGE_ID_LEN];
        message_id.copy_from_slice(reader.read_bytes(MESSAGE_ID_LEN)?);

        let encryption_context = EncryptionContext::read_from(&mut reader)?;

        let edk_count = reader.read_u16()? as usize;
        if edk_count == 0 {
            return Err(FormatError::Malformed("header contains no encrypted data keys"));
        }
        if max_encrypted_data_keys != NO_MAX_ENCRYPTED_DATA_KEYS
            && edk_count > max_encrypted_data_keys
        {
            return Err(FormatError::TooManyDataKeys {
                count: edk_count,
                max: max_encrypted_data_keys,
            });
        }
        // Records are pushed as they parse; the claimed count never
        // pre-allocates storage.
        let mut encrypted_data_keys = Vec::new();
        for _ in 0..edk_count {
            let provider_id = std::str::from_utf8(reader.read_len_prefixed()?)
                .map_err(|_| FormatError::Malformed("provider id is not valid UTF-8"))?
                .to_string();
            let provider_info = reader.read_len_prefixed()?.to_vec();
            let ciphertext = reader.read_len_prefixed()?.to_vec();
            encrypted_data_keys.push(EncryptedDataKey::new(provider_id, provider_info, ciphertext));
        }

        let content_type = ContentType::from_u8(reader.read_u8()?)?;

        let iv_len = reader.read_u8()?;
        if iv_len as usize != suite.iv_len {
            return Err(FormatError::Malformed("IV length does not match algorithm suite"));
        }

        let frame_length = reader.read_u32()?;
        match content_type {
            ContentType::NonFramed if frame_length != 0 => {
                return Err(FormatError::Malformed("non-framed content with nonzero frame length"));
            }
            ContentType::Framed if frame_length == 0 => {
                return Err(FormatError::Malformed("framed content with zero frame length"));
            }
            _ => {}
        }

        let header = Self {
            version,
            suite,
            message_id,
            encryption_context,
            encrypted_data_keys,
            content_type,
            iv_len,
            frame_length,
        };
        Ok((header, offset + reader.position()))
    }
}
