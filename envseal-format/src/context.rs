//! Encryption context: authenticated string-to-string metadata.
//!
//! The context is serialized verbatim into the header (and therefore
//! authenticated with it). Entries are kept sorted by key bytes so the
//! serialized form is deterministic: identical contexts always produce
//! identical header bytes.

use crate::error::{FormatError, FormatResult};
use crate::reader::ByteReader;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ordered-by-key mapping of string metadata, authenticated with the message.
///
/// Backed by a `BTreeMap`, which guarantees unique keys and byte-lexicographic
/// iteration order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncryptionContext {
    entries: BTreeMap<String, String>,
}

impl EncryptionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry, returning the previous value for the key if any.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Appends the serialized form: entry count (u16), then per entry
    /// key length (u16) + key bytes + value length (u16) + value bytes,
    /// in key order.
    pub(crate) fn write_to(&self, buf: &mut Vec<u8>) -> FormatResult<()> {
        let count = u16::try_from(self.entries.len()).map_err(|_| FormatError::FieldTooLong {
            field: "encryption context entry count",
            len: self.entries.len(),
        })?;
        buf.extend_from_slice(&count.to_be_bytes());
        for (key, value) in &self.entries {
            write_len_prefixed(buf, "encryption context key", key.as_bytes())?;
            write_len_prefixed(buf, "encryption context value", value.as_bytes())?;
        }
        Ok(())
    }

    /// Parses the serialized form. Keys must be strictly ascending by byte
    /// order: the canonical form is sorted, and ascending order also rules
    /// out duplicates.
    pub(crate) fn read_from(reader: &mut ByteReader<'_>) -> FormatResult<Self> {
        let count = reader.read_u16()?;
        let mut entries = BTreeMap::new();
        let mut previous_key: Option<String> = None;
        for _ in 0..count {
            let key = std::str::from_utf8(reader.read_len_prefixed()?)
                .map_err(|_| FormatError::Malformed("encryption context key is not valid UTF-8"))?
                .to_string();
            let value = std::str::from_utf8(reader.read_len_prefixed()?)
                .map_err(|_| {
                    FormatError::Malformed("encryption context value is not valid UTF-8")
                })?
                .to_string();
            if let Some(prev) = &previous_key {
                if key.as_bytes() <= prev.as_bytes() {
                    return Err(FormatError::Malformed(
                        "encryption context keys are not sorted and unique",
                    ));
                }
            }
            previous_key = Some(key.clone());
            entries.insert(key, value);
        }
        Ok(Self { entries })
    }
}

impl FromIterator<(String, String)> for EncryptionContext {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for EncryptionContext {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

pub(crate) fn write_len_prefixed(
    buf: &mut Vec<u8>,
    field: &'static str,
    bytes: &[u8],
) -> FormatResult<()> {
    let len = u16::try_from(bytes.len()).map_err(|_| FormatError::FieldTooLong {
        field,
        len: bytes.len(),
    })?;
    buf.extend_from_slice(&len.to_be_bytes());
    buf.extend_from_slice(bytes);
    Ok(())
}
