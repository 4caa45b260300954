//! Raw data key material.

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// The raw (unwrapped) data key for one message.
///
/// Material is zeroized on drop and never rendered by `Debug`.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct DataKey {
    material: Vec<u8>,
}

impl DataKey {
    pub fn new(material: Vec<u8>) -> Self {
        Self { material }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.material
    }

    pub fn len(&self) -> usize {
        self.material.len()
    }

    pub fn is_empty(&self) -> bool {
        self.material.is_empty()
    }
}

impl fmt::Debug for DataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DataKey(<{} bytes>)", self.material.len())
    }
}
