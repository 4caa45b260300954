//! Master key providers for envseal.
//!
//! A master key is an external trust root that wraps and unwraps the
//! per-message data key. This crate defines the capability traits, the
//! ordered multi-provider composition (first member generates the data key,
//! every member wraps it), and a provider built on an external
//! key-management backend with strict or filter-gated discovery key
//! resolution.
//!
//! Everything here is synchronous and immutable after construction; shared
//! providers can be read from any thread without locking, and derivations
//! like [`BackendKeyProvider::with_grant_tokens`] return new values rather
//! than mutating shared state.

mod backend;
mod data_key;
mod error;
mod multi;
mod provider;

pub use backend::{
    BackendKeyProvider, ClientSupplier, DecryptDataKeyRequest, EncryptDataKeyRequest,
    GenerateDataKeyRequest, GeneratedDataKey, KeyBackend, KeyIdFilter, BACKEND_PROVIDER_ID,
};
pub use data_key::DataKey;
pub use error::{BackendError, KeyringError, KeyringResult};
pub use multi::MultiProvider;
pub use provider::{MasterKey, MasterKeyProvider};
