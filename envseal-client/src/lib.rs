//! Envelope encryption engine for envseal.
//!
//! Ties the ciphertext format (`envseal-format`) and the master key
//! providers (`envseal-keyring`) into the two top-level operations:
//!
//! - [`EnvelopeClient::encrypt`] generates a fresh data key, wraps it under
//!   every configured master key, and seals the plaintext into a
//!   self-describing message whose header is authenticated with the body.
//! - [`EnvelopeClient::decrypt`] parses the header, unwraps the data key via
//!   the first usable EDK record, and opens the body, failing loudly on any
//!   alteration.
//!
//! Commitment-capable suites additionally bind the ciphertext to the data
//! key with an HKDF-SHA256 commitment value, gated by [`CommitmentPolicy`]
//! in both directions independently.
//!
//! [`CommitmentPolicy`]: envseal_format::CommitmentPolicy

mod cipher;
mod client;
mod error;

pub use cipher::COMMITMENT_LEN;
pub use client::{DecryptOutput, EnvelopeClient};
pub use error::{ClientError, ClientResult};
