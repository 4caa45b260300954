//! Commitment policy.
//!
//! Gates which algorithm suites are legal for encrypt and for decrypt. The
//! two directions are checked independently so a fleet can migrate from
//! non-committing to committing suites without breaking in-flight messages:
//! producers move to `Require` first while consumers stay on `Allow`.

use crate::suite::AlgorithmSuite;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Whether key-commitment-capable suites are forbidden, allowed, or required.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommitmentPolicy {
    /// Reject any suite that carries a key commitment.
    Forbid,
    /// Accept committing and non-committing suites alike.
    Allow,
    /// Reject any suite that does not carry a key commitment.
    #[default]
    Require,
}

/// The operation a policy check applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    Encrypt,
    Decrypt,
}

/// A commitment policy rejected the algorithm suite of an operation.
#[derive(Debug, Error)]
#[error("commitment policy {policy} rejects algorithm suite {suite} for {operation}")]
pub struct PolicyViolation {
    pub policy: CommitmentPolicy,
    pub operation: Operation,
    pub suite: &'static AlgorithmSuite,
}

impl CommitmentPolicy {
    /// Checks whether `suite` may be used to encrypt under this policy.
    pub fn validate_for_encrypt(
        &self,
        suite: &'static AlgorithmSuite,
    ) -> Result<(), PolicyViolation> {
        self.validate(suite, Operation::Encrypt)
    }

    /// Checks whether a message under `suite` may be decrypted under this policy.
    pub fn validate_for_decrypt(
        &self,
        suite: &'static AlgorithmSuite,
    ) -> Result<(), PolicyViolation> {
        self.validate(suite, Operation::Decrypt)
    }

    fn validate(
        &self,
        suite: &'static AlgorithmSuite,
        operation: Operation,
    ) -> Result<(), PolicyViolation> {
        let acceptable = match self {
            CommitmentPolicy::Forbid => !suite.requires_commitment,
            CommitmentPolicy::Allow => true,
            CommitmentPolicy::Require => suite.requires_commitment,
        };
        if acceptable {
            Ok(())
        } else {
            Err(PolicyViolation {
                policy: *self,
                operation,
                suite,
            })
        }
    }
}

impl fmt::Display for CommitmentPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommitmentPolicy::Forbid => write!(f, "forbid-commitment"),
            CommitmentPolicy::Allow => write!(f, "allow-commitment"),
            CommitmentPolicy::Require => write!(f, "require-commitment"),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Encrypt => write!(f, "encrypt"),
            Operation::Decrypt => write!(f, "decrypt"),
        }
    }
}
