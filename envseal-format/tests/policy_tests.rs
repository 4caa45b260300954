use envseal_format::{
    CommitmentPolicy, Operation, CHACHA20_POLY1305, CHACHA20_POLY1305_HKDF_SHA256_COMMITTING,
};

const COMMITTING: &envseal_format::AlgorithmSuite = &CHACHA20_POLY1305_HKDF_SHA256_COMMITTING;
const PLAIN: &envseal_format::AlgorithmSuite = &CHACHA20_POLY1305;

#[test]
fn forbid_rejects_committing_in_both_directions() {
    let policy = CommitmentPolicy::Forbid;
    assert!(policy.validate_for_encrypt(COMMITTING).is_err());
    assert!(policy.validate_for_decrypt(COMMITTING).is_err());
    assert!(policy.validate_for_encrypt(PLAIN).is_ok());
    assert!(policy.validate_for_decrypt(PLAIN).is_ok());
}

#[test]
fn require_rejects_non_committing_in_both_directions() {
    let policy = CommitmentPolicy::Require;
    assert!(policy.validate_for_encrypt(PLAIN).is_err());
    assert!(policy.validate_for_decrypt(PLAIN).is_err());
    assert!(policy.validate_for_encrypt(COMMITTING).is_ok());
    assert!(policy.validate_for_decrypt(COMMITTING).is_ok());
}

#[test]
fn allow_accepts_everything() {
    let policy = CommitmentPolicy::Allow;
    for suite in [PLAIN, COMMITTING] {
        assert!(policy.validate_for_encrypt(suite).is_ok());
        assert!(policy.validate_for_decrypt(suite).is_ok());
    }
}

#[test]
fn producer_first_migration_is_expressible() {
    // Producers upgraded to Require emit committing messages; consumers still
    // on Allow accept both the new committing and old non-committing traffic.
    let producer = CommitmentPolicy::Require;
    let consumer = CommitmentPolicy::Allow;

    assert!(producer.validate_for_encrypt(COMMITTING).is_ok());
    assert!(consumer.validate_for_decrypt(COMMITTING).is_ok());
    assert!(consumer.validate_for_decrypt(PLAIN).is_ok());
}

#[test]
fn violation_reports_policy_operation_and_suite() {
    let err = CommitmentPolicy::Forbid
        .validate_for_encrypt(COMMITTING)
        .unwrap_err();
    assert_eq!(err.policy, CommitmentPolicy::Forbid);
    assert_eq!(err.operation, Operation::Encrypt);
    assert_eq!(err.suite.id, COMMITTING.id);

    let rendered = err.to_string();
    assert!(rendered.contains("forbid-commitment"));
    assert!(rendered.contains("encrypt"));
    assert!(rendered.contains("0x0114"));
}

#[test]
fn default_policy_requires_commitment() {
    assert_eq!(CommitmentPolicy::default(), CommitmentPolicy::Require);
}
