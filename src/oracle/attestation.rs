//! Attestation Signatures
//!
//! The attester signs `attestation_message(hunter, nonce)` for every random
//! value a hunter will consume. Verification sits behind
//! [`AttestationVerifier`] so the nonce and replay logic does not depend on a
//! particular signature scheme.

use std::fmt;
use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use serde::{Serialize, Deserialize};

use crate::core::hash::{attestation_message, Digest};
use crate::core::id::Address;

/// Raw signature bytes as submitted by a hunter.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OracleSignature(pub Vec<u8>);

impl OracleSignature {
    /// Signature bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for OracleSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let head = &self.0[..self.0.len().min(8)];
        write!(f, "OracleSignature({}..)", hex::encode(head))
    }
}

/// Checks that a signature over a message was produced by the attester.
pub trait AttestationVerifier: Send {
    /// True if `signature` is the attester's signature over `message`.
    fn verify(&self, message: &Digest, signature: &[u8]) -> bool;

    /// Attester identity, for logs.
    fn attester_id(&self) -> String;
}

// =============================================================================
// ED25519
// =============================================================================

/// Ed25519 verifier bound to one attester public key.
#[derive(Clone, Debug)]
pub struct Ed25519Verifier {
    attester: VerifyingKey,
}

impl Ed25519Verifier {
    /// Create from an attester public key.
    pub fn new(attester: VerifyingKey) -> Self {
        Self { attester }
    }

    /// Create from raw public key bytes.
    pub fn from_bytes(bytes: &[u8; 32]) -> Option<Self> {
        VerifyingKey::from_bytes(bytes).ok().map(Self::new)
    }
}

impl AttestationVerifier for Ed25519Verifier {
    fn verify(&self, message: &Digest, signature: &[u8]) -> bool {
        match Signature::from_slice(signature) {
            Ok(sig) => self.attester.verify_strict(message, &sig).is_ok(),
            Err(_) => false,
        }
    }

    fn attester_id(&self) -> String {
        hex::encode(self.attester.as_bytes())
    }
}

/// Signing side of the attester, for tooling and tests.
pub struct Ed25519Attester {
    key: SigningKey,
}

impl Ed25519Attester {
    /// Create from a 32-byte secret seed.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self { key: SigningKey::from_bytes(&seed) }
    }

    /// Matching verifier.
    pub fn verifier(&self) -> Ed25519Verifier {
        Ed25519Verifier::new(self.key.verifying_key())
    }

    /// Sign one `(hunter, nonce)` pair.
    pub fn sign(&self, hunter: &Address, nonce: u64) -> OracleSignature {
        let message = attestation_message(hunter, nonce);
        OracleSignature(self.key.sign(&message).to_bytes().to_vec())
    }

    /// Sign `count` consecutive nonces starting at `start_nonce`.
    pub fn sign_range(&self, hunter: &Address, start_nonce: u64, count: u64) -> Vec<OracleSignature> {
        (start_nonce..start_nonce + count)
            .map(|nonce| self.sign(hunter, nonce))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hunter() -> Address {
        Address::new([0x11; 20])
    }

    #[test]
    fn test_sign_and_verify() {
        let attester = Ed25519Attester::from_seed([9; 32]);
        let verifier = attester.verifier();
        let sig = attester.sign(&hunter(), 0);

        assert!(verifier.verify(&attestation_message(&hunter(), 0), sig.as_bytes()));
    }

    #[test]
    fn test_wrong_nonce_rejected() {
        let attester = Ed25519Attester::from_seed([9; 32]);
        let verifier = attester.verifier();
        let sig = attester.sign(&hunter(), 0);

        assert!(!verifier.verify(&attestation_message(&hunter(), 1), sig.as_bytes()));
    }

    #[test]
    fn test_wrong_attester_rejected() {
        let attester = Ed25519Attester::from_seed([9; 32]);
        let impostor = Ed25519Attester::from_seed([8; 32]);
        let sig = impostor.sign(&hunter(), 0);

        assert!(!attester.verifier().verify(&attestation_message(&hunter(), 0), sig.as_bytes()));
    }

    #[test]
    fn test_malformed_signature_rejected() {
        let verifier = Ed25519Attester::from_seed([9; 32]).verifier();
        let message = attestation_message(&hunter(), 0);
        assert!(!verifier.verify(&message, &[]));
        assert!(!verifier.verify(&message, &[0u8; 10]));
    }

    #[test]
    fn test_signatures_are_deterministic() {
        let attester = Ed25519Attester::from_seed([9; 32]);
        assert_eq!(attester.sign(&hunter(), 5), attester.sign(&hunter(), 5));
        assert_eq!(attester.sign_range(&hunter(), 3, 4).len(), 4);
        assert_eq!(attester.sign_range(&hunter(), 3, 4)[1], attester.sign(&hunter(), 4));
    }

    #[test]
    fn test_verifier_from_bytes() {
        let attester = Ed25519Attester::from_seed([9; 32]);
        let bytes = attester.key.verifying_key().to_bytes();
        let verifier = Ed25519Verifier::from_bytes(&bytes).unwrap();
        assert_eq!(verifier.attester_id(), hex::encode(bytes));
    }
}
