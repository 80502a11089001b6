//! Randomness Oracle
//!
//! Turns attester signatures into random values while enforcing a single,
//! strictly increasing nonce per hunter.
//!
//! ## Protocol
//!
//! ```text
//! hunter nonce n
//!   signatures s_0 .. s_k-1   (s_i signs hash(hunter, n + i))
//!   verify every s_i          -> Attestation { values: sha256(s_i) }
//!   ... caller finishes its own checks and ledger batch ...
//!   commit                    -> nonce = n + k
//! ```
//!
//! Verification is pure. The nonce only moves in [`RandomOracle::commit`],
//! which the engine calls after everything else in the call has succeeded,
//! so a failed call never advances it.

pub mod attestation;

use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::core::hash::attestation_message;
use crate::core::id::Address;
use crate::core::random::RandomValue;
use crate::error::EconomyError;

pub use attestation::{
    AttestationVerifier, Ed25519Attester, Ed25519Verifier, OracleSignature,
};

/// Verified signatures for one hunter, not yet committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attestation {
    hunter: Address,
    start_nonce: u64,
    values: Vec<RandomValue>,
}

impl Attestation {
    /// Random values, in signature order.
    pub fn values(&self) -> &[RandomValue] {
        &self.values
    }

    /// Number of signatures consumed.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no signature was consumed.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Nonce the hunter had when the signatures were checked.
    pub fn start_nonce(&self) -> u64 {
        self.start_nonce
    }

    /// Nonce after commit.
    pub fn next_nonce(&self) -> u64 {
        self.start_nonce + self.values.len() as u64
    }
}

/// Per-hunter nonce store plus the attester verifier.
pub struct RandomOracle {
    verifier: Box<dyn AttestationVerifier>,
    nonces: BTreeMap<Address, u64>,
}

impl RandomOracle {
    /// Create an oracle bound to an attester.
    pub fn new(verifier: Box<dyn AttestationVerifier>) -> Self {
        Self {
            verifier,
            nonces: BTreeMap::new(),
        }
    }

    /// Replace the attester.
    pub fn set_verifier(&mut self, verifier: Box<dyn AttestationVerifier>) {
        self.verifier = verifier;
    }

    /// Current attester identity.
    pub fn attester_id(&self) -> String {
        self.verifier.attester_id()
    }

    /// Next nonce the hunter must sign for.
    pub fn nonce_of(&self, hunter: &Address) -> u64 {
        self.nonces.get(hunter).copied().unwrap_or(0)
    }

    /// All hunters with a non-zero nonce, in address order.
    pub fn nonces(&self) -> impl Iterator<Item = (&Address, &u64)> {
        self.nonces.iter()
    }

    /// Verify `signatures` against consecutive nonces starting at the
    /// hunter's stored nonce. Does not mutate.
    pub fn verify(
        &self,
        hunter: &Address,
        signatures: &[OracleSignature],
    ) -> Result<Attestation, EconomyError> {
        let start_nonce = self.nonce_of(hunter);
        let mut values = Vec::with_capacity(signatures.len());

        for (offset, signature) in signatures.iter().enumerate() {
            let nonce = start_nonce + offset as u64;
            let message = attestation_message(hunter, nonce);
            if !self.verifier.verify(&message, signature.as_bytes()) {
                warn!(
                    "Rejected random signature for {} at nonce {}",
                    hunter.short(),
                    nonce
                );
                return Err(EconomyError::RandomSignatureVerifyFailed { nonce });
            }
            values.push(RandomValue::from_signature(signature.as_bytes()));
        }

        Ok(Attestation {
            hunter: *hunter,
            start_nonce,
            values,
        })
    }

    /// Advance the hunter's nonce past a verified attestation.
    pub fn commit(&mut self, attestation: &Attestation) {
        if attestation.is_empty() {
            return;
        }
        debug_assert_eq!(self.nonce_of(&attestation.hunter), attestation.start_nonce);

        let next = attestation.next_nonce();
        self.nonces.insert(attestation.hunter, next);
        debug!(
            "Nonce for {} advanced {} -> {}",
            attestation.hunter.short(),
            attestation.start_nonce,
            next
        );
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn hunter() -> Address {
        Address::new([0x22; 20])
    }

    fn setup() -> (Ed25519Attester, RandomOracle) {
        let attester = Ed25519Attester::from_seed([3; 32]);
        let oracle = RandomOracle::new(Box::new(attester.verifier()));
        (attester, oracle)
    }

    #[test]
    fn test_verify_then_commit_advances_nonce() {
        let (attester, mut oracle) = setup();
        let sigs = attester.sign_range(&hunter(), 0, 3);

        let attestation = oracle.verify(&hunter(), &sigs).unwrap();
        assert_eq!(attestation.len(), 3);
        assert_eq!(oracle.nonce_of(&hunter()), 0);

        oracle.commit(&attestation);
        assert_eq!(oracle.nonce_of(&hunter()), 3);
    }

    #[test]
    fn test_values_are_hash_of_signature() {
        let (attester, oracle) = setup();
        let sigs = attester.sign_range(&hunter(), 0, 2);

        let attestation = oracle.verify(&hunter(), &sigs).unwrap();
        assert_eq!(attestation.values()[0], RandomValue::from_signature(sigs[0].as_bytes()));
        assert_eq!(attestation.values()[1], RandomValue::from_signature(sigs[1].as_bytes()));
    }

    #[test]
    fn test_replay_rejected() {
        let (attester, mut oracle) = setup();
        let sigs = attester.sign_range(&hunter(), 0, 2);

        let attestation = oracle.verify(&hunter(), &sigs).unwrap();
        oracle.commit(&attestation);

        let err = oracle.verify(&hunter(), &sigs).unwrap_err();
        assert!(matches!(err, EconomyError::RandomSignatureVerifyFailed { nonce: 2 }));
    }

    #[test]
    fn test_out_of_order_rejected() {
        let (attester, oracle) = setup();
        let mut sigs = attester.sign_range(&hunter(), 0, 3);
        sigs.swap(1, 2);

        let err = oracle.verify(&hunter(), &sigs).unwrap_err();
        assert!(matches!(err, EconomyError::RandomSignatureVerifyFailed { nonce: 1 }));
    }

    #[test]
    fn test_signature_for_other_hunter_rejected() {
        let (attester, oracle) = setup();
        let other = Address::new([0x33; 20]);
        let sigs = attester.sign_range(&other, 0, 1);

        assert!(oracle.verify(&hunter(), &sigs).is_err());
    }

    #[test]
    fn test_nonces_are_per_hunter() {
        let (attester, mut oracle) = setup();
        let other = Address::new([0x33; 20]);

        let a = oracle.verify(&hunter(), &attester.sign_range(&hunter(), 0, 4)).unwrap();
        oracle.commit(&a);

        assert_eq!(oracle.nonce_of(&other), 0);
        assert!(oracle.verify(&other, &attester.sign_range(&other, 0, 1)).is_ok());
    }

    #[test]
    fn test_empty_signature_set() {
        let (_, mut oracle) = setup();
        let attestation = oracle.verify(&hunter(), &[]).unwrap();
        assert!(attestation.is_empty());
        oracle.commit(&attestation);
        assert_eq!(oracle.nonce_of(&hunter()), 0);
        assert_eq!(oracle.nonces().count(), 0);
    }

    #[test]
    fn test_set_verifier_invalidates_old_attester() {
        let (attester, mut oracle) = setup();
        let rotated = Ed25519Attester::from_seed([4; 32]);
        oracle.set_verifier(Box::new(rotated.verifier()));

        assert!(oracle.verify(&hunter(), &attester.sign_range(&hunter(), 0, 1)).is_err());
        assert!(oracle.verify(&hunter(), &rotated.sign_range(&hunter(), 0, 1)).is_ok());
        assert_eq!(oracle.attester_id(), rotated.verifier().attester_id());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_nonce_moves_only_on_success(batches in proptest::collection::vec((1u64..4, any::<bool>()), 1..6)) {
            let (attester, mut oracle) = setup();
            for (count, tamper) in batches {
                let before = oracle.nonce_of(&hunter());
                let mut sigs = attester.sign_range(&hunter(), before, count);
                if tamper {
                    sigs[0] = attester.sign(&hunter(), before + 100);
                }
                match oracle.verify(&hunter(), &sigs) {
                    Ok(attestation) => {
                        oracle.commit(&attestation);
                        prop_assert!(!tamper);
                        prop_assert_eq!(oracle.nonce_of(&hunter()), before + count);
                    }
                    Err(_) => {
                        prop_assert!(tamper);
                        prop_assert_eq!(oracle.nonce_of(&hunter()), before);
                    }
                }
            }
        }
    }
}
