//! Domain-Separated Hashing
//!
//! Provides deterministic SHA-256 hashing for:
//! - Attestation messages (`hash(hunter, nonce)`)
//! - Random value derivation from signature bytes
//! - Engine state digests for replay verification

use sha2::{Sha256, Digest as _};
use super::id::Address;

/// Hash output type (256 bits / 32 bytes)
pub type Digest = [u8; 32];

/// Domain separator for attestation messages.
pub const RANDOM_DOMAIN: &[u8] = b"HUNTER_ECONOMY_RANDOM_V1";

/// Domain separator for engine state digests.
pub const STATE_DOMAIN: &[u8] = b"HUNTER_ECONOMY_STATE_V1";

/// Deterministic hasher.
///
/// Wraps SHA-256 with typed update helpers.
/// Order of updates is critical for determinism.
pub struct StateHasher {
    hasher: Sha256,
}

impl StateHasher {
    /// Create a new hasher with domain separator.
    pub fn new(domain: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        Self { hasher }
    }

    /// Create hasher for engine state.
    pub fn for_engine_state() -> Self {
        Self::new(STATE_DOMAIN)
    }

    /// Update with raw bytes.
    #[inline]
    pub fn update_bytes(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
    }

    /// Update with a u8 value.
    #[inline]
    pub fn update_u8(&mut self, value: u8) {
        self.hasher.update([value]);
    }

    /// Update with a u32 value (big-endian).
    #[inline]
    pub fn update_u32(&mut self, value: u32) {
        self.hasher.update(value.to_be_bytes());
    }

    /// Update with a u64 value (big-endian).
    #[inline]
    pub fn update_u64(&mut self, value: u64) {
        self.hasher.update(value.to_be_bytes());
    }

    /// Update with a u128 value (big-endian).
    #[inline]
    pub fn update_u128(&mut self, value: u128) {
        self.hasher.update(value.to_be_bytes());
    }

    /// Update with a boolean.
    #[inline]
    pub fn update_bool(&mut self, value: bool) {
        self.update_u8(value as u8);
    }

    /// Update with an address (20 bytes).
    #[inline]
    pub fn update_address(&mut self, address: &Address) {
        self.hasher.update(address.as_bytes());
    }

    /// Finalize and return the hash.
    pub fn finalize(self) -> Digest {
        self.hasher.finalize().into()
    }
}

/// Compute a simple hash of arbitrary data.
pub fn hash_bytes(data: &[u8]) -> Digest {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Message an attester signs to authorize randomness for `(hunter, nonce)`.
pub fn attestation_message(hunter: &Address, nonce: u64) -> Digest {
    let mut hasher = StateHasher::new(RANDOM_DOMAIN);
    hasher.update_address(hunter);
    hasher.update_u64(nonce);
    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hasher_determinism() {
        let make_hash = || {
            let mut hasher = StateHasher::for_engine_state();
            hasher.update_u32(100);
            hasher.update_u64(12345);
            hasher.update_u128(u128::MAX);
            hasher.update_address(&Address::new([7; 20]));
            hasher.update_bool(true);
            hasher.finalize()
        };

        assert_eq!(make_hash(), make_hash());
    }

    #[test]
    fn test_hash_order_matters() {
        let hash1 = {
            let mut h = StateHasher::new(b"test");
            h.update_u32(1);
            h.update_u32(2);
            h.finalize()
        };

        let hash2 = {
            let mut h = StateHasher::new(b"test");
            h.update_u32(2);
            h.update_u32(1);
            h.finalize()
        };

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_domain_separation() {
        let data = [1u8, 2, 3, 4];

        let digest = |domain: &[u8]| {
            let mut h = StateHasher::new(domain);
            h.update_bytes(&data);
            h.finalize()
        };

        assert_ne!(digest(b"DOMAIN_A"), digest(b"DOMAIN_B"));
        assert_ne!(digest(b"DOMAIN_A"), hash_bytes(&data));
    }

    #[test]
    fn test_attestation_message_binds_hunter_and_nonce() {
        let alice = Address::new([1; 20]);
        let bob = Address::new([2; 20]);

        assert_eq!(attestation_message(&alice, 0), attestation_message(&alice, 0));
        assert_ne!(attestation_message(&alice, 0), attestation_message(&alice, 1));
        assert_ne!(attestation_message(&alice, 0), attestation_message(&bob, 0));
    }
}
