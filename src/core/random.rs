//! Signature-Derived Random Values
//!
//! Each attester signature is hashed into a 256-bit unsigned integer
//! (`uint256(sha256(signature))`, big-endian). Callers reduce it modulo a
//! candidate count that was fixed before the signature was produced.
//!
//! Reduction is exact over the full 256 bits, so a value behaves the same
//! regardless of the modulus width.

use serde::{Serialize, Deserialize};

use super::hash::{hash_bytes, Digest};

/// Arise success percentages use 5 decimal places: `100_00000` is 100%.
pub const PERCENTAGE_SCALE: u64 = 100_00000;

/// A 256-bit random value, stored big-endian.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RandomValue(Digest);

impl RandomValue {
    /// Wrap raw big-endian bytes.
    pub const fn from_bytes(bytes: Digest) -> Self {
        Self(bytes)
    }

    /// Derive the value for one signature.
    pub fn from_signature(signature: &[u8]) -> Self {
        Self(hash_bytes(signature))
    }

    /// Raw big-endian bytes.
    pub fn as_bytes(&self) -> &Digest {
        &self.0
    }

    /// Exact `value mod modulus`. Returns 0 for a zero modulus.
    pub fn reduce(&self, modulus: u64) -> u64 {
        if modulus == 0 {
            return 0;
        }
        let m = modulus as u128;
        // r < m <= 2^64, so (r << 8) stays below 2^72
        let rem = self.0.iter().fold(0u128, |r, &b| ((r << 8) | b as u128) % m);
        rem as u64
    }

    /// Pick one candidate: `candidates[value mod len]`.
    pub fn pick<'a, T>(&self, candidates: &'a [T]) -> Option<&'a T> {
        if candidates.is_empty() {
            None
        } else {
            let idx = self.reduce(candidates.len() as u64) as usize;
            Some(&candidates[idx])
        }
    }

    /// Roll in `1..=PERCENTAGE_SCALE`.
    #[inline]
    pub fn roll_percentage(&self) -> u64 {
        self.reduce(PERCENTAGE_SCALE) + 1
    }
}

impl From<u128> for RandomValue {
    fn from(value: u128) -> Self {
        let mut bytes = [0u8; 32];
        bytes[16..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }
}

// =============================================================================
// TESTS
// =============================================================================
