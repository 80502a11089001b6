//! Identifiers
//!
//! Hunter addresses and the integer ids used for monsters, gates, seasons
//! and season packs.

use std::fmt;
use serde::{Serialize, Deserialize};

/// Monster identifier (1-based, assigned by the registry).
pub type MonsterId = u64;

/// Gate identifier (1-based, assigned on entry).
pub type GateId = u64;

/// Season identifier.
pub type SeasonId = u32;

/// Season pack token identifier.
pub type SeasonPackId = u64;

/// Token amount. Wide enough that `amount * price` products over large
/// batches cannot overflow in practice; every product is still checked.
pub type Amount = u128;

/// Account address (20 bytes).
///
/// Implements Ord for deterministic BTreeMap ordering.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The all-zero address.
    pub const ZERO: Address = Address([0; 20]);

    /// Create from raw bytes.
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Parse from hex, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Option<Self> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits).ok()?;
        let raw: [u8; 20] = bytes.try_into().ok()?;
        Some(Self(raw))
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Short form for log lines.
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address(0x{})", self.short())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_hex() {
        let addr = Address::new([0xab; 20]);
        let text = addr.to_string();
        assert!(text.starts_with("0xabab"));
        assert_eq!(Address::from_hex(&text), Some(addr));
        assert_eq!(Address::from_hex(&text[2..]), Some(addr));
    }

    #[test]
    fn test_address_rejects_bad_hex() {
        assert_eq!(Address::from_hex("0x1234"), None);
        assert_eq!(Address::from_hex("not hex"), None);
    }
}
