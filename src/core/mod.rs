//! Core deterministic primitives.
//!
//! Identifiers, rank tiers, signature-derived random values, checked amount
//! arithmetic and domain-separated hashing. Everything here is pure.

pub mod id;
pub mod rank;
pub mod random;
pub mod amount;
pub mod hash;

// Re-export core types
pub use id::{Address, Amount, GateId, MonsterId, SeasonId, SeasonPackId};
pub use rank::{RankTier, RankTable, RANK_COUNT, ARISE_TIER_COUNT};
pub use random::{RandomValue, PERCENTAGE_SCALE};
pub use hash::{Digest, StateHasher, attestation_message};
