//! # Hunter Economy Engine
//!
//! Ledger-backed game economy for a monster-collecting dungeon crawler:
//! hunters enter time-boxed gates, clear them for randomized rewards and
//! convert monsters between ranks.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      HUNTER ECONOMY                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── id.rs       - Addresses and id aliases                  │
//! │  ├── rank.rs     - Rank tiers E..S                           │
//! │  ├── random.rs   - 256-bit random values, exact reduction    │
//! │  ├── amount.rs   - Checked amount arithmetic                 │
//! │  └── hash.rs     - Attestation messages, state hashing       │
//! │                                                              │
//! │  oracle/         - Signature-derived randomness, nonces      │
//! │  registry/       - Monster pools and the arise graph         │
//! │  gate/           - Gate state machine and reward rolling     │
//! │  progression/    - Upgrade, arise, return                    │
//! │                                                              │
//! │  engine.rs       - Call pipeline, roles, registry admin      │
//! │  ledger/         - Collaborator traits + in-memory impls     │
//! │  config.rs       - Tables (serde, env-loaded)                │
//! │  events.rs       - Event log (json / bincode)                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Atomicity Guarantee
//!
//! Every engine call either commits fully or leaves no trace:
//! - All checks and oracle verification run before any write
//! - Token effects go to the ledger as one batch, applied all-or-nothing
//! - Engine state and nonces are written only after the batch succeeds
//!
//! Randomness comes only from attester signatures over `(hunter, nonce)`,
//! and every collection is a BTreeMap, so replaying the same calls gives
//! the same [`Engine::state_hash`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod access;
pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod events;
pub mod gate;
pub mod ledger;
pub mod oracle;
pub mod progression;
pub mod registry;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use crate::core::id::{Address, Amount, GateId, MonsterId, SeasonId, SeasonPackId};
pub use crate::core::rank::RankTier;
pub use config::EconomyConfig;
pub use engine::{CallContext, Collaborators, Engine};
pub use error::EconomyError;
pub use events::{EconomyEvent, EventData};
pub use oracle::{AttestationVerifier, Ed25519Attester, Ed25519Verifier, OracleSignature};
pub use progression::ReturnEntry;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
