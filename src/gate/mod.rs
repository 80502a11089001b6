//! Dungeon Gates
//!
//! A gate is a time-boxed dungeon run. The hunter pays one key to enter,
//! waits out the gate's duration (or pays essence stone to skip the rest),
//! then clears it with attester signatures that roll the rewards.
//!
//! ```text
//! enter_gate ──► Created ──boost_gate──► Boosted
//!                   │                       │
//!                   └────── clear_gate ─────┴──► Cleared
//! ```
//!
//! - `state`: gate entity and per-hunter slot records
//! - `reward`: reward rolling and aggregation
//! - `ops`: the engine operations and gate admin setters

pub mod ops;
pub mod reward;
pub mod state;

pub use ops::ClearedGate;
pub use reward::{roll_gate_rewards, GateRewards, RewardSet};
pub use state::{Gate, GateBook, GateStatus, HunterSeasonGates};
