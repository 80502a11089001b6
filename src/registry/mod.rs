//! Monster Registry & Arise Graph
//!
//! - `monster`: rank pools, score tables, validated arise links
//! - `arise`: the per-tier bijection behind arise links

pub mod arise;
pub mod monster;

pub use arise::{AriseGraph, AriseLinks};
pub use monster::{AriseLink, MonsterInfo, MonsterRegistry, PoolKey, RankChange};
