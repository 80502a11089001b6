//! Reward Rolling
//!
//! Each random value picks one candidate from a pool fixed before the
//! signatures existed. Picks are aggregated by id, so result size grows with
//! the number of distinct ids rather than the number of rolls.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};

use crate::config::RewardDistribution;
use crate::core::id::{Address, Amount, MonsterId, SeasonId, SeasonPackId};
use crate::core::random::RandomValue;
use crate::core::rank::{RankTable, RankTier};
use crate::error::EconomyError;
use crate::ledger::{Asset, LedgerBatch};

/// Aggregated `(id -> amount)` rewards, ordered by id.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardSet {
    amounts: BTreeMap<u64, Amount>,
}

impl RewardSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` of `id`.
    pub fn add(&mut self, id: u64, amount: Amount) {
        if amount > 0 {
            *self.amounts.entry(id).or_insert(0) += amount;
        }
    }

    /// Amount of one id.
    pub fn get(&self, id: u64) -> Amount {
        self.amounts.get(&id).copied().unwrap_or(0)
    }

    /// `(id, amount)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, Amount)> + '_ {
        self.amounts.iter().map(|(id, amount)| (*id, *amount))
    }

    /// Number of distinct ids.
    pub fn distinct(&self) -> usize {
        self.amounts.len()
    }

    /// Sum of all amounts.
    pub fn total(&self) -> Amount {
        self.amounts.values().sum()
    }

    /// True when nothing was rolled.
    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }

    /// Stage one mint per distinct id.
    pub fn stage_mints(&self, batch: &mut LedgerBatch, to: Address, asset: impl Fn(u64) -> Asset) {
        for (id, amount) in self.iter() {
            batch.mint(to, asset(id), amount);
        }
    }
}

/// Roll one pick per value from `pool` into `into`.
/// Returns false when the pool is empty and there is something to roll.
pub fn roll_picks(pool: &[u64], values: &[RandomValue], into: &mut RewardSet) -> bool {
    if values.is_empty() {
        return true;
    }
    if pool.is_empty() {
        return false;
    }
    for value in values {
        if let Some(id) = value.pick(pool) {
            into.add(*id, 1);
        }
    }
    true
}

/// Result of rolling a gate's rewards.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GateRewards {
    /// Monsters drawn.
    pub monsters: RewardSet,
    /// Season packs drawn.
    pub season_packs: RewardSet,
}

/// Roll every reward slot of a gate.
///
/// Values are consumed in slot order: `counts[E]` picks from the E normal
/// pool, then D, up to S, then the season-pack rolls. `values.len()` must
/// equal `distribution.total()`.
pub fn roll_gate_rewards(
    distribution: &RewardDistribution,
    monster_pools: &RankTable<&[MonsterId]>,
    pack_pool: &[SeasonPackId],
    season_id: SeasonId,
    values: &[RandomValue],
) -> Result<GateRewards, EconomyError> {
    let expected = distribution.total();
    if values.len() as u64 != expected {
        return Err(EconomyError::InvalidGateSignature {
            expected,
            got: values.len() as u64,
        });
    }

    let mut rewards = GateRewards::default();
    let mut cursor = 0usize;

    for rank in RankTier::ALL {
        let count = distribution.monsters[rank.index()] as usize;
        let slot = &values[cursor..cursor + count];
        if !roll_picks(monster_pools[rank.index()], slot, &mut rewards.monsters) {
            return Err(EconomyError::EmptyCandidatePool { rank, is_shadow: false });
        }
        cursor += count;
    }

    let packs = &values[cursor..];
    if !roll_picks(pack_pool, packs, &mut rewards.season_packs) {
        return Err(EconomyError::InvalidCollectionId(season_id));
    }

    Ok(rewards)
}
