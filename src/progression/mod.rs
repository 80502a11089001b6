//! Progression Engine
//!
//! Converts monsters between tiers:
//!
//! - `upgrade`: burn source-rank monsters and stone, roll next-rank monsters
//! - `arise`: repeated odds-based attempts to evolve one monster into its
//!   linked shadow
//! - `returns`: liquidate monsters for essence stone
//!
//! This module holds the per-season counters and the arise refund credit.
//! The operations themselves are `Engine` methods in the submodules.

pub mod arise;
pub mod returns;
pub mod upgrade;

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};

use crate::core::hash::StateHasher;
use crate::core::id::{Address, Amount, SeasonId};
use crate::core::rank::{RankTier, ARISE_TIER_COUNT, RANK_COUNT};

pub use arise::AriseOutcome;
pub use returns::ReturnEntry;

/// A hunter's progression counters for one season.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonProgress {
    /// Upgrades performed, by source rank.
    pub upgrades: [u64; RANK_COUNT],
    /// Arise attempts consumed, by arise tier (B, A, S).
    pub arises: [u64; ARISE_TIER_COUNT],
    /// Monsters returned, by rank then `[normal, shadow]`.
    pub returns: [[u64; 2]; RANK_COUNT],
}

impl SeasonProgress {
    /// Returned count of one pool.
    pub fn returned(&self, rank: RankTier, is_shadow: bool) -> u64 {
        self.returns[rank.index()][is_shadow as usize]
    }
}

/// Progression counters of every hunter plus unclaimed arise refunds.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProgressBook {
    seasons: BTreeMap<(SeasonId, Address), SeasonProgress>,
    refundable_stone: BTreeMap<Address, Amount>,
}

impl ProgressBook {
    /// Create an empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Counters of a hunter in a season (zeroed if none).
    pub fn progress(&self, season_id: SeasonId, hunter: &Address) -> SeasonProgress {
        self.seasons
            .get(&(season_id, *hunter))
            .copied()
            .unwrap_or_default()
    }

    pub(crate) fn progress_mut(&mut self, season_id: SeasonId, hunter: Address) -> &mut SeasonProgress {
        self.seasons.entry((season_id, hunter)).or_default()
    }

    /// Stone credited from unused arise attempts.
    pub fn refundable_stone(&self, hunter: &Address) -> Amount {
        self.refundable_stone.get(hunter).copied().unwrap_or(0)
    }

    /// Refund credit after adding `amount`, or `None` on overflow.
    pub(crate) fn credited(&self, hunter: &Address, amount: Amount) -> Option<Amount> {
        self.refundable_stone(hunter).checked_add(amount)
    }

    pub(crate) fn set_refundable(&mut self, hunter: Address, amount: Amount) {
        if amount == 0 {
            self.refundable_stone.remove(&hunter);
        } else {
            self.refundable_stone.insert(hunter, amount);
        }
    }

    /// Feed counters and refund credits into a state hasher.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        for ((season_id, hunter), progress) in &self.seasons {
            hasher.update_u32(*season_id);
            hasher.update_address(hunter);
            for count in progress.upgrades.iter().chain(progress.arises.iter()) {
                hasher.update_u64(*count);
            }
            for pair in &progress.returns {
                hasher.update_u64(pair[0]);
                hasher.update_u64(pair[1]);
            }
        }
        for (hunter, amount) in &self.refundable_stone {
            hasher.update_address(hunter);
            hasher.update_u128(*amount);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_defaults_to_zero() {
        let book = ProgressBook::new();
        let hunter = Address::new([3; 20]);
        assert_eq!(book.progress(1, &hunter), SeasonProgress::default());
        assert_eq!(book.refundable_stone(&hunter), 0);
    }

    #[test]
    fn test_refund_credit() {
        let mut book = ProgressBook::new();
        let hunter = Address::new([3; 20]);

        let credit = book.credited(&hunter, 40).unwrap();
        book.set_refundable(hunter, credit);
        assert_eq!(book.refundable_stone(&hunter), 40);

        book.set_refundable(hunter, Amount::MAX);
        assert!(book.credited(&hunter, 1).is_none());

        book.set_refundable(hunter, 0);
        assert_eq!(book.refundable_stone(&hunter), 0);
    }

    #[test]
    fn test_season_counters_are_separate() {
        let mut book = ProgressBook::new();
        let hunter = Address::new([3; 20]);
        book.progress_mut(1, hunter).upgrades[0] += 10;
        book.progress_mut(1, hunter).returns[RankTier::B.index()][1] += 4;

        assert_eq!(book.progress(1, &hunter).upgrades[0], 10);
        assert_eq!(book.progress(1, &hunter).returned(RankTier::B, true), 4);
        assert_eq!(book.progress(2, &hunter).upgrades[0], 0);
    }
}
