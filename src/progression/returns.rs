//! Return
//!
//! Liquidate monsters for essence stone at a fixed yield per `(rank, shadow)`.
//! A call may carry thousands of ids, so counters are kept per pool, never
//! per id.

use serde::{Serialize, Deserialize};
use tracing::info;

use crate::config::{validate_return_yield, ReturnYield};
use crate::core::amount::checked_sum;
use crate::core::id::{Address, Amount, MonsterId, SeasonId};
use crate::core::rank::RankTier;
use crate::engine::{CallContext, Engine};
use crate::error::EconomyError;
use crate::events::{ConfigTable, EventData, ReturnedGroup};
use crate::ledger::{Asset, LedgerBatch};
use crate::registry::PoolKey;

/// Monsters of one `(rank, shadow)` pool to return.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnEntry {
    /// Rank of every id.
    pub rank: RankTier,
    /// Shadow pool flag.
    pub is_shadow: bool,
    /// Monster ids.
    pub ids: Vec<MonsterId>,
    /// Amount per id.
    pub amounts: Vec<Amount>,
}

impl Engine {
    /// Return monsters of one pool. Returns the stone minted.
    pub fn return_monster(
        &mut self,
        call: CallContext,
        rank: RankTier,
        ids: &[MonsterId],
        amounts: &[Amount],
        is_shadow: bool,
    ) -> Result<Amount, EconomyError> {
        let entry = ReturnEntry {
            rank,
            is_shadow,
            ids: ids.to_vec(),
            amounts: amounts.to_vec(),
        };
        self.return_monster_batch(call, std::slice::from_ref(&entry))
    }

    /// Return monsters of several pools in one call. Every entry is
    /// validated before anything is burned. Returns the stone minted.
    pub fn return_monster_batch(&mut self, call: CallContext, entries: &[ReturnEntry]) -> Result<Amount, EconomyError> {
        let hunter = call.sender;
        if entries.is_empty() {
            return Err(EconomyError::InvalidArgument("empty return batch"));
        }

        let mut groups = Vec::with_capacity(entries.len());
        for entry in entries {
            groups.push(self.price_return(entry)?);
        }
        let stone = checked_sum(groups.iter().map(|g| g.stone))?;

        let season_id = self.progress_season(call.block);
        let mut progress = self.progress.progress(season_id, &hunter);
        for group in &groups {
            let count = &mut progress.returns[group.rank.index()][group.is_shadow as usize];
            *count = count
                .checked_add(group.monster_amount)
                .ok_or(EconomyError::ArithmeticOverflow)?;
        }

        let mut batch = LedgerBatch::new();
        for entry in entries {
            for (id, amount) in entry.ids.iter().zip(&entry.amounts) {
                batch.burn(hunter, Asset::Monster(*id), *amount);
            }
        }
        batch.mint(hunter, Asset::EssenceStone, stone);
        self.apply_batch(&batch)?;
        *self.progress.progress_mut(season_id, hunter) = progress;

        info!(
            "{} returned {} monsters in {} groups for {} stone",
            hunter.short(),
            groups.iter().map(|g| g.monster_amount as u128).sum::<u128>(),
            groups.len(),
            stone
        );
        self.emit(call, EventData::MonsterReturned { hunter, groups, stone });
        Ok(stone)
    }

    fn price_return(&self, entry: &ReturnEntry) -> Result<ReturnedGroup, EconomyError> {
        if entry.ids.is_empty() || entry.ids.len() != entry.amounts.len() {
            return Err(EconomyError::InvalidArgument("return ids and amounts must match"));
        }
        PoolKey::new(entry.rank, entry.is_shadow).validate()?;
        if entry.amounts.contains(&0) {
            return Err(EconomyError::InvalidMonster);
        }
        if entry
            .ids
            .iter()
            .any(|id| !self.registry.contains(entry.rank, entry.is_shadow, *id))
        {
            return Err(EconomyError::InvalidMonster);
        }

        let total = checked_sum(entry.amounts.iter().copied())?;
        let monster_amount = u64::try_from(total).map_err(|_| EconomyError::ArithmeticOverflow)?;
        let unit = self.config.progression.return_yield[entry.rank.index()].for_pool(entry.is_shadow);
        let stone = total.checked_mul(unit).ok_or(EconomyError::ArithmeticOverflow)?;

        Ok(ReturnedGroup {
            rank: entry.rank,
            is_shadow: entry.is_shadow,
            monster_amount,
            stone,
        })
    }

    /// Monsters a hunter returned from `(rank, is_shadow)` in a season.
    pub fn return_count(&self, season_id: SeasonId, hunter: &Address, rank: RankTier, is_shadow: bool) -> u64 {
        self.progress.progress(season_id, hunter).returned(rank, is_shadow)
    }

    /// Replace return yields (operator only).
    pub fn set_return_yield(&mut self, call: CallContext, yields: &[ReturnYield]) -> Result<(), EconomyError> {
        self.roles.ensure_operator(&call.sender)?;
        self.config.progression.return_yield = validate_return_yield(yields)?;
        self.table_updated(call, ConfigTable::ReturnYield);
        Ok(())
    }
}
