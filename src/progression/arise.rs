//! Arise
//!
//! Evolve one monster into its linked shadow through repeated odds-based
//! attempts. Stone for every requested attempt is burned up front; attempts
//! left unused after the first success are credited back to the hunter and
//! reclaimed with [`Engine::reclaim_arise_stone`].

use serde::{Serialize, Deserialize};
use tracing::{debug, info};

use crate::config::{validate_arise, AriseRequirement};
use crate::core::amount::checked_cost;
use crate::core::id::{Address, Amount, MonsterId, SeasonId};
use crate::core::random::RandomValue;
use crate::core::rank::RankTier;
use crate::engine::{CallContext, Engine};
use crate::error::EconomyError;
use crate::events::{ConfigTable, EventData};
use crate::ledger::{Asset, LedgerBatch};
use crate::oracle::OracleSignature;

/// Outcome of an arise call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AriseOutcome {
    /// Shadow monster linked to the evolving monster.
    pub next_id: MonsterId,
    /// Attempts consumed, including the successful one.
    pub arose_count: u64,
    /// True if an attempt succeeded.
    pub is_success: bool,
    /// Stone spent on consumed attempts.
    pub used_stone: Amount,
    /// Stone credited back for unused attempts.
    pub refundable_stone: Amount,
}

/// Run attempts in order until one rolls at or under `percentage`.
/// Returns `(attempts consumed, success)`.
pub fn run_attempts(values: &[RandomValue], percentage: u64) -> (u64, bool) {
    let mut attempts = 0;
    for value in values {
        attempts += 1;
        if value.roll_percentage() <= percentage {
            return (attempts, true);
        }
    }
    (attempts, false)
}

impl Engine {
    /// Attempt up to `request_amount` times to evolve `before_id` into its
    /// linked shadow of `target_rank`.
    pub fn arise(
        &mut self,
        call: CallContext,
        target_rank: RankTier,
        before_id: MonsterId,
        request_amount: u64,
        signatures: &[OracleSignature],
    ) -> Result<AriseOutcome, EconomyError> {
        let hunter = call.sender;
        let tier = target_rank
            .arise_tier()
            .ok_or(EconomyError::InvalidRankType(target_rank))?;
        if request_amount == 0 {
            return Err(EconomyError::InvalidArgument("arise request must be positive"));
        }
        let next_id = self.registry.arise_target(target_rank, before_id)?;
        if signatures.len() as u64 != request_amount {
            return Err(EconomyError::InvalidMonsterSignature {
                expected: request_amount,
                got: signatures.len() as u64,
            });
        }

        let requirement = self.config.progression.arise[tier];
        let burned_stone = checked_cost(request_amount, requirement.stone)?;

        let attestation = self.oracle.verify(&hunter, signatures)?;
        let (arose_count, is_success) = run_attempts(attestation.values(), requirement.percentage);

        let used_stone = checked_cost(arose_count, requirement.stone)?;
        let refundable_stone = burned_stone - used_stone;
        let credit = self
            .progress
            .credited(&hunter, refundable_stone)
            .ok_or(EconomyError::ArithmeticOverflow)?;
        let season_id = self.progress_season(call.block);
        let arises = self
            .progress
            .progress(season_id, &hunter)
            .arises[tier]
            .checked_add(arose_count)
            .ok_or(EconomyError::ArithmeticOverflow)?;

        let mut batch = LedgerBatch::new();
        batch.burn(hunter, Asset::EssenceStone, burned_stone);
        if is_success {
            batch.burn(hunter, Asset::Monster(before_id), 1);
            batch.mint(hunter, Asset::Monster(next_id), 1);
        }
        self.apply_batch(&batch)?;

        self.oracle.commit(&attestation);
        self.progress.set_refundable(hunter, credit);
        self.progress.progress_mut(season_id, hunter).arises[tier] = arises;

        debug!(
            "Arise {} -> {}: {} of {} attempts, success {}",
            before_id, next_id, arose_count, request_amount, is_success
        );
        info!(
            "{} arise into {} {}, used {} stone, {} refundable",
            hunter.short(),
            target_rank,
            if is_success { "succeeded" } else { "failed" },
            used_stone,
            refundable_stone
        );
        self.emit(call, EventData::MonsterArose {
            hunter,
            target_rank,
            before_id,
            next_id,
            arose_count,
            used_stone,
            refundable_stone,
            is_success,
        });

        Ok(AriseOutcome {
            next_id,
            arose_count,
            is_success,
            used_stone,
            refundable_stone,
        })
    }

    /// Mint the hunter's whole arise refund credit back as essence stone.
    pub fn reclaim_arise_stone(&mut self, call: CallContext) -> Result<Amount, EconomyError> {
        let hunter = call.sender;
        let amount = self.progress.refundable_stone(&hunter);
        if amount == 0 {
            return Err(EconomyError::InvalidArgument("no arise stone to reclaim"));
        }

        let mut batch = LedgerBatch::new();
        batch.mint(hunter, Asset::EssenceStone, amount);
        self.apply_batch(&batch)?;

        self.progress.set_refundable(hunter, 0);
        info!("{} reclaimed {} arise stone", hunter.short(), amount);
        self.emit(call, EventData::AriseStoneReclaimed { hunter, amount });
        Ok(amount)
    }

    /// Arise attempts a hunter consumed into `target_rank` in a season.
    pub fn arise_count(&self, season_id: SeasonId, hunter: &Address, target_rank: RankTier) -> u64 {
        target_rank
            .arise_tier()
            .map(|tier| self.progress.progress(season_id, hunter).arises[tier])
            .unwrap_or(0)
    }

    /// Unreclaimed arise stone of a hunter.
    pub fn refundable_stone(&self, hunter: &Address) -> Amount {
        self.progress.refundable_stone(hunter)
    }

    /// Replace arise costs and odds (operator only).
    pub fn set_arise_requirements(
        &mut self,
        call: CallContext,
        requirements: &[AriseRequirement],
    ) -> Result<(), EconomyError> {
        self.roles.ensure_operator(&call.sender)?;
        self.config.progression.arise = validate_arise(requirements)?;
        self.table_updated(call, ConfigTable::AriseRequirements);
        Ok(())
    }
}
