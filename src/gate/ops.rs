//! Gate Operations
//!
//! `enter_gate`, `boost_gate`, `clear_gate` and the gate table setters.

use tracing::{debug, info};

use crate::config::{
    validate_blocks, validate_boost_block_count, validate_rewards, validate_slots,
    validate_stone_rewards, RewardDistribution,
};
use crate::core::id::{Address, Amount, GateId, MonsterId, SeasonId};
use crate::core::rank::{RankTable, RankTier};
use crate::engine::{CallContext, Engine};
use crate::error::EconomyError;
use crate::events::{ConfigTable, EventData};
use crate::ledger::{Asset, LedgerBatch};
use crate::oracle::OracleSignature;
use super::reward::{roll_gate_rewards, GateRewards};
use super::state::{Gate, HunterSeasonGates};

/// Outcome of a successful clear.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClearedGate {
    /// Cleared gate.
    pub gate_id: GateId,
    /// Essence stone burned to skip the remaining wait.
    pub used_stone: Amount,
    /// Monsters and season packs minted.
    pub rewards: GateRewards,
    /// Essence stone minted.
    pub stone_reward: Amount,
}

impl Engine {
    // =========================================================================
    // Hunter operations
    // =========================================================================

    /// Enter a gate of `rank` in a running season. Buys a key through the
    /// shop when the hunter holds none.
    pub fn enter_gate(
        &mut self,
        call: CallContext,
        season_id: SeasonId,
        rank: RankTier,
    ) -> Result<GateId, EconomyError> {
        let hunter = call.sender;
        if !self.external.seasons.is_season_active(season_id, call.block) {
            return Err(EconomyError::InvalidSeasonId(season_id));
        }

        let hunter_rank = self.external.ranks.hunter_rank(season_id, &hunter);
        if rank > hunter_rank {
            return Err(EconomyError::InvalidRankType(rank));
        }

        let available = self.available_slot(season_id, &hunter);
        let using = self.gates.using_slot(season_id, &hunter);
        if using >= available {
            return Err(EconomyError::ExceedGateSlot { using, available });
        }

        let end_block = call
            .block
            .checked_add(self.config.gate.blocks_per_rank[rank.index()])
            .ok_or(EconomyError::ArithmeticOverflow)?;

        let key = Asset::GateKey(rank);
        let mut batch = LedgerBatch::new();
        let bought_key = self.external.ledger.balance_of(&hunter, key) == 0;
        if bought_key {
            self.external.shop.buy_key(&hunter, rank, 1, &mut batch)?;
        }
        batch.burn(hunter, key, 1);
        self.apply_batch(&batch)?;

        let gate_id = self.gates.open(season_id, rank, hunter, call.block, end_block);
        info!(
            "Gate {} ({}) entered by {} in season {}, ends at block {}",
            gate_id,
            rank,
            hunter.short(),
            season_id,
            end_block
        );
        self.emit(call, EventData::GateCreated {
            gate_id,
            hunter,
            season_id,
            rank,
            start_block: call.block,
            end_block,
            bought_key,
        });
        Ok(gate_id)
    }

    /// Essence stone a clear at `block` would burn.
    pub fn required_stone_for_clear(&self, gate_id: GateId, block: u64) -> Result<u64, EconomyError> {
        let gate = self.gates.gate(gate_id).ok_or(EconomyError::InvalidGateId(gate_id))?;
        Ok(gate.required_stone(block, self.config.gate.boost_block_count))
    }

    /// Burn `stone` essence stone to pull the gate's end block earlier by
    /// `stone * boost_block_count` blocks. Returns the new end block.
    pub fn boost_gate(&mut self, call: CallContext, gate_id: GateId, stone: u64) -> Result<u64, EconomyError> {
        let gate = self.owned_open_gate(&call.sender, gate_id)?;
        let boost = self.config.gate.boost_block_count;

        if stone == 0 {
            return Err(EconomyError::InvalidArgument("boost stone must be positive"));
        }
        if stone > gate.required_stone(call.block, boost) {
            return Err(EconomyError::InvalidArgument("boost stone exceeds required stone"));
        }

        let end_block = gate
            .end_block
            .saturating_sub(stone.saturating_mul(boost))
            .max(gate.start_block);

        let mut batch = LedgerBatch::new();
        batch.burn(call.sender, Asset::EssenceStone, stone as Amount);
        self.apply_batch(&batch)?;

        self.gates.boost(gate_id, end_block);
        info!(
            "Gate {} boosted by {} with {} stone, ends at block {}",
            gate_id,
            call.sender.short(),
            stone,
            end_block
        );
        self.emit(call, EventData::GateBoosted {
            gate_id,
            hunter: call.sender,
            used_stone: stone as Amount,
            end_block,
        });
        Ok(end_block)
    }

    /// Clear a gate: burn the stone still required, roll rewards from one
    /// signature per reward slot, mint them and free the slot.
    pub fn clear_gate(
        &mut self,
        call: CallContext,
        gate_id: GateId,
        signatures: &[OracleSignature],
    ) -> Result<ClearedGate, EconomyError> {
        let hunter = call.sender;
        let gate = self.owned_open_gate(&hunter, gate_id)?;
        let used_stone = gate.required_stone(call.block, self.config.gate.boost_block_count) as Amount;

        let distribution: RewardDistribution = self.config.gate.rewards_per_rank[gate.rank.index()];
        let expected = distribution.total();
        if signatures.len() as u64 != expected {
            return Err(EconomyError::InvalidGateSignature {
                expected,
                got: signatures.len() as u64,
            });
        }

        let attestation = self.oracle.verify(&hunter, signatures)?;

        let pools: RankTable<&[MonsterId]> =
            std::array::from_fn(|i| self.registry.pool(RankTier::ALL[i], false));
        let pack_pool = self.external.seasons.season_pack_ids(gate.season_id);
        let rewards = roll_gate_rewards(
            &distribution,
            &pools,
            pack_pool,
            gate.season_id,
            attestation.values(),
        )?;
        let stone_reward = self.config.gate.stone_reward_per_rank[gate.rank.index()];

        let mut batch = LedgerBatch::new();
        batch.burn(hunter, Asset::EssenceStone, used_stone);
        rewards.monsters.stage_mints(&mut batch, hunter, Asset::Monster);
        rewards.season_packs.stage_mints(&mut batch, hunter, Asset::SeasonPack);
        batch.mint(hunter, Asset::EssenceStone, stone_reward);
        self.apply_batch(&batch)?;

        self.oracle.commit(&attestation);
        self.gates.close(gate_id);

        debug!(
            "Gate {} rolled {} monster ids, {} pack ids",
            gate_id,
            rewards.monsters.distinct(),
            rewards.season_packs.distinct()
        );
        info!(
            "Gate {} ({}) cleared by {}, used {} stone",
            gate_id,
            gate.rank,
            hunter.short(),
            used_stone
        );
        self.emit(call, EventData::GateCleared {
            gate_id,
            hunter,
            season_id: gate.season_id,
            rank: gate.rank,
            used_stone,
            signatures: signatures.to_vec(),
            monster_rewards: rewards.monsters.clone(),
            season_pack_rewards: rewards.season_packs.clone(),
            stone_reward,
        });

        Ok(ClearedGate {
            gate_id,
            used_stone,
            rewards,
            stone_reward,
        })
    }

    fn owned_open_gate(&self, hunter: &Address, gate_id: GateId) -> Result<Gate, EconomyError> {
        let gate = self
            .gates
            .gate(gate_id)
            .filter(|g| g.hunter == *hunter)
            .ok_or(EconomyError::InvalidGateId(gate_id))?;
        if gate.cleared {
            return Err(EconomyError::AlreadyClearGate(gate_id));
        }
        Ok(gate.clone())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Look up a gate.
    pub fn gate(&self, gate_id: GateId) -> Option<&Gate> {
        self.gates.gate(gate_id)
    }

    /// A hunter's gates in a season.
    pub fn hunter_gates(&self, season_id: SeasonId, hunter: &Address) -> HunterSeasonGates {
        self.gates.hunter(season_id, hunter)
    }

    /// Slots a hunter uses in a season.
    pub fn using_slot(&self, season_id: SeasonId, hunter: &Address) -> u32 {
        self.gates.using_slot(season_id, hunter)
    }

    /// Slot capacity of a hunter's current rank in a season.
    pub fn available_slot(&self, season_id: SeasonId, hunter: &Address) -> u32 {
        let hunter_rank = self.external.ranks.hunter_rank(season_id, hunter);
        self.config.gate.slots_per_hunter_rank[hunter_rank.index()]
    }

    /// Slots a hunter can still fill in a season.
    pub fn remaining_slot(&self, season_id: SeasonId, hunter: &Address) -> u32 {
        self.available_slot(season_id, hunter)
            .saturating_sub(self.using_slot(season_id, hunter))
    }

    /// Gates a hunter cleared in a season.
    pub fn gate_clear_count(&self, season_id: SeasonId, hunter: &Address) -> u64 {
        self.gates.hunter(season_id, hunter).clear_count
    }

    // =========================================================================
    // Admin setters
    // =========================================================================

    /// Replace gate durations (operator only).
    pub fn set_gate_block_per_rank(&mut self, call: CallContext, blocks: &[u64]) -> Result<(), EconomyError> {
        self.roles.ensure_operator(&call.sender)?;
        self.config.gate.blocks_per_rank = validate_blocks(blocks)?;
        self.table_updated(call, ConfigTable::GateBlockPerRank);
        Ok(())
    }

    /// Replace slot capacities (operator only).
    pub fn set_slot_per_hunter_rank(&mut self, call: CallContext, slots: &[u32]) -> Result<(), EconomyError> {
        self.roles.ensure_operator(&call.sender)?;
        self.config.gate.slots_per_hunter_rank = validate_slots(slots)?;
        self.table_updated(call, ConfigTable::SlotPerHunterRank);
        Ok(())
    }

    /// Replace reward distributions (operator only).
    pub fn set_gate_reward_per_rank(
        &mut self,
        call: CallContext,
        rewards: &[RewardDistribution],
    ) -> Result<(), EconomyError> {
        self.roles.ensure_operator(&call.sender)?;
        self.config.gate.rewards_per_rank = validate_rewards(rewards)?;
        self.table_updated(call, ConfigTable::GateRewardPerRank);
        Ok(())
    }

    /// Replace essence stone rewards (operator only).
    pub fn set_gate_stone_reward_per_rank(&mut self, call: CallContext, stone: &[Amount]) -> Result<(), EconomyError> {
        self.roles.ensure_operator(&call.sender)?;
        self.config.gate.stone_reward_per_rank = validate_stone_rewards(stone)?;
        self.table_updated(call, ConfigTable::GateStoneRewardPerRank);
        Ok(())
    }

    /// Replace the boost block count (operator only).
    pub fn set_boost_block_count(&mut self, call: CallContext, count: u64) -> Result<(), EconomyError> {
        self.roles.ensure_operator(&call.sender)?;
        self.config.gate.boost_block_count = validate_boost_block_count(count)?;
        self.table_updated(call, ConfigTable::BoostBlockCount);
        Ok(())
    }
}
