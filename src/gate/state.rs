//! Gate State
//!
//! Gate entities and the per-hunter, per-season slot bookkeeping.
//! Gates are never deleted; a cleared gate stays as history.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};

use crate::core::amount::ceil_div;
use crate::core::hash::StateHasher;
use crate::core::id::{Address, GateId, SeasonId};
use crate::core::rank::RankTier;

/// Lifecycle of a gate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateStatus {
    /// Entered, waiting to be cleared.
    Created,
    /// Entered and shortened with essence stone.
    Boosted,
    /// Rewards paid out.
    Cleared,
}

/// A dungeon instance entered by a hunter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gate {
    /// Global 1-based id.
    pub id: GateId,
    /// Season the gate was entered in.
    pub season_id: SeasonId,
    /// Gate rank.
    pub rank: RankTier,
    /// Owner.
    pub hunter: Address,
    /// Block of entry.
    pub start_block: u64,
    /// Block after which the gate clears for free.
    pub end_block: u64,
    /// Rewards paid out.
    pub cleared: bool,
    /// Blocks removed from the wait by boosting.
    pub boosted_blocks: u64,
}

impl Gate {
    /// Current lifecycle state.
    pub fn status(&self) -> GateStatus {
        if self.cleared {
            GateStatus::Cleared
        } else if self.boosted_blocks > 0 {
            GateStatus::Boosted
        } else {
            GateStatus::Created
        }
    }

    /// Blocks left until `end_block` (zero once elapsed).
    pub fn remaining_blocks(&self, block: u64) -> u64 {
        self.end_block.saturating_sub(block)
    }

    /// Essence stone needed to clear at `block`:
    /// `ceil(remaining / boost_block_count)`.
    pub fn required_stone(&self, block: u64, boost_block_count: u64) -> u64 {
        ceil_div(self.remaining_blocks(block), boost_block_count)
    }
}

/// A hunter's gates in one season.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HunterSeasonGates {
    /// Every gate entered this season, in entry order.
    pub gate_ids: Vec<GateId>,
    /// Gates entered and not yet cleared. Its length is the using-slot count.
    pub active: Vec<GateId>,
    /// Gates cleared this season.
    pub clear_count: u64,
}

impl HunterSeasonGates {
    /// Slots in use.
    pub fn using_slot(&self) -> u32 {
        self.active.len() as u32
    }
}

/// All gates plus per-hunter slot records.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GateBook {
    next_id: GateId,
    gates: BTreeMap<GateId, Gate>,
    hunters: BTreeMap<(SeasonId, Address), HunterSeasonGates>,
}

impl Default for GateBook {
    fn default() -> Self {
        Self::new()
    }
}

impl GateBook {
    /// Create an empty book. The first gate id is 1.
    pub fn new() -> Self {
        Self {
            next_id: 1,
            gates: BTreeMap::new(),
            hunters: BTreeMap::new(),
        }
    }

    /// Id the next entered gate will get.
    pub fn next_gate_id(&self) -> GateId {
        self.next_id
    }

    /// Look up a gate.
    pub fn gate(&self, gate_id: GateId) -> Option<&Gate> {
        self.gates.get(&gate_id)
    }

    /// Number of gates ever entered.
    pub fn len(&self) -> usize {
        self.gates.len()
    }

    /// True when no gate was ever entered.
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    /// A hunter's record for a season (empty if none).
    pub fn hunter(&self, season_id: SeasonId, hunter: &Address) -> HunterSeasonGates {
        self.hunters
            .get(&(season_id, *hunter))
            .cloned()
            .unwrap_or_default()
    }

    /// Slots in use by a hunter in a season.
    pub fn using_slot(&self, season_id: SeasonId, hunter: &Address) -> u32 {
        self.hunters
            .get(&(season_id, *hunter))
            .map(|h| h.using_slot())
            .unwrap_or(0)
    }

    /// Record a new gate and take a slot. Returns its id.
    pub fn open(
        &mut self,
        season_id: SeasonId,
        rank: RankTier,
        hunter: Address,
        start_block: u64,
        end_block: u64,
    ) -> GateId {
        let id = self.next_id;
        self.next_id += 1;

        self.gates.insert(
            id,
            Gate {
                id,
                season_id,
                rank,
                hunter,
                start_block,
                end_block,
                cleared: false,
                boosted_blocks: 0,
            },
        );
        let record = self.hunters.entry((season_id, hunter)).or_default();
        record.gate_ids.push(id);
        record.active.push(id);
        id
    }

    /// Pull a gate's end block earlier.
    pub fn boost(&mut self, gate_id: GateId, new_end_block: u64) {
        if let Some(gate) = self.gates.get_mut(&gate_id) {
            let saved = gate.end_block.saturating_sub(new_end_block);
            gate.end_block = new_end_block;
            gate.boosted_blocks += saved;
        }
    }

    /// Mark a gate cleared and free its slot.
    pub fn close(&mut self, gate_id: GateId) {
        let Some(gate) = self.gates.get_mut(&gate_id) else {
            return;
        };
        gate.cleared = true;
        let key = (gate.season_id, gate.hunter);
        if let Some(record) = self.hunters.get_mut(&key) {
            record.active.retain(|id| *id != gate_id);
            record.clear_count += 1;
        }
    }

    /// Feed every gate into a state hasher.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_u64(self.next_id);
        for gate in self.gates.values() {
            hasher.update_u64(gate.id);
            hasher.update_u32(gate.season_id);
            hasher.update_u8(gate.rank as u8);
            hasher.update_address(&gate.hunter);
            hasher.update_u64(gate.start_block);
            hasher.update_u64(gate.end_block);
            hasher.update_bool(gate.cleared);
        }
    }
}
