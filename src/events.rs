//! Economy Events
//!
//! Every committed call appends one or more events to the engine's log.
//! Events carry enough detail to audit a call after the fact, including the
//! signatures that produced its randomness.

use serde::{Serialize, Deserialize};

use crate::core::id::{Address, Amount, GateId, MonsterId, SeasonId};
use crate::core::rank::RankTier;
use crate::gate::reward::RewardSet;
use crate::oracle::OracleSignature;

/// Admin table that was replaced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigTable {
    /// Gate duration per rank.
    GateBlockPerRank,
    /// Slots per hunter rank.
    SlotPerHunterRank,
    /// Gate reward rolls per rank.
    GateRewardPerRank,
    /// Essence stone reward per gate rank.
    GateStoneRewardPerRank,
    /// Boost block count.
    BoostBlockCount,
    /// Upgrade requirements.
    UpgradeRequirements,
    /// Arise requirements.
    AriseRequirements,
    /// Return yields.
    ReturnYield,
    /// Score tables.
    Scores,
}

/// Stone paid out for one `(rank, shadow)` group of a return call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnedGroup {
    /// Rank of the returned monsters.
    pub rank: RankTier,
    /// Shadow pool flag.
    pub is_shadow: bool,
    /// Monsters returned.
    pub monster_amount: u64,
    /// Essence stone minted for them.
    pub stone: Amount,
}

/// Event data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventData {
    /// Monster registered.
    MonsterAdded {
        monster_id: MonsterId,
        rank: RankTier,
        is_shadow: bool,
    },

    /// Monster moved to another rank.
    MonsterRankChanged {
        monster_id: MonsterId,
        is_shadow: bool,
        old_rank: RankTier,
        new_rank: RankTier,
    },

    /// Arise link set.
    AriseLinkSet {
        next_rank: RankTier,
        before_id: MonsterId,
        next_id: MonsterId,
    },

    /// Arise link removed (explicitly or as a side effect).
    AriseLinkRemoved {
        next_rank: RankTier,
        before_id: MonsterId,
        next_id: MonsterId,
    },

    /// Hunter entered a gate.
    GateCreated {
        gate_id: GateId,
        hunter: Address,
        season_id: SeasonId,
        rank: RankTier,
        start_block: u64,
        end_block: u64,
        bought_key: bool,
    },

    /// Hunter paid stone to shorten a gate.
    GateBoosted {
        gate_id: GateId,
        hunter: Address,
        used_stone: Amount,
        end_block: u64,
    },

    /// Hunter cleared a gate.
    GateCleared {
        gate_id: GateId,
        hunter: Address,
        season_id: SeasonId,
        rank: RankTier,
        used_stone: Amount,
        signatures: Vec<OracleSignature>,
        monster_rewards: RewardSet,
        season_pack_rewards: RewardSet,
        stone_reward: Amount,
    },

    /// Hunter upgraded monsters into the next rank.
    MonsterUpgraded {
        hunter: Address,
        source_rank: RankTier,
        request_amount: u64,
        used_stone: Amount,
        minted: RewardSet,
    },

    /// Hunter attempted an arise.
    MonsterArose {
        hunter: Address,
        target_rank: RankTier,
        before_id: MonsterId,
        next_id: MonsterId,
        arose_count: u64,
        used_stone: Amount,
        refundable_stone: Amount,
        is_success: bool,
    },

    /// Hunter reclaimed stone from unused arise attempts.
    AriseStoneReclaimed {
        hunter: Address,
        amount: Amount,
    },

    /// Hunter returned monsters for essence stone.
    MonsterReturned {
        hunter: Address,
        groups: Vec<ReturnedGroup>,
        stone: Amount,
    },

    /// Admin table replaced.
    TableUpdated {
        table: ConfigTable,
    },

    /// Attester replaced.
    AttesterChanged {
        attester: String,
    },

    /// Operator role granted.
    OperatorGranted {
        account: Address,
    },

    /// Operator role revoked.
    OperatorRevoked {
        account: Address,
    },

    /// Operator master transferred.
    OperatorMasterTransferred {
        account: Address,
    },
}

/// An event with its position in the log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomyEvent {
    /// Position in the log (0-based).
    pub sequence: u64,
    /// Block of the call that emitted it.
    pub block: u64,
    /// Account that made the call.
    pub sender: Address,
    /// Event data.
    pub data: EventData,
}

impl EconomyEvent {
    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Serialize to binary.
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    /// Deserialize from binary.
    pub fn from_bytes(data: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(data)
    }
}

/// Append-only event log.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    next_sequence: u64,
    events: Vec<EconomyEvent>,
}

impl EventLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event.
    pub fn push(&mut self, block: u64, sender: Address, data: EventData) {
        self.events.push(EconomyEvent {
            sequence: self.next_sequence,
            block,
            sender,
            data,
        });
        self.next_sequence += 1;
    }

    /// Events not yet drained.
    pub fn events(&self) -> &[EconomyEvent] {
        &self.events
    }

    /// Take all pending events. Sequence numbers keep counting.
    pub fn drain(&mut self) -> Vec<EconomyEvent> {
        std::mem::take(&mut self.events)
    }

    /// Most recent event.
    pub fn last(&self) -> Option<&EconomyEvent> {
        self.events.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hunter() -> Address {
        Address::new([5; 20])
    }

    #[test]
    fn test_sequence_survives_drain() {
        let mut log = EventLog::new();
        log.push(1, hunter(), EventData::OperatorGranted { account: hunter() });
        log.push(2, hunter(), EventData::OperatorRevoked { account: hunter() });

        let drained = log.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[1].sequence, 1);
        assert!(log.events().is_empty());

        log.push(3, hunter(), EventData::TableUpdated { table: ConfigTable::Scores });
        assert_eq!(log.last().unwrap().sequence, 2);
    }

    #[test]
    fn test_event_serialization() {
        let mut monsters = RewardSet::new();
        monsters.add(7, 2);

        let event = EconomyEvent {
            sequence: 4,
            block: 120,
            sender: hunter(),
            data: EventData::GateCleared {
                gate_id: 1,
                hunter: hunter(),
                season_id: 1,
                rank: RankTier::E,
                used_stone: 0,
                signatures: vec![OracleSignature(vec![1, 2, 3])],
                monster_rewards: monsters,
                season_pack_rewards: RewardSet::new(),
                stone_reward: 0,
            },
        };

        let json = event.to_json().unwrap();
        assert_eq!(EconomyEvent::from_json(&json).unwrap(), event);

        let bytes = event.to_bytes().unwrap();
        assert_eq!(EconomyEvent::from_bytes(&bytes).unwrap(), event);
    }
}
