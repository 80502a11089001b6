//! Economy Configuration
//!
//! Operator-tunable tables indexed by rank tier. Read-heavy, write-rare:
//! the engine reads them on every call and only admin setters replace them.
//! The same validation runs when a config is loaded and when a setter is
//! called, so a running engine never holds a table a setter would reject.

use std::path::Path;
use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::core::id::Amount;
use crate::core::random::PERCENTAGE_SCALE;
use crate::core::rank::{RankTable, RankTier, ARISE_TIER_COUNT, RANK_COUNT};
use crate::error::EconomyError;

/// Environment variable holding the config file path.
pub const CONFIG_ENV_VAR: &str = "HUNTER_ECONOMY_CONFIG";

// =============================================================================
// GATE TABLES
// =============================================================================

/// Reward rolls for clearing a gate of one rank.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardDistribution {
    /// Monster rolls per monster rank (drawn from that rank's normal pool).
    pub monsters: RankTable<u32>,
    /// Season pack rolls.
    pub season_packs: u32,
}

impl RewardDistribution {
    /// Create a distribution.
    pub const fn new(monsters: RankTable<u32>, season_packs: u32) -> Self {
        Self { monsters, season_packs }
    }

    /// Total rolls, which is also the signature count a clear needs.
    pub fn total(&self) -> u64 {
        self.monsters.iter().map(|c| *c as u64).sum::<u64>() + self.season_packs as u64
    }
}

/// Gate tables.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateConfig {
    /// Gate duration in blocks, by gate rank.
    pub blocks_per_rank: RankTable<u64>,
    /// Concurrent gates per season, by hunter rank.
    pub slots_per_hunter_rank: RankTable<u32>,
    /// Reward rolls, by gate rank.
    pub rewards_per_rank: RankTable<RewardDistribution>,
    /// Essence stone paid on clear, by gate rank.
    pub stone_reward_per_rank: RankTable<Amount>,
    /// Blocks skipped per essence stone when boosting or clearing early.
    pub boost_block_count: u64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            blocks_per_rank: [24, 48, 96, 192, 384, 768],
            slots_per_hunter_rank: [2, 2, 3, 3, 4, 5],
            rewards_per_rank: [
                RewardDistribution::new([2, 0, 0, 0, 0, 0], 0),
                RewardDistribution::new([1, 2, 0, 0, 0, 0], 0),
                RewardDistribution::new([0, 1, 2, 0, 0, 0], 1),
                RewardDistribution::new([0, 0, 1, 2, 0, 0], 1),
                RewardDistribution::new([0, 0, 0, 1, 2, 0], 1),
                RewardDistribution::new([0, 0, 0, 0, 1, 2], 2),
            ],
            stone_reward_per_rank: [0, 1, 2, 4, 8, 16],
            boost_block_count: 6,
        }
    }
}

// =============================================================================
// PROGRESSION TABLES
// =============================================================================

/// Cost of upgrading one monster out of a rank.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeRequirement {
    /// Source monsters burned per upgrade.
    pub monsters: u64,
    /// Essence stone burned per upgrade.
    pub stone: Amount,
}

/// Cost and odds of one arise attempt into a tier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AriseRequirement {
    /// Essence stone per attempt.
    pub stone: Amount,
    /// Success chance, `PERCENTAGE_SCALE` = 100%.
    pub percentage: u64,
}

/// Essence stone paid per returned monster of a rank.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnYield {
    /// Yield for a normal monster.
    pub normal: Amount,
    /// Yield for a shadow monster.
    pub shadow: Amount,
}

impl ReturnYield {
    /// Yield for one pool.
    pub fn for_pool(&self, is_shadow: bool) -> Amount {
        if is_shadow {
            self.shadow
        } else {
            self.normal
        }
    }
}

/// Upgrade, arise and return tables.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionConfig {
    /// Upgrade cost, by source rank (S entry unused).
    pub upgrade: RankTable<UpgradeRequirement>,
    /// Arise cost and odds, by arise tier (B, A, S).
    pub arise: [AriseRequirement; ARISE_TIER_COUNT],
    /// Return yield, by rank.
    pub return_yield: RankTable<ReturnYield>,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        let upgrade = |monsters, stone| UpgradeRequirement { monsters, stone };
        let arise = |stone, percentage| AriseRequirement { stone, percentage };
        let yields = |normal, shadow| ReturnYield { normal, shadow };
        Self {
            upgrade: [
                upgrade(5, 1),
                upgrade(5, 2),
                upgrade(5, 4),
                upgrade(5, 8),
                upgrade(5, 16),
                upgrade(0, 0),
            ],
            arise: [arise(10, 30_00000), arise(20, 20_00000), arise(40, 10_00000)],
            return_yield: [
                yields(1, 0),
                yields(2, 0),
                yields(4, 0),
                yields(8, 20),
                yields(16, 40),
                yields(32, 80),
            ],
        }
    }
}

/// Informational score tables.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreConfig {
    /// Score per normal monster, by rank.
    pub normal: RankTable<u64>,
    /// Score per shadow monster, by rank (entries below B ignored).
    pub shadow: RankTable<u64>,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            normal: [1, 2, 4, 8, 16, 32],
            shadow: [0, 0, 0, 24, 48, 96],
        }
    }
}

// =============================================================================
// ECONOMY CONFIG
// =============================================================================

/// Complete engine configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomyConfig {
    /// Gate tables.
    pub gate: GateConfig,
    /// Progression tables.
    pub progression: ProgressionConfig,
    /// Score tables.
    pub scores: ScoreConfig,
}

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// Config is not valid JSON for `EconomyConfig`.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    /// Config parsed but a table is invalid.
    #[error("invalid config: {0}")]
    Invalid(#[from] EconomyError),
}

impl EconomyConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Load from the file named by `HUNTER_ECONOMY_CONFIG`, or defaults
    /// when the variable is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) => Self::from_file(path),
            Err(_) => Ok(Self::default()),
        }
    }

    /// Apply every setter rule to the whole config.
    pub fn validate(&self) -> Result<(), EconomyError> {
        let gate = &self.gate;
        validate_blocks(&gate.blocks_per_rank)?;
        validate_slots(&gate.slots_per_hunter_rank)?;
        validate_rewards(&gate.rewards_per_rank)?;
        validate_boost_block_count(gate.boost_block_count)?;

        let progression = &self.progression;
        validate_upgrade(&progression.upgrade)?;
        validate_arise(&progression.arise)?;
        Ok(())
    }
}

// =============================================================================
// TABLE VALIDATION
// =============================================================================

fn rank_table<T: Copy>(values: &[T], what: &'static str) -> Result<RankTable<T>, EconomyError> {
    values.try_into().map_err(|_| EconomyError::InvalidArgument(what))
}

/// Gate durations: one per rank, all positive.
pub fn validate_blocks(values: &[u64]) -> Result<RankTable<u64>, EconomyError> {
    let table = rank_table(values, "block table must have one entry per rank")?;
    if table.contains(&0) {
        return Err(EconomyError::InvalidArgument("gate duration must be positive"));
    }
    Ok(table)
}

/// Slot capacities: one per rank, all positive.
pub fn validate_slots(values: &[u32]) -> Result<RankTable<u32>, EconomyError> {
    let table = rank_table(values, "slot table must have one entry per rank")?;
    if table.contains(&0) {
        return Err(EconomyError::InvalidSlot);
    }
    Ok(table)
}

/// Reward distributions: one per rank, each with at least one roll.
pub fn validate_rewards(values: &[RewardDistribution]) -> Result<RankTable<RewardDistribution>, EconomyError> {
    let table = rank_table(values, "reward table must have one entry per rank")?;
    if table.iter().any(|d| d.total() == 0) {
        return Err(EconomyError::InvalidArgument("gate reward must roll at least once"));
    }
    Ok(table)
}

/// Essence stone rewards: one per rank.
pub fn validate_stone_rewards(values: &[Amount]) -> Result<RankTable<Amount>, EconomyError> {
    rank_table(values, "stone reward table must have one entry per rank")
}

/// Boost block count: positive.
pub fn validate_boost_block_count(value: u64) -> Result<u64, EconomyError> {
    if value == 0 {
        return Err(EconomyError::InvalidArgument("boost block count must be positive"));
    }
    Ok(value)
}

/// Upgrade costs: one per rank, every rank below S burns at least one monster.
pub fn validate_upgrade(values: &[UpgradeRequirement]) -> Result<RankTable<UpgradeRequirement>, EconomyError> {
    let table = rank_table(values, "upgrade table must have one entry per rank")?;
    let upgradable = &table[..RANK_COUNT - 1];
    if upgradable.iter().any(|r| r.monsters == 0) {
        return Err(EconomyError::InvalidArgument("upgrade must burn at least one monster"));
    }
    Ok(table)
}

/// Arise costs: one per arise tier, percentage in `1..=PERCENTAGE_SCALE`.
pub fn validate_arise(values: &[AriseRequirement]) -> Result<[AriseRequirement; ARISE_TIER_COUNT], EconomyError> {
    let table: [AriseRequirement; ARISE_TIER_COUNT] = values
        .try_into()
        .map_err(|_| EconomyError::InvalidArgument("arise table must have one entry per arise tier"))?;
    if table.iter().any(|r| r.percentage == 0 || r.percentage > PERCENTAGE_SCALE) {
        return Err(EconomyError::InvalidArgument("arise percentage out of range"));
    }
    Ok(table)
}

/// Return yields: one per rank. Shadow yields below B are never paid.
pub fn validate_return_yield(values: &[ReturnYield]) -> Result<RankTable<ReturnYield>, EconomyError> {
    let mut table = rank_table(values, "return table must have one entry per rank")?;
    for rank in RankTier::ALL.iter().filter(|r| !r.allows_shadow()) {
        table[rank.index()].shadow = 0;
    }
    Ok(table)
}

// =============================================================================
// TESTS
// =============================================================================
