//! Monster Registry
//!
//! Classifies every monster id into exactly one `(rank, shadow)` pool and
//! owns the arise graph between pools. Balances live in the token ledger;
//! the registry only knows what each id *is*.
//!
//! Pools keep insertion order, since random picks index into them.
//! Every successful mutation bumps [`MonsterRegistry::version`].

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};

use crate::core::hash::StateHasher;
use crate::core::id::MonsterId;
use crate::core::rank::{RankTier, RankTable, RANK_COUNT};
use crate::error::EconomyError;
use super::arise::AriseGraph;

/// Pool key: `(rank, is_shadow)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PoolKey {
    /// Rank tier.
    pub rank: RankTier,
    /// Shadow pool flag.
    pub is_shadow: bool,
}

impl PoolKey {
    /// Create a pool key.
    pub const fn new(rank: RankTier, is_shadow: bool) -> Self {
        Self { rank, is_shadow }
    }

    /// Shadow pools start at B.
    pub fn validate(&self) -> Result<(), EconomyError> {
        if self.is_shadow && !self.rank.allows_shadow() {
            return Err(EconomyError::InvalidRankType(self.rank));
        }
        Ok(())
    }
}

/// Classification of one monster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterInfo {
    /// Current rank.
    pub rank: RankTier,
    /// Shadow monster flag (fixed at creation).
    pub is_shadow: bool,
}

impl MonsterInfo {
    /// Pool this monster lives in.
    pub fn pool_key(&self) -> PoolKey {
        PoolKey::new(self.rank, self.is_shadow)
    }
}

/// One arise link request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AriseLink {
    /// Arise target rank (B, A or S).
    pub next_rank: RankTier,
    /// Monster that evolves.
    pub before_id: MonsterId,
    /// Shadow monster it becomes.
    pub next_id: MonsterId,
}

/// One rank reassignment request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankChange {
    /// Shadow flag the id is expected to have.
    pub is_shadow: bool,
    /// Monster to move.
    pub monster_id: MonsterId,
    /// Destination rank.
    pub new_rank: RankTier,
}

/// Registry of monster classifications, pools, scores and arise links.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MonsterRegistry {
    next_id: MonsterId,
    monsters: BTreeMap<MonsterId, MonsterInfo>,
    pools: BTreeMap<PoolKey, Vec<MonsterId>>,
    normal_scores: RankTable<u64>,
    shadow_scores: RankTable<u64>,
    arise: AriseGraph,
    version: u64,
}

impl Default for MonsterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MonsterRegistry {
    /// Create an empty registry. The first id handed out is 1.
    pub fn new() -> Self {
        Self {
            next_id: 1,
            monsters: BTreeMap::new(),
            pools: BTreeMap::new(),
            normal_scores: [0; RANK_COUNT],
            shadow_scores: [0; RANK_COUNT],
            arise: AriseGraph::default(),
            version: 0,
        }
    }

    /// Mutation counter.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Number of registered monsters.
    pub fn len(&self) -> usize {
        self.monsters.len()
    }

    /// True when no monster is registered.
    pub fn is_empty(&self) -> bool {
        self.monsters.is_empty()
    }

    // =========================================================================
    // Pools
    // =========================================================================

    /// Append a new monster to the tail of `(rank, is_shadow)`.
    pub fn add_monster(&mut self, rank: RankTier, is_shadow: bool) -> Result<MonsterId, EconomyError> {
        let key = PoolKey::new(rank, is_shadow);
        key.validate()?;

        let id = self.next_id;
        self.next_id += 1;
        self.monsters.insert(id, MonsterInfo { rank, is_shadow });
        self.pools.entry(key).or_default().push(id);
        self.version += 1;
        Ok(id)
    }

    /// Append `count` new monsters to one pool. Returns the new ids.
    pub fn add_monsters(
        &mut self,
        rank: RankTier,
        is_shadow: bool,
        count: u32,
    ) -> Result<Vec<MonsterId>, EconomyError> {
        PoolKey::new(rank, is_shadow).validate()?;
        if count == 0 {
            return Err(EconomyError::InvalidArgument("monster count must be positive"));
        }
        (0..count).map(|_| self.add_monster(rank, is_shadow)).collect()
    }

    /// Move a monster to another rank. Arise links touching it are dropped.
    /// Returns the previous rank and the dropped links.
    pub fn set_rank(
        &mut self,
        is_shadow: bool,
        monster_id: MonsterId,
        new_rank: RankTier,
    ) -> Result<(RankTier, Vec<(RankTier, MonsterId, MonsterId)>), EconomyError> {
        self.validate_rank_change(&RankChange { is_shadow, monster_id, new_rank })?;
        Ok(self.apply_rank_change(monster_id, new_rank))
    }

    /// Apply several rank moves. Every move is validated before any is applied.
    pub fn set_ranks(
        &mut self,
        changes: &[RankChange],
    ) -> Result<Vec<(RankTier, Vec<(RankTier, MonsterId, MonsterId)>)>, EconomyError> {
        if changes.is_empty() {
            return Err(EconomyError::InvalidArgument("empty rank change batch"));
        }
        for change in changes {
            self.validate_rank_change(change)?;
        }
        Ok(changes
            .iter()
            .map(|c| self.apply_rank_change(c.monster_id, c.new_rank))
            .collect())
    }

    fn validate_rank_change(&self, change: &RankChange) -> Result<(), EconomyError> {
        match self.monsters.get(&change.monster_id) {
            Some(info) if info.is_shadow == change.is_shadow => {}
            _ => return Err(EconomyError::InvalidMonsterId(change.monster_id)),
        }
        PoolKey::new(change.new_rank, change.is_shadow).validate()
    }

    fn apply_rank_change(
        &mut self,
        monster_id: MonsterId,
        new_rank: RankTier,
    ) -> (RankTier, Vec<(RankTier, MonsterId, MonsterId)>) {
        let info = self.monsters[&monster_id];
        let old_rank = info.rank;
        if old_rank == new_rank {
            return (old_rank, Vec::new());
        }

        if let Some(pool) = self.pools.get_mut(&info.pool_key()) {
            pool.retain(|id| *id != monster_id);
        }
        let moved = MonsterInfo { rank: new_rank, is_shadow: info.is_shadow };
        self.pools.entry(moved.pool_key()).or_default().push(monster_id);
        self.monsters.insert(monster_id, moved);

        let dropped = self.arise.remove_monster(monster_id);
        self.version += 1;
        (old_rank, dropped)
    }

    /// Ordered ids of a pool.
    pub fn pool(&self, rank: RankTier, is_shadow: bool) -> &[MonsterId] {
        self.pools
            .get(&PoolKey::new(rank, is_shadow))
            .map(|p| p.as_slice())
            .unwrap_or(&[])
    }

    /// Classification of a monster.
    pub fn monster_info(&self, monster_id: MonsterId) -> Option<MonsterInfo> {
        self.monsters.get(&monster_id).copied()
    }

    /// Check if a monster lives in `(rank, is_shadow)`.
    pub fn contains(&self, rank: RankTier, is_shadow: bool, monster_id: MonsterId) -> bool {
        self.monsters
            .get(&monster_id)
            .map(|info| info.rank == rank && info.is_shadow == is_shadow)
            .unwrap_or(false)
    }

    // =========================================================================
    // Arise links
    // =========================================================================

    /// Link `before -> next` for an arise target rank.
    /// Returns the stale pairs that were unlinked.
    pub fn set_arise_link(&mut self, link: AriseLink) -> Result<Vec<(MonsterId, MonsterId)>, EconomyError> {
        self.validate_arise_link(&link)?;
        Ok(self.apply_arise_link(&link))
    }

    /// Link several pairs. Every pair is validated before any is applied;
    /// later pairs override earlier ones that share an endpoint.
    /// Returns the stale `(next_rank, before, next)` triples that were unlinked.
    pub fn set_arise_links(
        &mut self,
        links: &[AriseLink],
    ) -> Result<Vec<(RankTier, MonsterId, MonsterId)>, EconomyError> {
        if links.is_empty() {
            return Err(EconomyError::InvalidArgument("empty arise link batch"));
        }
        for link in links {
            self.validate_arise_link(link)?;
        }
        let mut removed = Vec::new();
        for link in links {
            removed.extend(
                self.apply_arise_link(link)
                    .into_iter()
                    .map(|(before, next)| (link.next_rank, before, next)),
            );
        }
        Ok(removed)
    }

    /// Remove the link of `before` for an arise target rank.
    pub fn remove_arise_link(&mut self, next_rank: RankTier, before_id: MonsterId) -> Result<MonsterId, EconomyError> {
        let links = self
            .arise
            .tier_mut(next_rank)
            .ok_or(EconomyError::InvalidRankType(next_rank))?;
        let next = links
            .remove_before(before_id)
            .ok_or(EconomyError::DoesNotExistAriseMonster { rank: next_rank, monster_id: before_id })?;
        self.version += 1;
        Ok(next)
    }

    fn validate_arise_link(&self, link: &AriseLink) -> Result<(), EconomyError> {
        let (source_rank, source_shadow) = link
            .next_rank
            .arise_source()
            .ok_or(EconomyError::InvalidRankType(link.next_rank))?;

        if !self.contains(source_rank, source_shadow, link.before_id) {
            return Err(EconomyError::InvalidMonsterId(link.before_id));
        }
        if !self.contains(link.next_rank, true, link.next_id) {
            return Err(EconomyError::InvalidMonsterId(link.next_id));
        }
        Ok(())
    }

    fn apply_arise_link(&mut self, link: &AriseLink) -> Vec<(MonsterId, MonsterId)> {
        let removed = match self.arise.tier_mut(link.next_rank) {
            Some(links) => links.insert(link.before_id, link.next_id),
            None => Vec::new(),
        };
        self.version += 1;
        removed
    }

    /// Shadow monster `before_id` arises into.
    pub fn arise_target(&self, next_rank: RankTier, before_id: MonsterId) -> Result<MonsterId, EconomyError> {
        self.arise
            .tier(next_rank)
            .ok_or(EconomyError::InvalidRankType(next_rank))?
            .target(before_id)
            .ok_or(EconomyError::DoesNotExistAriseMonster { rank: next_rank, monster_id: before_id })
    }

    /// Monster that arises into `next_id`.
    pub fn arise_source(&self, next_rank: RankTier, next_id: MonsterId) -> Result<MonsterId, EconomyError> {
        self.arise
            .tier(next_rank)
            .ok_or(EconomyError::InvalidRankType(next_rank))?
            .source(next_id)
            .ok_or(EconomyError::DoesNotExistAriseMonster { rank: next_rank, monster_id: next_id })
    }

    /// Whole arise graph (read-only).
    pub fn arise_graph(&self) -> &AriseGraph {
        &self.arise
    }

    // =========================================================================
    // Scores (informational)
    // =========================================================================

    /// Replace the score table for normal or shadow monsters.
    pub fn set_scores(&mut self, is_shadow: bool, scores: &[u64]) -> Result<(), EconomyError> {
        let table: RankTable<u64> = scores
            .try_into()
            .map_err(|_| EconomyError::InvalidArgument("score table must have one entry per rank"))?;
        if is_shadow {
            self.shadow_scores = table;
        } else {
            self.normal_scores = table;
        }
        self.version += 1;
        Ok(())
    }

    /// Score of a rank. Shadow scores below B are always zero.
    pub fn score(&self, rank: RankTier, is_shadow: bool) -> u64 {
        if is_shadow {
            if rank.allows_shadow() {
                self.shadow_scores[rank.index()]
            } else {
                0
            }
        } else {
            self.normal_scores[rank.index()]
        }
    }

    /// Score of a monster by its current classification.
    pub fn monster_score(&self, monster_id: MonsterId) -> Result<u64, EconomyError> {
        let info = self
            .monster_info(monster_id)
            .ok_or(EconomyError::InvalidMonsterId(monster_id))?;
        Ok(self.score(info.rank, info.is_shadow))
    }

    // =========================================================================
    // Hashing
    // =========================================================================

    /// Feed pools and arise links into a state hasher.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_u64(self.next_id);
        for (key, pool) in &self.pools {
            hasher.update_u8(key.rank as u8);
            hasher.update_bool(key.is_shadow);
            hasher.update_u64(pool.len() as u64);
            for id in pool {
                hasher.update_u64(*id);
            }
        }
        for rank in RankTier::ARISE_TARGETS {
            if let Some(links) = self.arise.tier(rank) {
                hasher.update_u64(links.len() as u64);
                for (before, next) in links.pairs() {
                    hasher.update_u64(before);
                    hasher.update_u64(next);
                }
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
