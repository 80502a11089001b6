//! Arise Graph
//!
//! For each arise target tier (B, A, S) a partial bijection between the
//! monster that evolves (`before`) and the shadow monster it becomes
//! (`next`). Both directions are stored so lookups are O(log n) either way.
//!
//! Inserting a pair first unlinks any existing pair that shares either
//! endpoint, so the two maps always mirror each other.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};

use crate::core::id::MonsterId;
use crate::core::rank::{RankTier, ARISE_TIER_COUNT};

/// Links of one arise tier.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AriseLinks {
    forward: BTreeMap<MonsterId, MonsterId>,
    reverse: BTreeMap<MonsterId, MonsterId>,
}

impl AriseLinks {
    /// Link `before -> next`, replacing any link on either endpoint.
    /// Returns the pairs that were unlinked.
    pub fn insert(&mut self, before: MonsterId, next: MonsterId) -> Vec<(MonsterId, MonsterId)> {
        let mut removed = Vec::new();
        if let Some(old_next) = self.forward.remove(&before) {
            self.reverse.remove(&old_next);
            removed.push((before, old_next));
        }
        if let Some(old_before) = self.reverse.remove(&next) {
            self.forward.remove(&old_before);
            removed.push((old_before, next));
        }
        self.forward.insert(before, next);
        self.reverse.insert(next, before);
        // Re-linking the same pair is not a removal
        removed.retain(|pair| *pair != (before, next));
        removed
    }

    /// Unlink by source. Returns the removed target.
    pub fn remove_before(&mut self, before: MonsterId) -> Option<MonsterId> {
        let next = self.forward.remove(&before)?;
        self.reverse.remove(&next);
        Some(next)
    }

    /// Unlink every pair touching `id` on either side.
    pub fn remove_endpoint(&mut self, id: MonsterId) -> Vec<(MonsterId, MonsterId)> {
        let mut removed = Vec::new();
        if let Some(next) = self.remove_before(id) {
            removed.push((id, next));
        }
        if let Some(before) = self.reverse.remove(&id) {
            self.forward.remove(&before);
            removed.push((before, id));
        }
        removed
    }

    /// Target of `before`.
    pub fn target(&self, before: MonsterId) -> Option<MonsterId> {
        self.forward.get(&before).copied()
    }

    /// Source of `next`.
    pub fn source(&self, next: MonsterId) -> Option<MonsterId> {
        self.reverse.get(&next).copied()
    }

    /// All pairs, ordered by source id.
    pub fn pairs(&self) -> impl Iterator<Item = (MonsterId, MonsterId)> + '_ {
        self.forward.iter().map(|(b, n)| (*b, *n))
    }

    /// Number of linked pairs.
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    /// True when nothing is linked.
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Check both maps mirror each other.
    pub fn is_consistent(&self) -> bool {
        self.forward.len() == self.reverse.len()
            && self
                .forward
                .iter()
                .all(|(b, n)| self.reverse.get(n) == Some(b))
    }
}

/// Links for every arise tier.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AriseGraph {
    tiers: [AriseLinks; ARISE_TIER_COUNT],
}

impl AriseGraph {
    /// Links for an arise target rank (B, A or S).
    pub fn tier(&self, next_rank: RankTier) -> Option<&AriseLinks> {
        next_rank.arise_tier().map(|t| &self.tiers[t])
    }

    /// Mutable links for an arise target rank.
    pub fn tier_mut(&mut self, next_rank: RankTier) -> Option<&mut AriseLinks> {
        next_rank.arise_tier().map(move |t| &mut self.tiers[t])
    }

    /// Drop every link touching `id`, in every tier.
    pub fn remove_monster(&mut self, id: MonsterId) -> Vec<(RankTier, MonsterId, MonsterId)> {
        let mut removed = Vec::new();
        for (tier, links) in self.tiers.iter_mut().enumerate() {
            let rank = RankTier::ARISE_TARGETS[tier];
            for (before, next) in links.remove_endpoint(id) {
                removed.push((rank, before, next));
            }
        }
        removed
    }
}
