//! Rank Tiers
//!
//! The `E < D < C < B < A < S` ladder shared by hunters, monsters and gates.
//! Every per-rank table in the crate is indexed by [`RankTier::index`].

use std::fmt;
use serde::{Serialize, Deserialize};

/// Number of rank tiers.
pub const RANK_COUNT: usize = 6;

/// Number of arise tiers (B, A, S).
pub const ARISE_TIER_COUNT: usize = 3;

/// A value per rank tier, indexed by `RankTier::index()`.
pub type RankTable<T> = [T; RANK_COUNT];

/// Rank tier (E lowest, S highest).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum RankTier {
    /// First tier (lowest)
    #[default]
    E = 0,
    /// Second tier
    D = 1,
    /// Third tier
    C = 2,
    /// Fourth tier, first with shadow monsters
    B = 3,
    /// Fifth tier
    A = 4,
    /// Sixth tier (highest)
    S = 5,
}

impl RankTier {
    /// All tiers, lowest first.
    pub const ALL: [RankTier; RANK_COUNT] = [
        RankTier::E,
        RankTier::D,
        RankTier::C,
        RankTier::B,
        RankTier::A,
        RankTier::S,
    ];

    /// Arise target tiers, in tier-index order.
    pub const ARISE_TARGETS: [RankTier; ARISE_TIER_COUNT] = [RankTier::B, RankTier::A, RankTier::S];

    /// Table index for this tier.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Get tier from index (0-5).
    pub fn from_index(index: usize) -> Option<RankTier> {
        Self::ALL.get(index).copied()
    }

    /// Next tier up (if not max).
    pub fn next(self) -> Option<RankTier> {
        Self::from_index(self.index() + 1)
    }

    /// Tier below (if not min).
    pub fn prev(self) -> Option<RankTier> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }

    /// Shadow monsters exist from B upward.
    #[inline]
    pub fn allows_shadow(self) -> bool {
        self >= RankTier::B
    }

    /// Index into the arise tables (`B => 0`, `A => 1`, `S => 2`).
    pub fn arise_tier(self) -> Option<usize> {
        match self {
            RankTier::B => Some(0),
            RankTier::A => Some(1),
            RankTier::S => Some(2),
            _ => None,
        }
    }

    /// Pool a monster must come from to arise into this tier.
    ///
    /// B arises from normal C monsters; A and S arise from the shadow pool
    /// of the previous arise tier.
    pub fn arise_source(self) -> Option<(RankTier, bool)> {
        match self {
            RankTier::B => Some((RankTier::C, false)),
            RankTier::A => Some((RankTier::B, true)),
            RankTier::S => Some((RankTier::A, true)),
            _ => None,
        }
    }

    /// Single-letter name.
    pub fn letter(self) -> char {
        match self {
            RankTier::E => 'E',
            RankTier::D => 'D',
            RankTier::C => 'C',
            RankTier::B => 'B',
            RankTier::A => 'A',
            RankTier::S => 'S',
        }
    }
}

impl fmt::Display for RankTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}
