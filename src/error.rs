//! Engine Errors
//!
//! Every error aborts the whole call. Nothing is retried and nothing is
//! partially applied; collaborator errors are surfaced unchanged.

use thiserror::Error;

use crate::core::rank::RankTier;
use crate::ledger::{LedgerError, ShopError};

/// Errors returned by engine operations.
#[derive(Debug, Error)]
pub enum EconomyError {
    // -------------------------------------------------------------------------
    // Authorization
    // -------------------------------------------------------------------------
    /// Caller is not an operator.
    #[error("caller is not an operator")]
    OnlyOperator,

    /// Caller is not the operator master.
    #[error("caller is not the operator master")]
    OnlyOperatorMaster,

    // -------------------------------------------------------------------------
    // Validation
    // -------------------------------------------------------------------------
    /// Malformed or out-of-range argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// Rank not allowed for this operation.
    #[error("invalid rank type: {0}")]
    InvalidRankType(RankTier),

    /// Monster set does not satisfy the operation's requirements.
    #[error("invalid monster")]
    InvalidMonster,

    /// Monster id not found in the expected pool.
    #[error("invalid monster id: {0}")]
    InvalidMonsterId(u64),

    /// Slot table entry is zero.
    #[error("invalid slot")]
    InvalidSlot,

    /// Season unknown or not running at the current block.
    #[error("invalid season id: {0}")]
    InvalidSeasonId(u32),

    /// A reward roll has no candidates to pick from.
    #[error("empty candidate pool for rank {rank} (shadow: {is_shadow})")]
    EmptyCandidatePool {
        /// Pool rank.
        rank: RankTier,
        /// Shadow pool flag.
        is_shadow: bool,
    },

    /// Amount arithmetic overflowed.
    #[error("arithmetic overflow")]
    ArithmeticOverflow,

    // -------------------------------------------------------------------------
    // State consistency
    // -------------------------------------------------------------------------
    /// Gate missing or owned by someone else.
    #[error("invalid gate id: {0}")]
    InvalidGateId(u64),

    /// Gate already cleared.
    #[error("gate {0} already cleared")]
    AlreadyClearGate(u64),

    /// No arise link for this monster.
    #[error("no arise link for monster {monster_id} at rank {rank}")]
    DoesNotExistAriseMonster {
        /// Arise target rank.
        rank: RankTier,
        /// Monster looked up.
        monster_id: u64,
    },

    /// Season has no season-pack collection.
    #[error("invalid collection id for season {0}")]
    InvalidCollectionId(u32),

    /// Hunter has no free gate slot this season.
    #[error("gate slots exhausted ({using}/{available})")]
    ExceedGateSlot {
        /// Slots in use.
        using: u32,
        /// Slots allowed by hunter rank.
        available: u32,
    },

    // -------------------------------------------------------------------------
    // Cryptographic
    // -------------------------------------------------------------------------
    /// Signature did not verify for the expected nonce.
    #[error("random signature verification failed at nonce {nonce}")]
    RandomSignatureVerifyFailed {
        /// Nonce the failing signature was checked against.
        nonce: u64,
    },

    /// Signature count does not match the requested amount.
    #[error("invalid monster signature count: expected {expected}, got {got}")]
    InvalidMonsterSignature {
        /// Required count.
        expected: u64,
        /// Supplied count.
        got: u64,
    },

    /// Signature count does not match the gate's reward rolls.
    #[error("invalid gate signature count: expected {expected}, got {got}")]
    InvalidGateSignature {
        /// Required count.
        expected: u64,
        /// Supplied count.
        got: u64,
    },

    // -------------------------------------------------------------------------
    // Resource (collaborators)
    // -------------------------------------------------------------------------
    /// Token ledger rejected the batch.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Shop rejected the key purchase.
    #[error(transparent)]
    Shop(#[from] ShopError),
}
