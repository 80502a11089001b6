//! External Collaborators
//!
//! The engine never owns balances, hunter ranks, prices or season windows.
//! It talks to those systems through the traits below.
//!
//! ## Atomicity
//!
//! Every token effect of a call is staged into one [`LedgerBatch`] and handed
//! to [`TokenLedger::apply`], which must apply all of it or none of it. The
//! engine commits its own state only after the batch went through.

pub mod memory;

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::core::id::{Address, Amount, MonsterId, SeasonId, SeasonPackId};
use crate::core::rank::RankTier;

pub use memory::{InMemoryLedger, StaticRankLedger, FixedPriceShop, InMemorySeasons, SeasonInfo};

// =============================================================================
// TOKEN LEDGER
// =============================================================================

/// A fungible or semi-fungible token the engine mints or burns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Asset {
    /// Monster token.
    Monster(MonsterId),
    /// Season pack token.
    SeasonPack(SeasonPackId),
    /// Essence stone.
    EssenceStone,
    /// Gate key for a rank.
    GateKey(RankTier),
    /// Payment currency used by the shop.
    Currency(u32),
}

/// One staged token effect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerOp {
    /// Credit `amount` of `asset` to `to`.
    Mint {
        /// Receiver.
        to: Address,
        /// Token.
        asset: Asset,
        /// Quantity.
        amount: Amount,
    },
    /// Debit `amount` of `asset` from `from`.
    Burn {
        /// Owner.
        from: Address,
        /// Token.
        asset: Asset,
        /// Quantity.
        amount: Amount,
    },
}

/// Ordered token effects of one call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LedgerBatch {
    ops: Vec<LedgerOp>,
}

impl LedgerBatch {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a mint. Zero amounts are dropped.
    pub fn mint(&mut self, to: Address, asset: Asset, amount: Amount) {
        if amount > 0 {
            self.ops.push(LedgerOp::Mint { to, asset, amount });
        }
    }

    /// Stage a burn. Zero amounts are dropped.
    pub fn burn(&mut self, from: Address, asset: Asset, amount: Amount) {
        if amount > 0 {
            self.ops.push(LedgerOp::Burn { from, asset, amount });
        }
    }

    /// Staged ops in order.
    pub fn ops(&self) -> &[LedgerOp] {
        &self.ops
    }

    /// Number of staged ops.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// True when nothing is staged.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Token ledger errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Owner holds less than the burn amount.
    #[error("insufficient balance of {asset:?} for {owner}: has {available}, needs {required}")]
    InsufficientBalance {
        /// Owner.
        owner: Address,
        /// Token.
        asset: Asset,
        /// Current balance.
        available: Amount,
        /// Burn amount.
        required: Amount,
    },
    /// A mint would overflow the balance.
    #[error("balance overflow of {asset:?} for {owner}")]
    Overflow {
        /// Owner.
        owner: Address,
        /// Token.
        asset: Asset,
    },
}

/// Balance store for all engine-managed tokens.
pub trait TokenLedger: Send {
    /// Current balance.
    fn balance_of(&self, owner: &Address, asset: Asset) -> Amount;

    /// Apply every op of the batch in order, or none of them.
    fn apply(&mut self, batch: &LedgerBatch) -> Result<(), LedgerError>;
}

// =============================================================================
// RANK LEDGER
// =============================================================================

/// Read-only source of hunter ranks.
pub trait RankLedger: Send {
    /// Hunter's rank in a season.
    fn hunter_rank(&self, season_id: SeasonId, hunter: &Address) -> RankTier;
}

// =============================================================================
// SHOP
// =============================================================================

/// Shop errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShopError {
    /// No key is sold for this rank.
    #[error("gate key for rank {0} is not for sale")]
    NotForSale(RankTier),
    /// Price computation overflowed.
    #[error("price overflow")]
    PriceOverflow,
}

/// Key shop. Pricing and payment currency live entirely on the shop side.
pub trait Shop: Send {
    /// Stage the purchase of `amount` keys of `rank` for `buyer`: payment
    /// burns and the key mint go into `batch`.
    fn buy_key(
        &self,
        buyer: &Address,
        rank: RankTier,
        amount: u64,
        batch: &mut LedgerBatch,
    ) -> Result<(), ShopError>;
}

// =============================================================================
// SEASON REGISTRY
// =============================================================================

/// Inclusive block window of a season.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonWindow {
    /// First block.
    pub start_block: u64,
    /// Last block.
    pub end_block: u64,
}

impl SeasonWindow {
    /// Check if a block falls in the window.
    pub fn contains(&self, block: u64) -> bool {
        block >= self.start_block && block <= self.end_block
    }
}

/// Season parameters.
pub trait SeasonRegistry: Send {
    /// Block window of a season.
    fn season_window(&self, season_id: SeasonId) -> Option<SeasonWindow>;

    /// Season pack ids that gates of this season can reward.
    fn season_pack_ids(&self, season_id: SeasonId) -> &[SeasonPackId];

    /// Season running at `block`, if any.
    fn current_season(&self, block: u64) -> Option<SeasonId>;

    /// Check if a season is running at `block`.
    fn is_season_active(&self, season_id: SeasonId, block: u64) -> bool {
        self.season_window(season_id)
            .map(|w| w.contains(block))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_drops_zero_amounts() {
        let owner = Address::new([1; 20]);
        let mut batch = LedgerBatch::new();
        batch.mint(owner, Asset::EssenceStone, 0);
        batch.burn(owner, Asset::EssenceStone, 0);
        assert!(batch.is_empty());

        batch.burn(owner, Asset::GateKey(RankTier::E), 1);
        batch.mint(owner, Asset::Monster(3), 2);
        assert_eq!(batch.len(), 2);
        assert!(matches!(batch.ops()[0], LedgerOp::Burn { .. }));
    }

    #[test]
    fn test_season_window() {
        let window = SeasonWindow { start_block: 10, end_block: 20 };
        assert!(!window.contains(9));
        assert!(window.contains(10));
        assert!(window.contains(20));
        assert!(!window.contains(21));
    }
}
