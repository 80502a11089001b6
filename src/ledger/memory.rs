//! In-Memory Collaborators
//!
//! Reference implementations of the collaborator traits. Used by the demo
//! binary and the tests; all state is kept in BTreeMaps for deterministic
//! iteration.

use std::collections::BTreeMap;

use crate::core::id::{Address, Amount, SeasonId, SeasonPackId};
use crate::core::rank::{RankTier, RankTable};
use super::{
    Asset, LedgerBatch, LedgerError, LedgerOp, RankLedger, SeasonRegistry, SeasonWindow, Shop,
    ShopError, TokenLedger,
};

// =============================================================================
// TOKEN LEDGER
// =============================================================================

/// Balance map keyed by `(owner, asset)`.
#[derive(Clone, Debug, Default)]
pub struct InMemoryLedger {
    balances: BTreeMap<(Address, Asset), Amount>,
}

impl InMemoryLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a balance directly (setup only).
    pub fn with_balance(mut self, owner: Address, asset: Asset, amount: Amount) -> Self {
        self.balances.insert((owner, asset), amount);
        self
    }
}

impl TokenLedger for InMemoryLedger {
    fn balance_of(&self, owner: &Address, asset: Asset) -> Amount {
        self.balances.get(&(*owner, asset)).copied().unwrap_or(0)
    }

    fn apply(&mut self, batch: &LedgerBatch) -> Result<(), LedgerError> {
        // Run the whole batch against a scratch copy of the touched balances
        let mut scratch: BTreeMap<(Address, Asset), Amount> = BTreeMap::new();

        for op in batch.ops() {
            match *op {
                LedgerOp::Mint { to, asset, amount } => {
                    let current = scratch
                        .get(&(to, asset))
                        .copied()
                        .unwrap_or_else(|| self.balance_of(&to, asset));
                    let next = current
                        .checked_add(amount)
                        .ok_or(LedgerError::Overflow { owner: to, asset })?;
                    scratch.insert((to, asset), next);
                }
                LedgerOp::Burn { from, asset, amount } => {
                    let current = scratch
                        .get(&(from, asset))
                        .copied()
                        .unwrap_or_else(|| self.balance_of(&from, asset));
                    let next = current.checked_sub(amount).ok_or(
                        LedgerError::InsufficientBalance {
                            owner: from,
                            asset,
                            available: current,
                            required: amount,
                        },
                    )?;
                    scratch.insert((from, asset), next);
                }
            }
        }

        for (key, value) in scratch {
            if value == 0 {
                self.balances.remove(&key);
            } else {
                self.balances.insert(key, value);
            }
        }
        Ok(())
    }
}

// =============================================================================
// RANK LEDGER
// =============================================================================

/// Fixed hunter ranks per season. Unknown hunters are rank E.
#[derive(Clone, Debug, Default)]
pub struct StaticRankLedger {
    ranks: BTreeMap<(SeasonId, Address), RankTier>,
}

impl StaticRankLedger {
    /// Create an empty rank ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a hunter's rank for a season.
    pub fn set_rank(&mut self, season_id: SeasonId, hunter: Address, rank: RankTier) {
        self.ranks.insert((season_id, hunter), rank);
    }

    /// Builder form of [`Self::set_rank`].
    pub fn with_rank(mut self, season_id: SeasonId, hunter: Address, rank: RankTier) -> Self {
        self.set_rank(season_id, hunter, rank);
        self
    }
}

impl RankLedger for StaticRankLedger {
    fn hunter_rank(&self, season_id: SeasonId, hunter: &Address) -> RankTier {
        self.ranks
            .get(&(season_id, *hunter))
            .copied()
            .unwrap_or_default()
    }
}

// =============================================================================
// SHOP
// =============================================================================

/// Shop selling gate keys for a single currency at a fixed price per rank.
/// A zero price means the key is not for sale.
#[derive(Clone, Debug)]
pub struct FixedPriceShop {
    /// Currency id burned as payment.
    pub currency: u32,
    /// Price per key, by rank.
    pub prices: RankTable<Amount>,
}

impl FixedPriceShop {
    /// Create a shop.
    pub fn new(currency: u32, prices: RankTable<Amount>) -> Self {
        Self { currency, prices }
    }
}

impl Shop for FixedPriceShop {
    fn buy_key(
        &self,
        buyer: &Address,
        rank: RankTier,
        amount: u64,
        batch: &mut LedgerBatch,
    ) -> Result<(), ShopError> {
        let unit = self.prices[rank.index()];
        if unit == 0 {
            return Err(ShopError::NotForSale(rank));
        }
        let total = unit
            .checked_mul(amount as Amount)
            .ok_or(ShopError::PriceOverflow)?;

        batch.burn(*buyer, Asset::Currency(self.currency), total);
        batch.mint(*buyer, Asset::GateKey(rank), amount as Amount);
        Ok(())
    }
}

// =============================================================================
// SEASON REGISTRY
// =============================================================================

/// Season parameters.
#[derive(Clone, Debug)]
pub struct SeasonInfo {
    /// Block window.
    pub window: SeasonWindow,
    /// Season pack ids rewarded by gates.
    pub pack_ids: Vec<SeasonPackId>,
}

/// Season table.
#[derive(Clone, Debug, Default)]
pub struct InMemorySeasons {
    seasons: BTreeMap<SeasonId, SeasonInfo>,
}

impl InMemorySeasons {
    /// Create an empty season table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a season.
    pub fn with_season(
        mut self,
        season_id: SeasonId,
        start_block: u64,
        end_block: u64,
        pack_ids: Vec<SeasonPackId>,
    ) -> Self {
        self.seasons.insert(
            season_id,
            SeasonInfo {
                window: SeasonWindow { start_block, end_block },
                pack_ids,
            },
        );
        self
    }
}

impl SeasonRegistry for InMemorySeasons {
    fn season_window(&self, season_id: SeasonId) -> Option<SeasonWindow> {
        self.seasons.get(&season_id).map(|s| s.window)
    }

    fn season_pack_ids(&self, season_id: SeasonId) -> &[SeasonPackId] {
        self.seasons
            .get(&season_id)
            .map(|s| s.pack_ids.as_slice())
            .unwrap_or(&[])
    }

    fn current_season(&self, block: u64) -> Option<SeasonId> {
        self.seasons
            .iter()
            .find(|(_, s)| s.window.contains(block))
            .map(|(id, _)| *id)
    }
}

// =============================================================================
// TESTS
// =============================================================================
