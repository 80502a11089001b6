//! Economy Engine
//!
//! Owns every piece of component state plus the external collaborators.
//! Each call runs the same pipeline:
//!
//! ```text
//! validate -> oracle.verify -> compute -> stage LedgerBatch
//!          -> ledger.apply (atomic) -> commit own state -> emit event
//! ```
//!
//! Everything before `ledger.apply` is read-only and everything after it is
//! infallible, so an error at any step leaves the engine, the ledger and the
//! hunter's nonce exactly as they were.
//!
//! Hunter-facing operations live next to their component:
//! `gate::ops` and `progression::{upgrade, arise, returns}`.

use tracing::info;

use crate::access::Roles;
use crate::config::EconomyConfig;
use crate::core::hash::{Digest, StateHasher};
use crate::core::id::{Address, MonsterId, SeasonId};
use crate::core::rank::RankTier;
use crate::error::EconomyError;
use crate::events::{ConfigTable, EconomyEvent, EventData, EventLog};
use crate::gate::GateBook;
use crate::ledger::{LedgerBatch, RankLedger, SeasonRegistry, Shop, TokenLedger};
use crate::oracle::{AttestationVerifier, RandomOracle};
use crate::progression::ProgressBook;
use crate::registry::{AriseLink, MonsterRegistry, RankChange};

/// Who is calling and at which block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CallContext {
    /// Caller.
    pub sender: Address,
    /// Current block height.
    pub block: u64,
}

impl CallContext {
    /// Create a call context.
    pub const fn new(sender: Address, block: u64) -> Self {
        Self { sender, block }
    }
}

/// External systems the engine reads from and writes through.
pub struct Collaborators {
    /// Token balances.
    pub ledger: Box<dyn TokenLedger>,
    /// Hunter ranks.
    pub ranks: Box<dyn RankLedger>,
    /// Gate key shop.
    pub shop: Box<dyn Shop>,
    /// Season windows and pack ids.
    pub seasons: Box<dyn SeasonRegistry>,
}

/// The economy state machine.
pub struct Engine {
    pub(crate) config: EconomyConfig,
    pub(crate) roles: Roles,
    pub(crate) oracle: RandomOracle,
    pub(crate) registry: MonsterRegistry,
    pub(crate) gates: GateBook,
    pub(crate) progress: ProgressBook,
    pub(crate) events: EventLog,
    pub(crate) external: Collaborators,
}

impl Engine {
    /// Create an engine. `master` becomes operator master and first operator.
    pub fn new(
        config: EconomyConfig,
        master: Address,
        verifier: Box<dyn AttestationVerifier>,
        external: Collaborators,
    ) -> Result<Self, EconomyError> {
        config.validate()?;

        let mut registry = MonsterRegistry::new();
        registry.set_scores(false, &config.scores.normal)?;
        registry.set_scores(true, &config.scores.shadow)?;

        let oracle = RandomOracle::new(verifier);
        info!(
            "Engine created (master {}, attester {})",
            master.short(),
            oracle.attester_id()
        );

        Ok(Self {
            config,
            roles: Roles::new(master),
            oracle,
            registry,
            gates: GateBook::new(),
            progress: ProgressBook::new(),
            events: EventLog::new(),
            external,
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Current tables.
    pub fn config(&self) -> &EconomyConfig {
        &self.config
    }

    /// Role assignments.
    pub fn roles(&self) -> &Roles {
        &self.roles
    }

    /// Monster registry (read-only).
    pub fn registry(&self) -> &MonsterRegistry {
        &self.registry
    }

    /// Gate book (read-only).
    pub fn gate_book(&self) -> &GateBook {
        &self.gates
    }

    /// Progression counters (read-only).
    pub fn progress(&self) -> &ProgressBook {
        &self.progress
    }

    /// Next nonce a hunter's signatures must start at.
    pub fn nonce_of(&self, hunter: &Address) -> u64 {
        self.oracle.nonce_of(hunter)
    }

    /// Current attester identity.
    pub fn attester_id(&self) -> String {
        self.oracle.attester_id()
    }

    /// Token ledger.
    pub fn ledger(&self) -> &dyn TokenLedger {
        self.external.ledger.as_ref()
    }

    /// Token ledger, for setup outside the engine's own calls.
    pub fn ledger_mut(&mut self) -> &mut dyn TokenLedger {
        self.external.ledger.as_mut()
    }

    /// Events not yet drained.
    pub fn events(&self) -> &[EconomyEvent] {
        self.events.events()
    }

    /// Take all pending events.
    pub fn drain_events(&mut self) -> Vec<EconomyEvent> {
        self.events.drain()
    }

    /// Digest of registry, gate, progression and nonce state.
    pub fn state_hash(&self) -> Digest {
        let mut hasher = StateHasher::for_engine_state();
        self.registry.hash_into(&mut hasher);
        self.gates.hash_into(&mut hasher);
        self.progress.hash_into(&mut hasher);
        for (hunter, nonce) in self.oracle.nonces() {
            hasher.update_address(hunter);
            hasher.update_u64(*nonce);
        }
        hasher.finalize()
    }

    // =========================================================================
    // Roles
    // =========================================================================

    /// Grant the operator role (master only).
    pub fn grant_operator(&mut self, call: CallContext, account: Address) -> Result<(), EconomyError> {
        self.roles.ensure_master(&call.sender)?;
        if self.roles.grant_operator(account) {
            info!("Operator {} granted", account.short());
            self.emit(call, EventData::OperatorGranted { account });
        }
        Ok(())
    }

    /// Revoke the operator role (master only).
    pub fn revoke_operator(&mut self, call: CallContext, account: Address) -> Result<(), EconomyError> {
        self.roles.ensure_master(&call.sender)?;
        if self.roles.revoke_operator(&account) {
            info!("Operator {} revoked", account.short());
            self.emit(call, EventData::OperatorRevoked { account });
        }
        Ok(())
    }

    /// Hand the master role to another account (master only).
    pub fn transfer_operator_master(&mut self, call: CallContext, account: Address) -> Result<(), EconomyError> {
        self.roles.ensure_master(&call.sender)?;
        self.roles.transfer_master(account);
        info!("Operator master transferred to {}", account.short());
        self.emit(call, EventData::OperatorMasterTransferred { account });
        Ok(())
    }

    /// Replace the attester (operator only). Nonces are kept.
    pub fn set_attester(
        &mut self,
        call: CallContext,
        verifier: Box<dyn AttestationVerifier>,
    ) -> Result<(), EconomyError> {
        self.roles.ensure_operator(&call.sender)?;
        self.oracle.set_verifier(verifier);
        let attester = self.oracle.attester_id();
        info!("Attester set to {}", attester);
        self.emit(call, EventData::AttesterChanged { attester });
        Ok(())
    }

    // =========================================================================
    // Registry administration
    // =========================================================================

    /// Register one monster (operator only).
    pub fn add_monster(&mut self, call: CallContext, rank: RankTier, is_shadow: bool) -> Result<MonsterId, EconomyError> {
        self.roles.ensure_operator(&call.sender)?;
        let monster_id = self.registry.add_monster(rank, is_shadow)?;
        self.emit(call, EventData::MonsterAdded { monster_id, rank, is_shadow });
        Ok(monster_id)
    }

    /// Register `count` monsters into one pool (operator only).
    pub fn add_monsters(
        &mut self,
        call: CallContext,
        rank: RankTier,
        is_shadow: bool,
        count: u32,
    ) -> Result<Vec<MonsterId>, EconomyError> {
        self.roles.ensure_operator(&call.sender)?;
        let ids = self.registry.add_monsters(rank, is_shadow, count)?;
        info!("Added {} monsters to ({}, shadow: {})", ids.len(), rank, is_shadow);
        for monster_id in &ids {
            self.emit(call, EventData::MonsterAdded { monster_id: *monster_id, rank, is_shadow });
        }
        Ok(ids)
    }

    /// Move a monster to another rank (operator only).
    pub fn set_rank(
        &mut self,
        call: CallContext,
        is_shadow: bool,
        monster_id: MonsterId,
        new_rank: RankTier,
    ) -> Result<(), EconomyError> {
        self.set_ranks(call, &[RankChange { is_shadow, monster_id, new_rank }])
    }

    /// Move several monsters (operator only). All or nothing.
    pub fn set_ranks(&mut self, call: CallContext, changes: &[RankChange]) -> Result<(), EconomyError> {
        self.roles.ensure_operator(&call.sender)?;
        let results = self.registry.set_ranks(changes)?;

        for (change, (old_rank, dropped)) in changes.iter().zip(results) {
            self.emit(call, EventData::MonsterRankChanged {
                monster_id: change.monster_id,
                is_shadow: change.is_shadow,
                old_rank,
                new_rank: change.new_rank,
            });
            for (next_rank, before_id, next_id) in dropped {
                self.emit(call, EventData::AriseLinkRemoved { next_rank, before_id, next_id });
            }
        }
        Ok(())
    }

    /// Link one arise pair (operator only).
    pub fn set_arise_link(&mut self, call: CallContext, link: AriseLink) -> Result<(), EconomyError> {
        self.set_arise_links(call, &[link])
    }

    /// Link several arise pairs (operator only). All or nothing.
    pub fn set_arise_links(&mut self, call: CallContext, links: &[AriseLink]) -> Result<(), EconomyError> {
        self.roles.ensure_operator(&call.sender)?;
        let removed = self.registry.set_arise_links(links)?;

        for (next_rank, before_id, next_id) in removed {
            self.emit(call, EventData::AriseLinkRemoved { next_rank, before_id, next_id });
        }
        for link in links {
            self.emit(call, EventData::AriseLinkSet {
                next_rank: link.next_rank,
                before_id: link.before_id,
                next_id: link.next_id,
            });
        }
        Ok(())
    }

    /// Unlink `before_id` for an arise target rank (operator only).
    pub fn remove_arise_link(
        &mut self,
        call: CallContext,
        next_rank: RankTier,
        before_id: MonsterId,
    ) -> Result<(), EconomyError> {
        self.roles.ensure_operator(&call.sender)?;
        let next_id = self.registry.remove_arise_link(next_rank, before_id)?;
        self.emit(call, EventData::AriseLinkRemoved { next_rank, before_id, next_id });
        Ok(())
    }

    /// Replace a score table (operator only).
    pub fn set_scores(&mut self, call: CallContext, is_shadow: bool, scores: &[u64]) -> Result<(), EconomyError> {
        self.roles.ensure_operator(&call.sender)?;
        self.registry.set_scores(is_shadow, scores)?;
        let table = if is_shadow {
            &mut self.config.scores.shadow
        } else {
            &mut self.config.scores.normal
        };
        table.copy_from_slice(scores);
        self.table_updated(call, ConfigTable::Scores);
        Ok(())
    }

    // =========================================================================
    // Call plumbing
    // =========================================================================

    /// Hand a staged batch to the token ledger.
    pub(crate) fn apply_batch(&mut self, batch: &LedgerBatch) -> Result<(), EconomyError> {
        self.external.ledger.apply(batch)?;
        Ok(())
    }

    pub(crate) fn emit(&mut self, call: CallContext, data: EventData) {
        self.events.push(call.block, call.sender, data);
    }

    pub(crate) fn table_updated(&mut self, call: CallContext, table: ConfigTable) {
        info!("Table {:?} updated by {}", table, call.sender.short());
        self.emit(call, EventData::TableUpdated { table });
    }

    /// Season progression counters are recorded under; 0 outside any season.
    pub(crate) fn progress_season(&self, block: u64) -> SeasonId {
        self.external.seasons.current_season(block).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Fixture, HUNTER, MASTER};

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = EconomyConfig::default();
        config.gate.boost_block_count = 0;
        assert!(Fixture::try_with_config(config).is_err());
    }

    #[test]
    fn test_admin_calls_require_operator() {
        let mut fx = Fixture::new();
        let call = fx.call(1);
        assert!(matches!(
            fx.engine.add_monster(call, RankTier::E, false),
            Err(EconomyError::OnlyOperator)
        ));
        assert!(matches!(
            fx.engine.grant_operator(call, HUNTER),
            Err(EconomyError::OnlyOperatorMaster)
        ));
        assert!(fx.engine.events().is_empty());
    }

    #[test]
    fn test_operator_lifecycle() {
        let mut fx = Fixture::new();
        let admin = fx.admin(1);
        fx.engine.grant_operator(admin, HUNTER).unwrap();
        assert!(fx.engine.add_monster(fx.call(2), RankTier::E, false).is_ok());

        fx.engine.revoke_operator(admin, HUNTER).unwrap();
        assert!(fx.engine.add_monster(fx.call(3), RankTier::E, false).is_err());

        fx.engine.transfer_operator_master(admin, HUNTER).unwrap();
        assert_eq!(fx.engine.roles().master(), HUNTER);
        assert!(matches!(
            fx.engine.grant_operator(admin, MASTER),
            Err(EconomyError::OnlyOperatorMaster)
        ));
    }

    #[test]
    fn test_set_rank_drops_links_and_emits() {
        let mut fx = Fixture::new();
        let admin = fx.admin(1);
        let before = fx.engine.add_monster(admin, RankTier::C, false).unwrap();
        let next = fx.engine.add_monster(admin, RankTier::B, true).unwrap();
        fx.engine
            .set_arise_link(admin, AriseLink { next_rank: RankTier::B, before_id: before, next_id: next })
            .unwrap();
        fx.engine.drain_events();

        fx.engine.set_rank(admin, false, before, RankTier::D).unwrap();

        assert!(fx.engine.registry().arise_target(RankTier::B, before).is_err());
        let events = fx.engine.drain_events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0].data, EventData::MonsterRankChanged { old_rank: RankTier::C, .. }));
        assert!(matches!(events[1].data, EventData::AriseLinkRemoved { next_rank: RankTier::B, .. }));
    }

    #[test]
    fn test_set_scores_updates_config() {
        let mut fx = Fixture::new();
        let admin = fx.admin(1);
        fx.engine.set_scores(admin, false, &[9, 8, 7, 6, 5, 4]).unwrap();
        assert_eq!(fx.engine.config().scores.normal, [9, 8, 7, 6, 5, 4]);
        assert_eq!(fx.engine.registry().score(RankTier::E, false), 9);
        assert!(fx.engine.set_scores(admin, false, &[1, 2]).is_err());
    }

    #[test]
    fn test_state_hash_tracks_nonces() {
        let mut fx = Fixture::new();
        let before = fx.engine.state_hash();
        assert_eq!(before, fx.engine.state_hash());

        let admin = fx.admin(1);
        fx.engine.add_monster(admin, RankTier::E, false).unwrap();
        assert_ne!(before, fx.engine.state_hash());
    }
}
