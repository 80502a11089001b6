//! Test fixture: an engine wired to in-memory collaborators and a
//! deterministic ed25519 attester.

use crate::config::EconomyConfig;
use crate::core::id::{Address, Amount, SeasonId};
use crate::core::rank::RankTier;
use crate::engine::{CallContext, Collaborators, Engine};
use crate::error::EconomyError;
use crate::ledger::{
    Asset, FixedPriceShop, InMemoryLedger, InMemorySeasons, LedgerBatch, StaticRankLedger,
};
use crate::oracle::{Ed25519Attester, OracleSignature};

pub(crate) const MASTER: Address = Address([0xAA; 20]);
pub(crate) const HUNTER: Address = Address([0x11; 20]);
pub(crate) const OTHER: Address = Address([0x22; 20]);
pub(crate) const SEASON: SeasonId = 1;
pub(crate) const ATTESTER_SEED: [u8; 32] = [7; 32];

/// Key prices by rank, paid in currency 1.
pub(crate) const KEY_PRICES: [Amount; 6] = [10, 20, 40, 80, 160, 320];

pub(crate) struct Fixture {
    pub engine: Engine,
    pub attester: Ed25519Attester,
}

impl Fixture {
    /// Default tables, hunter ranked E in season 1 (blocks 0..=10_000).
    pub fn new() -> Self {
        Self::with_hunter_rank(RankTier::E)
    }

    pub fn with_hunter_rank(rank: RankTier) -> Self {
        match Self::build(EconomyConfig::default(), rank) {
            Ok(fx) => fx,
            Err(e) => panic!("default fixture failed: {e}"),
        }
    }

    pub fn try_with_config(config: EconomyConfig) -> Result<Self, EconomyError> {
        Self::build(config, RankTier::E)
    }

    fn build(config: EconomyConfig, rank: RankTier) -> Result<Self, EconomyError> {
        let attester = Ed25519Attester::from_seed(ATTESTER_SEED);
        let external = Collaborators {
            ledger: Box::new(InMemoryLedger::new()),
            ranks: Box::new(StaticRankLedger::new().with_rank(SEASON, HUNTER, rank)),
            shop: Box::new(FixedPriceShop::new(1, KEY_PRICES)),
            seasons: Box::new(InMemorySeasons::new().with_season(SEASON, 0, 10_000, vec![501, 502])),
        };
        let engine = Engine::new(config, MASTER, Box::new(attester.verifier()), external)?;
        Ok(Self { engine, attester })
    }

    /// Hunter call at `block`.
    pub fn call(&self, block: u64) -> CallContext {
        CallContext::new(HUNTER, block)
    }

    /// Operator master call at `block`.
    pub fn admin(&self, block: u64) -> CallContext {
        CallContext::new(MASTER, block)
    }

    /// `count` valid signatures starting at the hunter's current nonce.
    pub fn sign(&self, count: u64) -> Vec<OracleSignature> {
        self.attester
            .sign_range(&HUNTER, self.engine.nonce_of(&HUNTER), count)
    }

    /// Credit the hunter outside any engine call.
    pub fn fund(&mut self, asset: Asset, amount: Amount) {
        let mut batch = LedgerBatch::new();
        batch.mint(HUNTER, asset, amount);
        if let Err(e) = self.engine.ledger_mut().apply(&batch) {
            panic!("funding failed: {e}");
        }
    }

    pub fn balance(&self, asset: Asset) -> Amount {
        self.engine.ledger().balance_of(&HUNTER, asset)
    }

    /// Add `per_pool` monsters to every normal pool.
    pub fn seed_normal_pools(&mut self, per_pool: u32) {
        let admin = self.admin(0);
        for rank in RankTier::ALL {
            if let Err(e) = self.engine.add_monsters(admin, rank, false, per_pool) {
                panic!("seeding {rank} failed: {e}");
            }
        }
    }
}

// =============================================================================
// END-TO-END
// =============================================================================

mod tests {
    use super::*;
    use crate::events::EventData;
    use proptest::prelude::*;

    #[test]
    fn test_gate_scenario_block_100() {
        let mut fx = Fixture::new();
        fx.seed_normal_pools(3);
        fx.fund(Asset::Currency(1), 10);

        let gate_id = fx.engine.enter_gate(fx.call(100), SEASON, RankTier::E).unwrap();
        assert_eq!(fx.engine.gate(gate_id).unwrap().end_block, 124);
        assert_eq!(fx.engine.required_stone_for_clear(gate_id, 134).unwrap(), 0);

        let signatures = fx.sign(2);
        fx.engine.clear_gate(fx.call(134), gate_id, &signatures).unwrap();

        assert!(fx.engine.gate(gate_id).unwrap().cleared);
        let kinds: Vec<_> = fx
            .engine
            .events()
            .iter()
            .filter(|e| e.sender == HUNTER)
            .map(|e| matches!(e.data, EventData::GateCleared { .. }))
            .collect();
        assert_eq!(kinds, vec![false, true]);
    }

    #[test]
    fn test_full_progression_loop() {
        let mut fx = Fixture::new();
        fx.seed_normal_pools(1);
        fx.fund(Asset::GateKey(RankTier::E), 1);

        // gate rewards two E monsters
        let gate_id = fx.engine.enter_gate(fx.call(100), SEASON, RankTier::E).unwrap();
        let signatures = fx.sign(2);
        let cleared = fx.engine.clear_gate(fx.call(124), gate_id, &signatures).unwrap();
        let (e_id, amount) = cleared.rewards.monsters.iter().next().unwrap();
        assert_eq!(amount, 2);

        // return them for stone
        let stone = fx.engine.return_monster(fx.call(125), RankTier::E, &[e_id], &[2], false).unwrap();
        assert_eq!(stone, 2);
        assert_eq!(fx.balance(Asset::EssenceStone), 2);
        assert_eq!(fx.engine.nonce_of(&HUNTER), 2);

        let events = fx.engine.drain_events();
        let bytes = events.last().unwrap().to_bytes().unwrap();
        assert_eq!(crate::events::EconomyEvent::from_bytes(&bytes).unwrap(), *events.last().unwrap());
    }

    #[test]
    fn test_nonce_shared_across_operations() {
        let mut fx = Fixture::new();
        fx.seed_normal_pools(1);
        fx.fund(Asset::GateKey(RankTier::E), 1);
        let source = fx.engine.registry().pool(RankTier::E, false)[0];
        fx.fund(Asset::Monster(source), 5);
        fx.fund(Asset::EssenceStone, 1);

        let signatures = fx.sign(1);
        fx.engine
            .upgrade(fx.call(10), RankTier::E, 1, &[source], &[5], &signatures)
            .unwrap();

        // the upgrade's signature cannot be replayed for the gate
        let gate_id = fx.engine.enter_gate(fx.call(100), SEASON, RankTier::E).unwrap();
        let mut replay = signatures.clone();
        replay.extend(fx.sign(1));
        assert!(matches!(
            fx.engine.clear_gate(fx.call(124), gate_id, &replay),
            Err(EconomyError::RandomSignatureVerifyFailed { nonce: 1 })
        ));

        let fresh = fx.sign(2);
        assert!(fx.engine.clear_gate(fx.call(124), gate_id, &fresh).is_ok());
        assert_eq!(fx.engine.nonce_of(&HUNTER), 3);
    }

    #[test]
    fn test_attester_rotation() {
        let mut fx = Fixture::new();
        fx.seed_normal_pools(1);
        fx.fund(Asset::GateKey(RankTier::E), 1);
        let gate_id = fx.engine.enter_gate(fx.call(100), SEASON, RankTier::E).unwrap();

        let rotated = Ed25519Attester::from_seed([9; 32]);
        let admin = fx.admin(101);
        fx.engine.set_attester(admin, Box::new(rotated.verifier())).unwrap();

        let stale = fx.sign(2);
        assert!(fx.engine.clear_gate(fx.call(124), gate_id, &stale).is_err());

        let fresh = rotated.sign_range(&HUNTER, 0, 2);
        assert!(fx.engine.clear_gate(fx.call(124), gate_id, &fresh).is_ok());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(12))]

        #[test]
        fn test_slot_conservation(ops in proptest::collection::vec(any::<bool>(), 1..16)) {
            let mut fx = Fixture::with_hunter_rank(RankTier::S);
            fx.seed_normal_pools(1);
            fx.fund(Asset::GateKey(RankTier::E), 64);
            let capacity = fx.engine.config().gate.slots_per_hunter_rank[RankTier::S.index()];

            let mut entered = 0u32;
            let mut cleared = 0u32;
            for enter in ops {
                let active = fx.engine.hunter_gates(SEASON, &HUNTER).active;
                if enter || active.is_empty() {
                    if fx.engine.enter_gate(fx.call(100), SEASON, RankTier::E).is_ok() {
                        entered += 1;
                    }
                } else {
                    let signatures = fx.sign(2);
                    fx.engine.clear_gate(fx.call(200), active[0], &signatures).unwrap();
                    cleared += 1;
                }

                let using = fx.engine.using_slot(SEASON, &HUNTER);
                prop_assert_eq!(using, entered - cleared);
                prop_assert_eq!(fx.engine.available_slot(SEASON, &HUNTER), capacity);
                prop_assert!(using <= fx.engine.available_slot(SEASON, &HUNTER));
                prop_assert_eq!(fx.engine.remaining_slot(SEASON, &HUNTER), capacity - using);
            }
            prop_assert_eq!(fx.engine.gate_clear_count(SEASON, &HUNTER), cleared as u64);
        }
    }
}
