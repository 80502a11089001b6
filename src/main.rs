//! Hunter Economy Demo
//!
//! Runs one hunter through a season against the in-memory collaborators:
//! enter a gate, clear it, upgrade, attempt an arise and return the rest.
//! Set `HUNTER_ECONOMY_CONFIG` to load tables from a JSON file and
//! `RUST_LOG` to change verbosity.

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use hunter_economy::{
    ledger::{Asset, FixedPriceShop, InMemoryLedger, InMemorySeasons, LedgerBatch, StaticRankLedger},
    registry::AriseLink,
    Address, CallContext, Collaborators, EconomyConfig, Ed25519Attester, Engine, RankTier, VERSION,
};

const SEASON: u32 = 1;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Hunter Economy v{}", VERSION);

    let config = EconomyConfig::from_env().context("loading economy config")?;
    let master = Address::new([0xAA; 20]);
    let hunter = Address::new([0x11; 20]);
    let attester = Ed25519Attester::from_seed([7; 32]);

    let external = Collaborators {
        ledger: Box::new(
            InMemoryLedger::new()
                .with_balance(hunter, Asset::Currency(1), 1_000)
                .with_balance(hunter, Asset::EssenceStone, 100),
        ),
        ranks: Box::new(StaticRankLedger::new().with_rank(SEASON, hunter, RankTier::C)),
        shop: Box::new(FixedPriceShop::new(1, [10, 20, 40, 80, 160, 320])),
        seasons: Box::new(InMemorySeasons::new().with_season(SEASON, 0, 100_000, vec![9001, 9002])),
    };
    let mut engine = Engine::new(config, master, Box::new(attester.verifier()), external)?;

    demo_season(&mut engine, &attester, master, hunter)?;

    let events = engine.drain_events();
    info!("{} events, state hash {}", events.len(), hex::encode(engine.state_hash()));
    if let Some(last) = events.last() {
        info!("Last event: {}", last.to_json()?);
    }
    Ok(())
}

fn demo_season(engine: &mut Engine, attester: &Ed25519Attester, master: Address, hunter: Address) -> Result<()> {
    let admin = CallContext::new(master, 1);
    for rank in RankTier::ALL {
        engine.add_monsters(admin, rank, false, 4)?;
    }
    let shadow = engine.add_monster(admin, RankTier::B, true)?;
    let before = engine.registry().pool(RankTier::C, false)[0];
    engine.set_arise_link(admin, AriseLink { next_rank: RankTier::B, before_id: before, next_id: shadow })?;

    let sign = |engine: &Engine, count: u64| attester.sign_range(&hunter, engine.nonce_of(&hunter), count);

    // Gate: enter at 100, skip part of the wait, clear early
    let gate_id = engine.enter_gate(CallContext::new(hunter, 100), SEASON, RankTier::C)?;
    engine.boost_gate(CallContext::new(hunter, 110), gate_id, 4)?;
    let stone = engine.required_stone_for_clear(gate_id, 120)?;
    info!("Gate {} needs {} stone at block 120", gate_id, stone);

    let rolls = engine.config().gate.rewards_per_rank[RankTier::C.index()].total();
    let signatures = sign(&*engine, rolls);
    let cleared = engine.clear_gate(CallContext::new(hunter, 120), gate_id, &signatures)?;
    info!(
        "Cleared gate {}: {} monsters, {} packs, {} stone",
        gate_id,
        cleared.rewards.monsters.total(),
        cleared.rewards.season_packs.total(),
        cleared.stone_reward
    );

    // Upgrade: five C monsters into one B
    let source = engine.registry().pool(RankTier::C, false)[1];
    let mut batch = LedgerBatch::new();
    batch.mint(hunter, Asset::Monster(source), 5);
    batch.mint(hunter, Asset::Monster(before), 1);
    engine.ledger_mut().apply(&batch)?;

    let signatures = sign(&*engine, 1);
    engine.upgrade(CallContext::new(hunter, 130), RankTier::C, 1, &[source], &[5], &signatures)?;

    // Arise: up to three attempts, reclaim whatever was not used
    let signatures = sign(&*engine, 3);
    let outcome = engine.arise(CallContext::new(hunter, 140), RankTier::B, before, 3, &signatures)?;
    info!("Arise success: {} after {} attempts", outcome.is_success, outcome.arose_count);
    if outcome.refundable_stone > 0 {
        engine.reclaim_arise_stone(CallContext::new(hunter, 141))?;
    }

    // Return every rewarded C monster
    let pool = engine.registry().pool(RankTier::C, false).to_vec();
    let held: Vec<(u64, u128)> = pool
        .into_iter()
        .map(|id| (id, engine.ledger().balance_of(&hunter, Asset::Monster(id))))
        .filter(|(_, amount)| *amount > 0)
        .collect();
    if !held.is_empty() {
        let (ids, amounts): (Vec<_>, Vec<_>) = held.into_iter().unzip();
        let stone = engine.return_monster(CallContext::new(hunter, 150), RankTier::C, &ids, &amounts, false)?;
        info!("Returned {} C monster ids for {} stone", ids.len(), stone);
    }

    info!(
        "Hunter {} ends with {} essence stone",
        hunter,
        engine.ledger().balance_of(&hunter, Asset::EssenceStone)
    );
    Ok(())
}
