use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};

use hunter_economy::{
    ledger::{Asset, FixedPriceShop, InMemoryLedger, InMemorySeasons, LedgerBatch, StaticRankLedger},
    Address, Amount, CallContext, Collaborators, EconomyConfig, Ed25519Attester, Engine, MonsterId,
    RankTier, ReturnEntry,
};

const HUNTER: Address = Address([0x11; 20]);
const MASTER: Address = Address([0xAA; 20]);
const IDS: u32 = 1500;

/// Engine with 1,500 B monsters (normal and shadow) held by the hunter.
fn setup() -> (Engine, Vec<MonsterId>, Vec<MonsterId>, Vec<Amount>) {
    let attester = Ed25519Attester::from_seed([7; 32]);
    let external = Collaborators {
        ledger: Box::new(InMemoryLedger::new()),
        ranks: Box::new(StaticRankLedger::new()),
        shop: Box::new(FixedPriceShop::new(1, [0; 6])),
        seasons: Box::new(InMemorySeasons::new().with_season(1, 0, u64::MAX, Vec::new())),
    };
    let mut engine = Engine::new(EconomyConfig::default(), MASTER, Box::new(attester.verifier()), external)
        .expect("engine");

    let admin = CallContext::new(MASTER, 1);
    let normal = engine.add_monsters(admin, RankTier::B, false, IDS).expect("normal pool");
    let shadow = engine.add_monsters(admin, RankTier::B, true, IDS).expect("shadow pool");

    let mut rng = StdRng::seed_from_u64(42);
    let amounts: Vec<Amount> = (0..IDS).map(|_| rng.gen_range(1..=8)).collect();

    let mut batch = LedgerBatch::new();
    for (id, amount) in normal.iter().chain(&shadow).zip(amounts.iter().cycle()) {
        batch.mint(HUNTER, Asset::Monster(*id), *amount);
    }
    engine.ledger_mut().apply(&batch).expect("funding");

    (engine, normal, shadow, amounts)
}

fn bench_return_single_pool(c: &mut Criterion) {
    c.bench_function("return 1500 ids, one pool", |b| {
        b.iter_batched(
            setup,
            |(mut engine, normal, _, amounts)| {
                let call = CallContext::new(HUNTER, 10);
                black_box(engine.return_monster(call, RankTier::B, &normal, &amounts, false))
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_return_batch_two_pools(c: &mut Criterion) {
    c.bench_function("return 3000 ids, normal + shadow batch", |b| {
        b.iter_batched(
            setup,
            |(mut engine, normal, shadow, amounts)| {
                let entries = [
                    ReturnEntry { rank: RankTier::B, is_shadow: false, ids: normal, amounts: amounts.clone() },
                    ReturnEntry { rank: RankTier::B, is_shadow: true, ids: shadow, amounts },
                ];
                let call = CallContext::new(HUNTER, 10);
                black_box(engine.return_monster_batch(call, &entries))
            },
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(benches, bench_return_single_pool, bench_return_batch_two_pools);
criterion_main!(benches);
