use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use vanguard_core::config::BattleConfig;
use vanguard_core::content::{actions, roster};
use vanguard_core::rng::FixedRandom;
use vanguard_core::targeting::Targeting;

fn bench_demo_battle(c: &mut Criterion) {
    let config = BattleConfig::default().with_seed(7).with_max_rounds(100);

    c.bench_function("demo_battle", |b| {
        b.iter_batched(
            || roster::demo_battle(&config).expect("demo roster"),
            |mut battle| black_box(battle.run().expect("battle runs")),
            BatchSize::SmallInput,
        )
    });
}

fn bench_turn_order(c: &mut Criterion) {
    let battle = roster::demo_battle(&BattleConfig::default()).expect("demo roster");

    c.bench_function("compute_turn_order", |b| {
        b.iter(|| black_box(battle.arena().compute_turn_order()))
    });
}

fn bench_slash(c: &mut Criterion) {
    // Fresh arena per iteration so the target never dies
    let battle = roster::demo_battle(&BattleConfig::default()).expect("demo roster");
    let actor = battle.arena().row(vanguard_core::Side::Left)[0].expect("front slot");
    let slash = actions::slash();
    let target = Targeting::single_enemy(&[0]);

    c.bench_function("slash_execute", |b| {
        b.iter_batched(
            || battle.arena().clone(),
            |mut arena| {
                let mut rng = FixedRandom::new();
                black_box(slash.execute(&mut arena, &mut rng, actor, Some(&target)))
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_demo_battle, bench_turn_order, bench_slash);
criterion_main!(benches);
