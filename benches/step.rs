//! Benchmarks for the per-frame update path.

use ballistics_sim::SimWorld;
use criterion::{criterion_group, criterion_main, BatchSize, Criterion};

const GRAVITY: f64 = 9.81;

fn full_world() -> SimWorld {
    let mut sim = SimWorld::new();
    for i in 0..10 {
        let angle = 20.0 + i as f64 * 6.0;
        sim.launch(0.0, 0.0, 30.0, angle, 5.0, 2.0).unwrap();
    }
    sim
}

fn bench_update(c: &mut Criterion) {
    c.bench_function("update_10_projectiles", |b| {
        b.iter_batched_ref(
            full_world,
            |sim| sim.update(0.05, GRAVITY, true),
            BatchSize::SmallInput,
        );
    });

    c.bench_function("update_10_projectiles_100_frames", |b| {
        b.iter_batched_ref(
            full_world,
            |sim| {
                for _ in 0..100 {
                    sim.update(0.05, GRAVITY, true);
                }
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_snapshot(c: &mut Criterion) {
    c.bench_function("snapshot_json", |b| {
        let mut sim = full_world();
        sim.update(0.05, GRAVITY, true);
        b.iter(|| sim.snapshot_json());
    });
}

criterion_group!(benches, bench_update, bench_snapshot);
criterion_main!(benches);
