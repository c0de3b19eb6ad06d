//! Benchmark for particle generation and the CPU update rule.
//!
//! Run with: cargo bench --package sparkfield_core --bench store_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use sparkfield_core::{
    record_frame, simulate_step, BarrierCoordinator, FieldConfig, FramePlan, ParticleStore,
    RecordingContext, SpawnParams,
};

const PARTICLES: u32 = 65_536;

fn benchmark_initialize(c: &mut Criterion) {
    let params = SpawnParams::default();

    let mut group = c.benchmark_group("initialize");
    group.throughput(Throughput::Elements(u64::from(PARTICLES)));
    group.sample_size(20);

    group.bench_function("64K_particles", |b| {
        b.iter(|| black_box(ParticleStore::initialize(PARTICLES, black_box(0x5EED), &params)));
    });

    group.finish();
}

fn benchmark_simulate_step(c: &mut Criterion) {
    let Ok(store) = ParticleStore::initialize(PARTICLES, 0x5EED, &SpawnParams::default()) else {
        return;
    };
    let mut positions = store.positions().to_vec();

    let mut group = c.benchmark_group("simulate_step");
    group.throughput(Throughput::Elements(u64::from(PARTICLES)));

    group.bench_function("64K_particles", |b| {
        b.iter(|| {
            simulate_step(black_box(&mut positions), store.velocities());
        });
    });

    group.finish();
}

fn benchmark_record_frame(c: &mut Criterion) {
    let Ok(plan) = FramePlan::for_config(&FieldConfig::default()) else {
        return;
    };
    let mut coordinator = BarrierCoordinator::new();
    let mut ctx = RecordingContext::new();

    c.bench_function("record_frame", |b| {
        b.iter(|| {
            let frame = record_frame(&mut coordinator, &mut ctx, &plan);
            ctx.take();
            black_box(frame)
        });
    });
}

criterion_group!(
    benches,
    benchmark_initialize,
    benchmark_simulate_step,
    benchmark_record_frame,
);
criterion_main!(benches);
