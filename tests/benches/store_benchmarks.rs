//! # Store Benchmarks
//!
//! | Path | What is measured |
//! |------|------------------|
//! | generate | Block to update through the registry |
//! | apply | One update against a populated stream |
//! | snapshot | Deep copy of a stream with many entities |

use al_01_session_store::{AddStream, Streams, Update};
use al_tests::fixtures::{generator, init_zone, movement, npc_spawn, player_spawn};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use shared_types::Direction;

const STREAM: i64 = 1;
const CHARACTER: u32 = 0x1000_0001;

fn populated(entities: u32) -> Streams {
    let generator = generator();
    let mut streams = Streams::new();
    let _ = AddStream { id: STREAM }.modify_store(&mut streams);
    let mut blocks = vec![init_zone(CHARACTER), player_spawn(CHARACTER, 0, "Alpha Beta")];
    blocks.extend((1..=entities).map(|n| npc_spawn(0x4000_0000 + n, (n % 250) as u8 + 1)));
    for block in blocks {
        if let Some(update) = generator.generate(STREAM, Direction::Ingress, &block) {
            let _ = update.modify_store(&mut streams);
        }
    }
    streams
}

fn bench_generate(c: &mut Criterion) {
    let generator = generator();
    let block = movement(CHARACTER, 1.0);
    c.bench_function("generate_movement", |b| {
        b.iter(|| black_box(generator.generate(STREAM, Direction::Ingress, black_box(&block))))
    });
}

fn bench_apply(c: &mut Criterion) {
    let generator = generator();
    let mut group = c.benchmark_group("apply_movement");
    for entities in [10_u32, 100, 1000] {
        let mut streams = populated(entities);
        let block = movement(CHARACTER, 1.0);
        group.bench_with_input(BenchmarkId::from_parameter(entities), &entities, |b, _| {
            b.iter(|| {
                if let Some(update) = generator.generate(STREAM, Direction::Ingress, &block) {
                    black_box(update.modify_store(&mut streams).is_ok());
                }
            })
        });
    }
    group.finish();
}

fn bench_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot_stream");
    for entities in [10_u32, 100, 1000] {
        let streams = populated(entities);
        group.bench_with_input(BenchmarkId::from_parameter(entities), &entities, |b, _| {
            b.iter(|| black_box(streams.get(STREAM).cloned()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_generate, bench_apply, bench_snapshot);
criterion_main!(benches);
