//! Benchmarks for the tick path and counter cleaning
//!
//! Run with: cargo bench --bench session_tick

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use jugger_stones::{
    GameSessionBuilder, ManualClock, MemoryPreferenceStore, ModeDescriptor, Preferences, Stones,
};
use std::hint::black_box;
use web_time::Duration;

fn bench_clean(c: &mut Criterion) {
    let mut group = c.benchmark_group("CounterRange::clean");

    for (name, mode) in [
        ("forward", ModeDescriptor::bounded(100, false)),
        ("reverse", ModeDescriptor::bounded(100, true)),
        ("infinity", ModeDescriptor::unbounded()),
    ] {
        let range = mode.range();
        group.bench_function(name, |b| {
            b.iter(|| range.clean(black_box(Stones::new(12_345))));
        });
    }

    group.finish();
}

fn bench_poll(c: &mut Criterion) {
    let mut group = c.benchmark_group("GameSession::poll");

    for ticks in [1u32, 100, 1000] {
        group.bench_with_input(BenchmarkId::new("due_ticks", ticks), &ticks, |b, &ticks| {
            let clock = ManualClock::new();
            let mut session = GameSessionBuilder::new()
                .with_preference_store(MemoryPreferenceStore::new(Preferences {
                    mode: 20,
                    interval: 1000,
                    ..Preferences::default()
                }))
                .with_clock(clock.clone())
                .start_session();
            session.start();
            b.iter(|| {
                clock.advance(Duration::from_secs(u64::from(ticks)));
                let fired = session.poll();
                session.events().for_each(drop);
                black_box(fired)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_clean, bench_poll);
criterion_main!(benches);
