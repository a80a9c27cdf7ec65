//! Benchmarks for the per-poll decision path.
//!
//! Every loop iteration runs `DebounceGate::admit`, and every new card runs
//! `AccessPolicy::decide`. Both sit between two reader polls, so they should
//! stay in the nanosecond range.
//!
//! ```sh
//! cargo bench --bench policy_bench
//! cargo bench --bench policy_bench -- decide
//! ```
//!
//! `decide` compares against every entry, so the matched position in the
//! table should not change its time: `first`, `last` and `unknown` ought to
//! report the same figures for a given table size.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

use cardlock_controller::{AccessPolicy, AllowListEntry, DebounceGate};
use cardlock_core::{CardId, Decision, PollResult};

fn table(size: u8) -> Vec<AllowListEntry> {
    (0..size)
        .map(|i| AllowListEntry::new(CardId::new([i, 0x5A, 0xA5, i]), Decision::Granted))
        .collect()
}

/// Lookup time by matched position, on the built-in table.
fn bench_decide_builtin(c: &mut Criterion) {
    let mut group = c.benchmark_group("decide_builtin");
    group.throughput(Throughput::Elements(1));

    let policy = AccessPolicy::builtin();
    let cases = [
        ("first", CardId::new([0x93, 0x13, 0xF9, 0x02])),
        ("last", CardId::new([0x2C, 0x4E, 0xA8, 0x17])),
        ("unknown", CardId::new([0x00, 0x00, 0x00, 0x00])),
    ];

    for (name, card) in cases {
        group.bench_function(name, |b| {
            b.iter(|| black_box(policy.decide(black_box(card))));
        });
    }

    group.finish();
}

/// Lookup time as the table grows.
fn bench_decide_table_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("decide_table_size");
    group.throughput(Throughput::Elements(1));

    for size in [3u8, 16, 64, 255] {
        let Ok(policy) = AccessPolicy::new(table(size)) else {
            continue;
        };
        let unknown = CardId::new([0xFF, 0xFF, 0xFF, 0xFF]);

        group.bench_with_input(BenchmarkId::new("unknown", size), &policy, |b, policy| {
            b.iter(|| black_box(policy.decide(black_box(unknown))));
        });
    }

    group.finish();
}

fn bench_admit(c: &mut Criterion) {
    let mut group = c.benchmark_group("admit");
    group.throughput(Throughput::Elements(1));

    let card = CardId::new([0x93, 0x13, 0xF9, 0x02]);
    let other = CardId::new([0x34, 0x83, 0xE9, 0x74]);
    let cases = [
        ("no_card", PollResult::NoCard, Some(card)),
        ("held", PollResult::Card(card), Some(card)),
        ("new", PollResult::Card(other), Some(card)),
    ];

    for (name, poll, previous) in cases {
        group.bench_function(name, |b| {
            b.iter(|| black_box(DebounceGate::admit(black_box(poll), black_box(previous))));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_decide_builtin,
    bench_decide_table_size,
    bench_admit
);
criterion_main!(benches);
