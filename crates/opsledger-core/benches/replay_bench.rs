//! Stock replay performance benchmarks.
//!
//! Run with: cargo bench -p opsledger-core

#![allow(missing_docs)]

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use opsledger_core::{replay, Item, LegacyKind, Location, Transfer, RECONCILIATION_MARKER};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap()
}

fn generate_items(count: usize) -> Vec<Item> {
    (0..count)
        .map(|i| Item::new(format!("B{i:05}"), format!("Item {i}"), dec!(10000)))
        .collect()
}

/// Generate a log cycling through every kind of transfer.
fn generate_log(num_items: usize, num_transfers: usize) -> Vec<Transfer> {
    (0..num_transfers)
        .map(|i| {
            let barcode = format!("B{:05}", i % num_items);
            let at = start() + Duration::minutes(i as i64);
            let t = Transfer::new(i.to_string(), at, barcode, Decimal::from(1 + i % 7));
            match i % 5 {
                0 => t.with_legacy(LegacyKind::In),
                1 => t
                    .with_from(Location::MainWarehouse)
                    .with_to(Location::Person("Omar".into())),
                2 => t
                    .with_from(Location::Person("Omar".into()))
                    .with_to(Location::Customer("Metro".into())),
                3 => t
                    .with_from(Location::MainWarehouse)
                    .with_to(Location::Customer("Metro".into()))
                    .with_description(RECONCILIATION_MARKER),
                _ => t.with_legacy(LegacyKind::Out),
            }
        })
        .collect()
}

fn bench_replay(c: &mut Criterion) {
    let mut group = c.benchmark_group("replay");
    let items = generate_items(200);

    for size in [100, 1_000, 10_000] {
        let log = generate_log(items.len(), size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::from_parameter(size), &log, |b, log| {
            b.iter(|| black_box(replay(&items, log)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_replay);
criterion_main!(benches);
