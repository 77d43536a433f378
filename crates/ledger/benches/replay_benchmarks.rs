use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use rust_decimal::Decimal;
use stockbook_core::{ProductName, Timestamp};
use stockbook_ledger::{
    BalanceOperation, LedgerEvent, LineRange, LogEntry, Trade, derive_balance_and_stock, history,
};

/// Synthetic log: cycles through purchases, sales and deposits over a few products.
fn synthetic_log(len: usize) -> Vec<LogEntry> {
    let products: Vec<ProductName> = ["anvil", "bucket", "crate", "drill"]
        .iter()
        .map(|p| ProductName::parse(p).unwrap())
        .collect();

    (0..len)
        .map(|i| {
            let product = products[i % products.len()].clone();
            let unit_price = Decimal::new((i % 997) as i64 + 1, 2);
            let event = match i % 3 {
                0 => LedgerEvent::Purchase(Trade {
                    product,
                    unit_price,
                    quantity: 10,
                    timestamp: None,
                }),
                1 => LedgerEvent::Sale(Trade {
                    product,
                    unit_price,
                    quantity: 3,
                    timestamp: None,
                }),
                _ => LedgerEvent::balance(BalanceOperation::Add, unit_price, None),
            };
            LogEntry::from(event)
        })
        .collect()
}

/// Replay cost grows linearly with the log; every read pays it.
fn bench_replay(c: &mut Criterion) {
    let mut group = c.benchmark_group("replay");

    for len in [100usize, 1_000, 10_000] {
        let log = synthetic_log(len);
        group.throughput(Throughput::Elements(len as u64));
        group.bench_with_input(BenchmarkId::new("derive_balance_and_stock", len), &log, |b, log| {
            b.iter(|| derive_balance_and_stock(black_box(log)))
        });
    }

    group.finish();
}

fn bench_history(c: &mut Criterion) {
    let log = synthetic_log(10_000);
    let today = Timestamp::from("2025-01-01T00:00:00Z".to_string());

    c.bench_function("history/full_10k", |b| {
        b.iter(|| history(black_box(&log), LineRange::all(), &today))
    });
    c.bench_function("history/window_10k", |b| {
        b.iter(|| history(black_box(&log), LineRange::between(4_000, 4_100), &today))
    });
}

criterion_group!(benches, bench_replay, bench_history);
criterion_main!(benches);
