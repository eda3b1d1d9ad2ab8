// Borrow/return overhead for both identification strategies.

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use loanpool::{KeyedObjectPool, ObjectPool, PoolConfiguration};

fn scan_pool(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan");
    for size in [1usize, 16, 128] {
        let config = PoolConfiguration::new().with_initial_size(size).with_max_size(size);
        let pool = ObjectPool::new(|| [0u8; 64], config).unwrap();
        // Keep all but the last entry busy so every borrow scans the whole pool.
        let _held: Vec<_> = (1..size).filter_map(|_| pool.try_borrow_object()).collect();

        group.bench_function(format!("borrow_return/{size}"), |b| {
            b.iter(|| {
                let loan = pool.borrow_object().unwrap();
                pool.return_object(black_box(&loan));
            })
        });
    }
    group.finish();
}

fn keyed_pool(c: &mut Criterion) {
    let keys: Vec<_> = (0..128).map(|n| format!("{n:04}")).collect();
    let pool = KeyedObjectPool::new(
        keys.iter().cloned().zip(0u64..),
        PoolConfiguration::new().with_name("bench"),
    )
    .unwrap();
    let key = &keys[keys.len() / 2];

    c.bench_function("keyed/borrow_return", |b| {
        b.iter(|| {
            let loan = pool.borrow_object(black_box(key)).unwrap();
            black_box(&loan);
            pool.return_object(key);
        })
    });
}

criterion_group!(benches, scan_pool, keyed_pool);
criterion_main!(benches);
