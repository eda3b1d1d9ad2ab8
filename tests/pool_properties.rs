//! Property and concurrency tests for the borrow/return protocol.

use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

use loanpool::{KeyedObjectPool, ObjectPool, PoolConfiguration, PoolError, SerialCounter, power_bank_pool};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Borrow,
    Return(usize),
    Add,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Borrow),
        2 => (0usize..16).prop_map(Op::Return),
        1 => Just(Op::Add),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn size_never_exceeds_max(
        initial in 0usize..4,
        extra in 0usize..4,
        ops in proptest::collection::vec(op(), 1..60),
    ) {
        let max = initial + extra;
        let config = PoolConfiguration::new().with_initial_size(initial).with_max_size(max);
        let pool = ObjectPool::new(|| 0u8, config).unwrap();
        let mut loans = Vec::new();

        for op in ops {
            match op {
                Op::Borrow => match pool.borrow_object() {
                    Ok(loan) => loans.push(loan),
                    Err(err) => {
                        prop_assert_eq!(err, PoolError::Exhausted);
                        prop_assert_eq!(pool.len(), max);
                        prop_assert_eq!(pool.available_count(), 0);
                    }
                },
                Op::Return(idx) if !loans.is_empty() => {
                    let loan = loans.swap_remove(idx % loans.len());
                    prop_assert!(pool.try_return_object(&loan).is_ok());
                }
                Op::Return(_) => {}
                Op::Add => {
                    let before = pool.len();
                    let added = pool.add_object();
                    prop_assert_eq!(added.is_some(), before < max);
                }
            }

            prop_assert!(pool.len() <= max);
            prop_assert_eq!(pool.active_count(), loans.len());
        }
    }

    #[test]
    fn serials_strictly_increase(pools in 1usize..4, borrows in 1usize..12) {
        let counter = Arc::new(SerialCounter::new());
        let config = PoolConfiguration::new().with_initial_size(0).with_max_size(borrows);
        let pools: Vec<_> = (0..pools)
            .map(|_| power_bank_pool(config.clone(), Arc::clone(&counter)).unwrap())
            .collect();

        let mut last = 0;
        for round in 0..borrows {
            let bank = pools[round % pools.len()].borrow_object().unwrap();
            prop_assert!(bank.serial_number() > last);
            last = bank.serial_number();
        }
        prop_assert_eq!(counter.last_issued(), last);
    }
}

#[test]
fn concurrent_borrowers_never_share_a_loan() {
    const THREADS: usize = 8;
    const ROUNDS: usize = 2_000;

    let config = PoolConfiguration::new().with_initial_size(2).with_max_size(4);
    let counter = Arc::new(SerialCounter::new());
    let pool = power_bank_pool(config, Arc::clone(&counter)).unwrap();
    let held = Arc::new(parking_lot::Mutex::new(HashSet::new()));
    let barrier = Arc::new(Barrier::new(THREADS));

    let workers: Vec<_> = (0..THREADS)
        .map(|_| {
            let pool = pool.clone();
            let held = Arc::clone(&held);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..ROUNDS {
                    let Some(bank) = pool.try_borrow_object() else {
                        thread::yield_now();
                        continue;
                    };
                    assert!(
                        held.lock().insert(bank.serial_number()),
                        "bank {} lent twice",
                        bank.serial_number()
                    );
                    assert!(pool.len() <= pool.max_size());
                    held.lock().remove(&bank.serial_number());
                    pool.return_object(&bank);
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().unwrap();
    }

    assert!(pool.len() <= 4);
    assert_eq!(counter.last_issued(), pool.len() as u64);
    assert_eq!(pool.active_count(), 0);
}

#[test]
fn concurrent_keyed_borrows_hand_each_key_to_one_caller() {
    let keys: Vec<_> = (0..4).map(|n| format!("{n:04}")).collect();
    let pool = KeyedObjectPool::new(
        keys.iter().cloned().zip(0u32..),
        PoolConfiguration::new().with_name("keyed-stress"),
    )
    .unwrap();
    let barrier = Arc::new(Barrier::new(16));

    let workers: Vec<_> = (0..16)
        .map(|_| {
            let pool = pool.clone();
            let keys = keys.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                keys.iter().filter(|key| pool.try_borrow_object(key).is_some()).count()
            })
        })
        .collect();

    let granted: usize = workers.into_iter().map(|w| w.join().unwrap()).sum();
    assert_eq!(granted, keys.len());
    assert_eq!(pool.active_count(), keys.len());
}
