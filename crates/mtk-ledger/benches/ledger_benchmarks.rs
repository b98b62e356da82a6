//! Benchmarks for mtk-ledger.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use mtk_ledger::{Address, Amount, History, ManualClock, Token, TokenConfig};

fn deploy() -> (Token, Address) {
    let owner = Address::random();
    let config = TokenConfig {
        initial_supply: Amount::from_tokens(1_000_000),
        contract_funding: Amount::from_tokens(500_000),
        ..TokenConfig::default()
    };
    let token = Token::with_clock(owner, &config, Arc::new(ManualClock::new(0))).expect("benchmark setup");
    (token, owner)
}

fn benchmark_transfer(c: &mut Criterion) {
    let (mut token, owner) = deploy();
    let to = Address::random();

    c.bench_function("transfer", |b| {
        b.iter(|| {
            token
                .transfer(&owner, &to, black_box(Amount::from_base_units(1)))
                .expect("benchmark setup");
        });
    });
}

fn benchmark_transfer_from(c: &mut Criterion) {
    let (mut token, owner) = deploy();
    let spender = Address::random();
    let to = Address::random();
    token.approve(&owner, &spender, Amount::from_tokens(100_000)).expect("benchmark setup");

    c.bench_function("transfer_from", |b| {
        b.iter(|| {
            token
                .transfer_from(&spender, &owner, &to, black_box(Amount::from_base_units(1)))
                .expect("benchmark setup");
        });
    });
}

fn benchmark_buy(c: &mut Criterion) {
    let (mut token, _) = deploy();
    let buyer = Address::random();

    c.bench_function("buy", |b| {
        b.iter(|| {
            token
                .buy(&buyer, black_box(Amount::from_base_units(1_000)))
                .expect("benchmark setup");
        });
    });
}

fn benchmark_replay(c: &mut Criterion) {
    let (mut token, owner) = deploy();
    // Pre-populate with 10k transfers
    for i in 0..10_000u64 {
        let to = Address::derive(&owner, &i.to_string());
        token.transfer(&owner, &to, Amount::from_base_units(1)).expect("benchmark setup");
    }

    c.bench_function("replay_10k_events", |b| {
        b.iter(|| {
            let history = History::replay(black_box(token.events())).expect("benchmark setup");
            black_box(history);
        });
    });
}

criterion_group!(
    benches,
    benchmark_transfer,
    benchmark_transfer_from,
    benchmark_buy,
    benchmark_replay
);
criterion_main!(benches);
