//! Access store throughput benchmarks

use std::time::Duration;

use criterion::{criterion_group, criterion_main, Criterion};

use latch_core::{AccessKey, Clock, Feature, FeatureId, Subject, Timestamp};
use latch_store::AccessStore;

fn key(index: u64) -> AccessKey {
    AccessKey::new(
        Subject::new(format!("user{index}@example.com")),
        Feature::new("video"),
        FeatureId::new(format!("playlist{index}")),
    )
}

fn bench_store(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    let clock = Clock::manual(Timestamp::from_secs(1_700_000_000));
    let store = AccessStore::new(clock.clone());
    let expires = clock.now() + Duration::from_secs(3600);

    runtime.block_on(async {
        for index in 0..1024 {
            store
                .upsert_grant(key(index), expires, None)
                .await
                .unwrap();
        }
    });

    c.bench_function("upsert_grant", |b| {
        b.iter(|| {
            runtime.block_on(async {
                store.upsert_grant(key(7), expires, None).await.unwrap();
            })
        })
    });

    c.bench_function("get_grant_hit", |b| {
        let target = key(7);
        b.iter(|| {
            runtime.block_on(async {
                store.get_grant(&target).await.unwrap();
            })
        })
    });

    c.bench_function("sweep_noop", |b| {
        b.iter(|| {
            runtime.block_on(async {
                store.sweep_expired().await.unwrap();
            })
        })
    });
}

criterion_group!(benches, bench_store);
criterion_main!(benches);
