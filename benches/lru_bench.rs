use cachegroup::{BoxError, CacheConfig, CacheValue, GetterFn, Group, LruStore};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tokio::runtime::Runtime;

fn keys(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("key-{:06}", i)).collect()
}

fn bench_store_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_add");
    let value = CacheValue::from_vec(b"0123456789abcdef".to_vec());

    for budget in [0usize, 16 << 10] {
        let keys = keys(4096);
        group.bench_with_input(BenchmarkId::from_parameter(budget), &budget, |b, &budget| {
            b.iter(|| {
                let store = LruStore::new(CacheConfig::with_max_bytes(budget));
                for key in &keys {
                    store.add(key, value.clone());
                }
                black_box(store.size_bytes())
            })
        });
    }
    group.finish();
}

fn bench_store_get(c: &mut Criterion) {
    let store = LruStore::new(CacheConfig::unbounded());
    let keys = keys(4096);
    for key in &keys {
        store.add(key, CacheValue::copy_from_slice(key.as_bytes()));
    }

    c.bench_function("store_get_hit", |b| {
        let mut i = 0;
        b.iter(|| {
            i = (i + 1) % keys.len();
            black_box(store.get(&keys[i]))
        })
    });

    c.bench_function("store_get_miss", |b| {
        b.iter(|| black_box(store.get("absent")))
    });
}

fn bench_group_hit(c: &mut Criterion) {
    let rt = Runtime::new().expect("tokio runtime");
    let group = Group::new(
        "bench",
        0,
        GetterFn::new(|key: String| async move { Ok::<_, BoxError>(key.into_bytes()) }),
    );
    rt.block_on(async {
        for key in keys(1024) {
            let _ = group.get(&key).await;
        }
    });

    let keys = keys(1024);
    c.bench_function("group_get_local_hit", |b| {
        let mut i = 0;
        b.to_async(&rt).iter(|| {
            i = (i + 1) % keys.len();
            let key = keys[i].clone();
            let group = group.clone();
            async move { black_box(group.get(&key).await) }
        })
    });
}

criterion_group!(benches, bench_store_add, bench_store_get, bench_group_hit);
criterion_main!(benches);
