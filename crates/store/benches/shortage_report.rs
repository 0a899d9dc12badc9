use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use stockroom_core::{CategoryKey, StoreKey};
use stockroom_inventory::{shortage_report, Category, InventoryStore, ItemDraft, StoreRecord};
use stockroom_store::InMemoryInventoryStore;

fn seeded_store(rt: &tokio::runtime::Runtime, items: usize) -> InMemoryInventoryStore {
    let store = InMemoryInventoryStore::new();
    let key = StoreKey::new("bench").unwrap();

    rt.block_on(async {
        store
            .register_store(StoreRecord::new(key.clone(), "bench"))
            .await
            .unwrap();
        for c in 0..8i64 {
            let cat = CategoryKey::new(format!("cat-{c}")).unwrap();
            store
                .put_category(&key, Category::new(cat, format!("Category {c}"), c))
                .await
                .unwrap();
        }
        for i in 0..items {
            let cat = CategoryKey::new(format!("cat-{}", i % 8)).unwrap();
            // Roughly half the items end up short.
            let draft = ItemDraft::named(format!("item-{i}"))
                .with_stock((i % 10) as f64, 5.0);
            store.add_item(&key, &cat, draft).await.unwrap();
        }
    });

    store
}

fn bench_shortage_report(c: &mut Criterion) {
    let rt = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    let key = StoreKey::new("bench").unwrap();

    let mut group = c.benchmark_group("shortage_report");
    for size in [100usize, 1_000, 10_000] {
        let store = seeded_store(&rt, size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                let report = rt.block_on(shortage_report(&store, &key)).unwrap();
                assert!(!report.is_empty());
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_shortage_report);
criterion_main!(benches);
