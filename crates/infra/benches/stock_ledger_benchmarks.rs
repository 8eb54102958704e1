use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::Utc;
use uuid::Uuid;

use shopstock_core::{ProductId, ShopId, TenantId, UserId};
use shopstock_infra::stock_store::{InMemoryStockStore, StockStore};
use shopstock_ledger::{MovementDraft, MovementKind, MovementRef};

/// Naive CRUD baseline: direct quantity updates, no ledger, no history.
#[derive(Debug, Clone)]
struct NaiveCrudStore {
    inner: Arc<RwLock<HashMap<(TenantId, ShopId, ProductId), i64>>>,
}

impl NaiveCrudStore {
    fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn adjust(
        &self,
        tenant_id: TenantId,
        shop_id: ShopId,
        product_id: ProductId,
        delta: i64,
    ) -> Result<(), ()> {
        let mut map = self.inner.write().unwrap();
        let quantity = map.entry((tenant_id, shop_id, product_id)).or_insert(0);
        let next = *quantity + delta;
        if next < 0 {
            return Err(());
        }
        *quantity = next;
        Ok(())
    }
}

fn sale_draft(
    tenant_id: TenantId,
    shop_id: ShopId,
    product_id: ProductId,
    quantity: i64,
) -> MovementDraft {
    MovementDraft::new(
        tenant_id,
        shop_id,
        product_id,
        -quantity,
        MovementKind::Sale,
        MovementRef::sale(Uuid::now_v7()),
        UserId::new(),
        Utc::now(),
        None,
    )
    .unwrap()
}

fn seeded_store(tenant_id: TenantId, shop_id: ShopId, product_id: ProductId) -> InMemoryStockStore {
    let store = InMemoryStockStore::new();
    store
        .apply_movement(
            MovementDraft::new(
                tenant_id,
                shop_id,
                product_id,
                1_000_000_000,
                MovementKind::Initial,
                MovementRef::initial_stock(*product_id.as_uuid()),
                UserId::new(),
                Utc::now(),
                None,
            )
            .unwrap(),
        )
        .unwrap();
    store
}

fn bench_single_movement(c: &mut Criterion) {
    let tenant_id = TenantId::new();
    let shop_id = ShopId::new();
    let product_id = ProductId::new();

    let mut group = c.benchmark_group("single_movement");

    let store = seeded_store(tenant_id, shop_id, product_id);
    group.bench_function("ledger_apply", |b| {
        b.iter(|| {
            store
                .apply_movement(black_box(sale_draft(tenant_id, shop_id, product_id, 1)))
                .unwrap()
        })
    });

    let naive = NaiveCrudStore::new();
    naive.adjust(tenant_id, shop_id, product_id, 1_000_000_000).unwrap();
    group.bench_function("naive_crud_update", |b| {
        b.iter(|| naive.adjust(tenant_id, shop_id, product_id, black_box(-1)).unwrap())
    });

    group.finish();
}

fn bench_movement_batches(c: &mut Criterion) {
    let tenant_id = TenantId::new();
    let shop_id = ShopId::new();

    let mut group = c.benchmark_group("movement_batches");
    for lines in [1usize, 8, 64] {
        let products: Vec<ProductId> = (0..lines).map(|_| ProductId::new()).collect();
        let store = InMemoryStockStore::new();
        for product_id in &products {
            store
                .apply_movement(
                    MovementDraft::new(
                        tenant_id,
                        shop_id,
                        *product_id,
                        1_000_000_000,
                        MovementKind::Initial,
                        MovementRef::initial_stock(*product_id.as_uuid()),
                        UserId::new(),
                        Utc::now(),
                        None,
                    )
                    .unwrap(),
                )
                .unwrap();
        }

        group.throughput(Throughput::Elements(lines as u64));
        group.bench_with_input(BenchmarkId::from_parameter(lines), &lines, |b, _| {
            b.iter(|| {
                let drafts: Vec<_> = products
                    .iter()
                    .map(|p| sale_draft(tenant_id, shop_id, *p, 1))
                    .collect();
                store.apply_movements(black_box(drafts)).unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_single_movement, bench_movement_batches);
criterion_main!(benches);
