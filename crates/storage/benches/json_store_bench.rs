use common::{Money, NewOrder, NewOrderItem, ShippingAddress, StoreId, UserId};
use criterion::{Criterion, criterion_group, criterion_main};
use storage::{BootstrapAdmin, JsonFileStore, OrderRepository, ProductRepository};

fn open_store(dir: &tempfile::TempDir) -> JsonFileStore {
    JsonFileStore::with_bootstrap_admin(
        dir.path(),
        BootstrapAdmin {
            bcrypt_cost: 4,
            ..BootstrapAdmin::default()
        },
    )
}

fn make_order(user_id: UserId, product: &common::Product) -> NewOrder {
    NewOrder {
        user_id,
        customer_name: "Bench".to_string(),
        customer_email: "bench@example.com".to_string(),
        total: product.price.multiply(2),
        delivery_fee: Money::zero(),
        shipping_address: ShippingAddress::default(),
        items: vec![NewOrderItem {
            product_id: product.id,
            quantity: 2,
            price: product.price,
        }],
    }
}

fn bench_list_products(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);

    // Seed the files once
    rt.block_on(async {
        store.list_products(None).await.unwrap();
    });

    c.bench_function("json_store/list_products_all", |b| {
        b.iter(|| {
            rt.block_on(async {
                store.list_products(None).await.unwrap();
            });
        });
    });

    c.bench_function("json_store/list_products_by_store", |b| {
        b.iter(|| {
            rt.block_on(async {
                store.list_products(Some(StoreId::Cilka)).await.unwrap();
            });
        });
    });
}

fn bench_create_order(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    let product = rt.block_on(async {
        store
            .list_products(None)
            .await
            .unwrap()
            .into_iter()
            .next()
            .unwrap()
    });
    let user_id = UserId::new();

    c.bench_function("json_store/create_order", |b| {
        b.iter(|| {
            rt.block_on(async {
                store
                    .create_order(make_order(user_id, &product))
                    .await
                    .unwrap();
            });
        });
    });
}

criterion_group!(benches, bench_list_products, bench_create_order);
criterion_main!(benches);
