//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container. Every test creates its own
//! rows with unique keys, so they can run in parallel:
//!
//! ```bash
//! cargo test -p storage --test postgres_integration
//! ```

use std::sync::Arc;

use common::{
    Bilingual, CategoryDraft, CategoryUpdate, ContactMessageDraft, Money, NewOrder, NewOrderItem,
    NewUser, OrderStatus, ProductDraft, ProductId, ProductUpdate, Role, ShippingAddress, StoreId,
    UserUpdate,
};
use sqlx::PgPool;
use storage::{
    CategoryRepository, ContactRepository, OrderRepository, PostgresStore, ProductRepository,
    SettingsRepository, StorageError, StorageExt, UserRepository,
};
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            let temp_pool = PgPool::connect(&connection_string).await.unwrap();
            sqlx::raw_sql(include_str!(
                "../../../migrations/001_create_storefront_tables.sql"
            ))
            .execute(&temp_pool)
            .await
            .unwrap();
            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

async fn get_test_store() -> PostgresStore {
    let info = get_container_info().await;
    PostgresStore::connect(&info.connection_string, 5)
        .await
        .unwrap()
}

fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", &uuid::Uuid::new_v4().simple().to_string()[..12])
}

fn product_draft(store: StoreId, category: common::CategoryId) -> ProductDraft {
    ProductDraft {
        name: Bilingual::new("Labneh", "لبنة"),
        description: Bilingual::new("Strained yogurt", "لبنة بلدية"),
        price: Money::from_minor(1250),
        image: Some("/images/labneh.jpg".to_string()),
        category,
        weight: Some("500g".to_string()),
        origin: None,
        store,
    }
}

async fn create_user(store: &PostgresStore) -> common::UserRecord {
    store
        .create_user(NewUser {
            email: format!("{}@example.com", unique("user")),
            name: "Test User".to_string(),
            role: Role::User,
            password_hash: "$2b$04$not-a-real-hash".to_string(),
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn product_round_trip() {
    let store = get_test_store().await;
    let category = store
        .create_category(CategoryDraft {
            name: Bilingual::new("Dairy", "ألبان"),
            description: None,
            slug: unique("dairy"),
        })
        .await
        .unwrap();

    let created = store
        .create_product(product_draft(StoreId::Cilka, category.id))
        .await
        .unwrap();
    let fetched = store.get_product(created.id).await.unwrap().unwrap();
    assert_eq!(fetched, created);

    let cilka = store.list_products(Some(StoreId::Cilka)).await.unwrap();
    assert!(cilka.iter().any(|p| p.id == created.id));
    let irth = store
        .list_products(Some(StoreId::IrthBiladi))
        .await
        .unwrap();
    assert!(irth.iter().all(|p| p.id != created.id));
}

#[tokio::test]
async fn product_update_and_delete() {
    let store = get_test_store().await;
    let created = store
        .create_product(product_draft(StoreId::IrthBiladi, common::CategoryId::new()))
        .await
        .unwrap();

    let updated = store
        .update_product(
            created.id,
            ProductUpdate {
                price: Some(Money::from_minor(999)),
                origin: Some("Hebron".to_string()),
                ..ProductUpdate::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.price, Money::from_minor(999));
    assert_eq!(updated.origin.as_deref(), Some("Hebron"));
    assert_eq!(updated.name, created.name);

    assert!(store.delete_product(created.id).await.unwrap());
    assert!(!store.delete_product(created.id).await.unwrap());
    assert!(!store.product_exists(created.id).await.unwrap());
    assert!(
        store
            .update_product(ProductId::new(), ProductUpdate::default())
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn duplicate_slug_is_a_conflict() {
    let store = get_test_store().await;
    let slug = unique("spices");
    let draft = CategoryDraft {
        name: Bilingual::new("Spices", "بهارات"),
        description: Some(Bilingual::new("Ground and whole", "مطحونة وحب")),
        slug: slug.clone(),
    };

    let first = store.create_category(draft.clone()).await.unwrap();
    assert_eq!(
        store.get_category_by_slug(&slug).await.unwrap().unwrap(),
        first
    );

    let err = store.create_category(draft).await.unwrap_err();
    assert!(matches!(err, StorageError::Conflict(_)));

    let renamed = store
        .update_category(
            first.id,
            CategoryUpdate {
                name: Some(Bilingual::new("Herbs", "أعشاب")),
                ..CategoryUpdate::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(renamed.slug, slug);
    assert_eq!(renamed.name.en, "Herbs");
}

#[tokio::test]
async fn email_lookup_ignores_case_and_duplicates_conflict() {
    let store = get_test_store().await;
    let user = create_user(&store).await;

    let found = store
        .find_user_by_email(&user.user.email.to_uppercase())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.user.id, user.user.id);

    let err = store
        .create_user(NewUser {
            email: user.user.email.to_uppercase(),
            name: "Again".to_string(),
            role: Role::User,
            password_hash: "x".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Conflict(_)));

    let promoted = store
        .update_user(user.user.id, UserUpdate::role(Role::Admin))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(promoted.user.role, Role::Admin);
    assert_eq!(promoted.password_hash, user.password_hash);
}

#[tokio::test]
async fn order_with_items_is_persisted_together() {
    let store = get_test_store().await;
    let user = create_user(&store).await;
    let first = ProductId::new();
    let second = ProductId::new();

    let order = store
        .create_order(NewOrder {
            user_id: user.user.id,
            customer_name: user.user.name.clone(),
            customer_email: user.user.email.clone(),
            total: Money::from_minor(2750),
            delivery_fee: Money::from_minor(200),
            shipping_address: ShippingAddress {
                street: "1 Main St".to_string(),
                city: "Ramallah".to_string(),
                country: "Palestine".to_string(),
                postal_code: None,
                phone: Some("+970000000".to_string()),
            },
            items: vec![
                NewOrderItem {
                    product_id: first,
                    quantity: 2,
                    price: Money::from_minor(1000),
                },
                NewOrderItem {
                    product_id: second,
                    quantity: 1,
                    price: Money::from_minor(550),
                },
            ],
        })
        .await
        .unwrap();

    let fetched = store.get_order(order.id).await.unwrap().unwrap();
    assert_eq!(fetched, order);
    assert_eq!(fetched.items[0].product_id, first);
    assert_eq!(fetched.items[1].product_id, second);

    let mine = store.list_orders(Some(user.user.id)).await.unwrap();
    assert_eq!(mine.len(), 1);

    let shipped = store
        .update_order_status(order.id, OrderStatus::Shipped)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(shipped.status, OrderStatus::Shipped);
    assert_eq!(shipped.items.len(), 2);

    assert!(store.delete_order(order.id).await.unwrap());
    assert!(store.get_order(order.id).await.unwrap().is_none());
}

#[tokio::test]
async fn settings_and_messages() {
    let store = get_test_store().await;
    let key = unique("setting");

    assert!(store.get_setting(&key).await.unwrap().is_none());
    store.put_setting(&key, serde_json::json!(2.5)).await.unwrap();
    store.put_setting(&key, serde_json::json!(3)).await.unwrap();
    assert_eq!(
        store.get_setting(&key).await.unwrap(),
        Some(serde_json::json!(3))
    );

    let saved = store
        .save_message(ContactMessageDraft {
            name: "Sara".to_string(),
            email: "sara@example.com".to_string(),
            phone: None,
            subject: Some(unique("subject")),
            message: "Do you deliver to Nablus?".to_string(),
        })
        .await
        .unwrap();
    let messages = store.list_messages().await.unwrap();
    assert!(messages.contains(&saved));
}

/// Connects to a fresh schema whose tables predate the optional columns.
async fn get_legacy_store() -> PostgresStore {
    let info = get_container_info().await;
    let schema = unique("legacy").replace('-', "_");
    let url = format!(
        "{}?options=-c%20search_path%3D{}",
        info.connection_string, schema
    );

    let admin = PgPool::connect(&info.connection_string).await.unwrap();
    sqlx::raw_sql(&format!("CREATE SCHEMA {schema}"))
        .execute(&admin)
        .await
        .unwrap();
    admin.close().await;

    let setup = PgPool::connect(&url).await.unwrap();
    sqlx::raw_sql(include_str!(
        "../../../migrations/001_create_storefront_tables.sql"
    ))
    .execute(&setup)
    .await
    .unwrap();
    sqlx::raw_sql(
        "ALTER TABLE products DROP COLUMN origin; \
         ALTER TABLE categories DROP COLUMN description_en, DROP COLUMN description_ar;",
    )
    .execute(&setup)
    .await
    .unwrap();
    setup.close().await;

    PostgresStore::connect(&url, 2).await.unwrap()
}

#[tokio::test]
async fn writes_skip_columns_missing_from_the_schema() {
    let store = get_legacy_store().await;

    let category = store
        .create_category(CategoryDraft {
            name: Bilingual::new("Spices", "بهارات"),
            description: Some(Bilingual::new("Ground and whole", "مطحونة وحب")),
            slug: unique("spices"),
        })
        .await
        .unwrap();
    let fetched = store.get_category(category.id).await.unwrap().unwrap();
    assert_eq!(fetched.name, category.name);
    assert_eq!(fetched.description, None);

    let updated = store
        .update_category(
            category.id,
            CategoryUpdate {
                name: Some(Bilingual::new("Herbs", "أعشاب")),
                description: Some(Bilingual::new("Dried", "مجففة")),
                ..CategoryUpdate::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.name.en, "Herbs");
    let fetched = store.get_category(category.id).await.unwrap().unwrap();
    assert_eq!(fetched.name.en, "Herbs");
    assert_eq!(fetched.description, None);

    let mut draft = product_draft(StoreId::IrthBiladi, category.id);
    draft.origin = Some("Jericho".to_string());
    let product = store.create_product(draft).await.unwrap();
    let fetched = store.get_product(product.id).await.unwrap().unwrap();
    assert_eq!(fetched.origin, None);
    assert_eq!(fetched.weight.as_deref(), Some("500g"));
    assert_eq!(fetched.description, product.description);

    store
        .update_product(
            product.id,
            ProductUpdate {
                price: Some(Money::from_minor(1500)),
                origin: Some("Nablus".to_string()),
                ..ProductUpdate::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    let fetched = store.get_product(product.id).await.unwrap().unwrap();
    assert_eq!(fetched.price, Money::from_minor(1500));
    assert_eq!(fetched.origin, None);
}
