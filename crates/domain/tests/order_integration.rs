//! Integration tests for checkout and order administration.
//!
//! These tests run the services against the JSON-file backend in a
//! temporary directory.

use common::{
    Bilingual, CategoryDraft, Money, OrderStatus, Product, ProductDraft, ProductId, Role,
    ShippingAddress, StoreId, User,
};
use domain::{
    AdminService, AuthConfig, AuthService, CatalogService, CheckoutItem, CheckoutRequest,
    DomainError, OrderService, RegisterRequest,
};
use secrecy::SecretString;
use storage::{BootstrapAdmin, JsonFileStore, ProductRepository};
use tempfile::TempDir;

struct Harness {
    _dir: TempDir,
    store: JsonFileStore,
    catalog: CatalogService<JsonFileStore>,
    orders: OrderService<JsonFileStore>,
    auth: AuthService<JsonFileStore>,
    admin: AdminService<JsonFileStore>,
}

fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::with_bootstrap_admin(
        dir.path(),
        BootstrapAdmin {
            bcrypt_cost: 4,
            ..BootstrapAdmin::default()
        },
    );
    let config = AuthConfig {
        jwt_secret: SecretString::from("integration-secret".to_string()),
        token_ttl: chrono::Duration::days(7),
        bcrypt_cost: 4,
    };

    Harness {
        catalog: CatalogService::new(store.clone()),
        orders: OrderService::new(store.clone()),
        auth: AuthService::new(store.clone(), config),
        admin: AdminService::new(store.clone()),
        store,
        _dir: dir,
    }
}

impl Harness {
    async fn customer(&self, email: &str) -> User {
        self.auth
            .register(RegisterRequest {
                email: email.to_string(),
                password: "secret1".to_string(),
                name: "Customer".to_string(),
            })
            .await
            .unwrap()
            .user
    }

    async fn product(&self, minor: i64, store: StoreId) -> Product {
        let category = self
            .catalog
            .list_categories()
            .await
            .unwrap()
            .into_iter()
            .next()
            .unwrap();
        self.catalog
            .create_product(ProductDraft {
                name: Bilingual::new("Sumac", "سماق"),
                description: Bilingual::new("Ground sumac", "سماق مطحون"),
                price: Money::from_minor(minor),
                image: None,
                category: category.id,
                weight: Some("250g".to_string()),
                origin: None,
                store,
            })
            .await
            .unwrap()
    }
}

fn address() -> ShippingAddress {
    ShippingAddress {
        street: "12 Al-Irsal St".to_string(),
        city: "Ramallah".to_string(),
        country: "Palestine".to_string(),
        postal_code: None,
        phone: Some("+970599000000".to_string()),
    }
}

fn checkout(items: Vec<CheckoutItem>) -> CheckoutRequest {
    CheckoutRequest {
        customer_name: "Layla".to_string(),
        customer_email: "Layla@Example.com".to_string(),
        shipping_address: address(),
        items,
    }
}

fn line(product: &Product, quantity: u32) -> CheckoutItem {
    CheckoutItem {
        product_id: product.id,
        quantity,
        price: product.price,
    }
}

mod checkout {
    use super::*;

    #[tokio::test]
    async fn total_includes_delivery_fee() {
        let h = harness();
        let customer = h.customer("layla@example.com").await;
        let dates = h.product(1000, StoreId::IrthBiladi).await;
        let zaatar = h.product(550, StoreId::Cilka).await;
        h.orders.set_delivery_fee(Money::from_minor(200)).await.unwrap();

        let order = h
            .orders
            .place_order(&customer, checkout(vec![line(&dates, 2), line(&zaatar, 1)]))
            .await
            .unwrap();

        assert_eq!(order.total.to_string(), "27.50");
        assert_eq!(order.delivery_fee, Money::from_minor(200));
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.customer_email, "layla@example.com");
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[0].product.as_ref(), Some(&dates));
    }

    #[tokio::test]
    async fn no_fee_setting_means_free_delivery() {
        let h = harness();
        let customer = h.customer("layla@example.com").await;
        let oil = h.product(6000, StoreId::Cilka).await;

        let order = h
            .orders
            .place_order(&customer, checkout(vec![line(&oil, 1)]))
            .await
            .unwrap();
        assert_eq!(order.delivery_fee, Money::zero());
        assert_eq!(order.total, Money::from_minor(6000));
    }

    #[tokio::test]
    async fn empty_cart_is_rejected() {
        let h = harness();
        let customer = h.customer("layla@example.com").await;

        let err = h
            .orders
            .place_order(&customer, checkout(vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(e) if e.has("items")));
        assert!(h.orders.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn zero_quantity_and_missing_address_are_rejected() {
        let h = harness();
        let customer = h.customer("layla@example.com").await;
        let dates = h.product(1000, StoreId::IrthBiladi).await;

        let mut request = checkout(vec![line(&dates, 0)]);
        request.shipping_address.city = " ".to_string();

        let err = h
            .orders
            .place_order(&customer, request)
            .await
            .unwrap_err();
        let DomainError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert!(errors.has("items[0].quantity"));
        assert!(errors.has("shipping_address.city"));
    }

    #[tokio::test]
    async fn stale_client_price_is_rejected() {
        let h = harness();
        let customer = h.customer("layla@example.com").await;
        let dates = h.product(1000, StoreId::IrthBiladi).await;

        let mut item = line(&dates, 1);
        item.price = Money::from_minor(1);

        let err = h
            .orders
            .place_order(&customer, checkout(vec![item]))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(e) if e.has("items[0].price")));
    }

    #[tokio::test]
    async fn unknown_product_is_rejected() {
        let h = harness();
        let customer = h.customer("layla@example.com").await;

        let err = h
            .orders
            .place_order(
                &customer,
                checkout(vec![CheckoutItem {
                    product_id: ProductId::new(),
                    quantity: 1,
                    price: Money::from_minor(500),
                }]),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(e) if e.has("items[0].product_id")));
    }

    #[tokio::test]
    async fn oversized_quantity_is_rejected_before_pricing() {
        let h = harness();
        let customer = h.customer("layla@example.com").await;
        let dates = h.product(1000, StoreId::IrthBiladi).await;

        for quantity in [3_000_000_000, u32::MAX] {
            let err = h
                .orders
                .place_order(&customer, checkout(vec![line(&dates, quantity)]))
                .await
                .unwrap_err();
            assert!(matches!(err, DomainError::Validation(e) if e.has("items[0].quantity")));
        }
        assert!(h.orders.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn total_above_storable_amount_is_rejected() {
        let h = harness();
        let customer = h.customer("layla@example.com").await;
        let gold = h.product(999_999_999_999, StoreId::Cilka).await;

        let err = h
            .orders
            .place_order(&customer, checkout(vec![line(&gold, 2)]))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(e) if e.has("items")));
    }

    #[tokio::test]
    async fn price_above_storable_amount_is_rejected() {
        let h = harness();
        let category = h.catalog.list_categories().await.unwrap()[0].id;

        let err = h
            .catalog
            .create_product(ProductDraft {
                name: Bilingual::new("Saffron", "زعفران"),
                description: Bilingual::new("Threads", "خيوط"),
                price: Money::upper_limit() + Money::from_minor(1),
                image: None,
                category,
                weight: None,
                origin: None,
                store: StoreId::Cilka,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(e) if e.has("price")));

        let err = h
            .orders
            .set_delivery_fee(Money::upper_limit() + Money::from_minor(1))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(e) if e.has("amount")));
    }

    #[tokio::test]
    async fn placed_price_survives_catalog_changes() {
        let h = harness();
        let customer = h.customer("layla@example.com").await;
        let dates = h.product(1000, StoreId::IrthBiladi).await;

        let order = h
            .orders
            .place_order(&customer, checkout(vec![line(&dates, 3)]))
            .await
            .unwrap();

        h.catalog
            .update_product(
                dates.id,
                common::ProductUpdate {
                    price: Some(Money::from_minor(1500)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let reread = h.orders.get_for(&customer, order.id).await.unwrap();
        assert_eq!(reread.items[0].price, Money::from_minor(1000));
        assert_eq!(reread.total, Money::from_minor(3000));
        assert_eq!(
            reread.items[0].product.as_ref().map(|p| p.price),
            Some(Money::from_minor(1500))
        );
    }
}

mod visibility {
    use super::*;

    #[tokio::test]
    async fn customers_only_see_their_own_orders() {
        let h = harness();
        let layla = h.customer("layla@example.com").await;
        let sami = h.customer("sami@example.com").await;
        let dates = h.product(1000, StoreId::IrthBiladi).await;

        let order = h
            .orders
            .place_order(&layla, checkout(vec![line(&dates, 1)]))
            .await
            .unwrap();

        assert_eq!(h.orders.list_for_user(layla.id).await.unwrap().len(), 1);
        assert!(h.orders.list_for_user(sami.id).await.unwrap().is_empty());

        let err = h.orders.get_for(&sami, order.id).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        let admin = User {
            role: Role::Admin,
            ..sami
        };
        assert_eq!(h.orders.get_for(&admin, order.id).await.unwrap().id, order.id);
    }
}

mod administration {
    use super::*;

    #[tokio::test]
    async fn status_can_move_in_any_direction() {
        let h = harness();
        let customer = h.customer("layla@example.com").await;
        let dates = h.product(1000, StoreId::IrthBiladi).await;
        let order = h
            .orders
            .place_order(&customer, checkout(vec![line(&dates, 1)]))
            .await
            .unwrap();

        let delivered = h
            .orders
            .update_status(order.id, OrderStatus::Delivered)
            .await
            .unwrap();
        assert_eq!(delivered.status, OrderStatus::Delivered);

        let pending = h
            .orders
            .update_status(order.id, OrderStatus::Pending)
            .await
            .unwrap();
        assert_eq!(pending.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn revenue_excludes_cancelled_orders() {
        let h = harness();
        let customer = h.customer("layla@example.com").await;
        let dates = h.product(1000, StoreId::IrthBiladi).await;

        let kept = h
            .orders
            .place_order(&customer, checkout(vec![line(&dates, 2)]))
            .await
            .unwrap();
        let cancelled = h
            .orders
            .place_order(&customer, checkout(vec![line(&dates, 5)]))
            .await
            .unwrap();
        h.orders
            .update_status(cancelled.id, OrderStatus::Cancelled)
            .await
            .unwrap();

        let stats = h.admin.stats().await.unwrap();
        assert_eq!(stats.total_orders, 2);
        assert_eq!(stats.total_revenue, kept.total);
        assert_eq!(stats.pending_orders, 1);
        assert_eq!(stats.orders_by_status[&OrderStatus::Cancelled], 1);
        assert_eq!(stats.orders_by_status[&OrderStatus::Shipped], 0);
        // Seeded admin plus the customer.
        assert_eq!(stats.total_users, 2);
    }

    #[tokio::test]
    async fn admin_cannot_delete_self() {
        let h = harness();
        let admin = h
            .admin
            .list_users()
            .await
            .unwrap()
            .into_iter()
            .find(|u| u.role.is_admin())
            .unwrap();

        let err = h.admin.delete_user(&admin, admin.id).await.unwrap_err();
        assert!(matches!(err, DomainError::SelfDeletion));

        let customer = h.customer("layla@example.com").await;
        h.admin.delete_user(&admin, customer.id).await.unwrap();
        assert_eq!(h.admin.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn role_change_is_visible_on_next_authentication() {
        let h = harness();
        let session = h
            .auth
            .register(RegisterRequest {
                email: "sami@example.com".to_string(),
                password: "secret1".to_string(),
                name: "Sami".to_string(),
            })
            .await
            .unwrap();

        h.admin
            .set_role(session.user.id, Role::Admin)
            .await
            .unwrap();

        let user = h.auth.authenticate(&session.token).await.unwrap();
        assert_eq!(user.role, Role::Admin);
    }
}

mod catalog {
    use super::*;

    #[tokio::test]
    async fn deleting_a_category_keeps_its_products() {
        let h = harness();
        let category = h
            .catalog
            .create_category(CategoryDraft {
                name: Bilingual::new("Honey", "عسل"),
                description: None,
                slug: "honey".to_string(),
            })
            .await
            .unwrap();
        let honey = h
            .catalog
            .create_product(ProductDraft {
                name: Bilingual::new("Wild Honey", "عسل بري"),
                description: Bilingual::new("Mountain honey", "عسل جبلي"),
                price: Money::from_minor(4000),
                image: None,
                category: category.id,
                weight: None,
                origin: None,
                store: StoreId::IrthBiladi,
            })
            .await
            .unwrap();

        h.catalog.delete_category(category.id).await.unwrap();

        let still_there = h.store.get_product(honey.id).await.unwrap().unwrap();
        assert_eq!(still_there.category, category.id);
    }

    #[tokio::test]
    async fn store_filter_partitions_products() {
        let h = harness();
        let all = h.catalog.list_products(None).await.unwrap();
        let irth = h
            .catalog
            .list_products(Some(StoreId::IrthBiladi))
            .await
            .unwrap();
        let cilka = h.catalog.list_products(Some(StoreId::Cilka)).await.unwrap();

        assert_eq!(all.len(), irth.len() + cilka.len());
        assert!(irth.iter().all(|p| p.store == StoreId::IrthBiladi));
        assert!(cilka.iter().all(|p| p.store == StoreId::Cilka));
    }

    #[tokio::test]
    async fn product_round_trips_through_storage() {
        let h = harness();
        let created = h.product(1250, StoreId::Cilka).await;
        let fetched = h.catalog.get_product(created.id).await.unwrap();
        assert_eq!(fetched, created);
    }
}
