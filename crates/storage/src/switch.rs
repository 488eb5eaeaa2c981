//! Backend selection.
//!
//! A [`DataStore`] is built once at startup and handed to every service. It
//! routes each call to the relational store when one is configured and to the
//! local JSON files otherwise. The [`FallbackFlag`] forces the local backend
//! at runtime without rebuilding anything.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use common::{
    Category, CategoryDraft, CategoryId, CategoryUpdate, ContactMessage, ContactMessageDraft,
    NewOrder, NewUser, Order, OrderId, OrderStatus, Product, ProductDraft, ProductId,
    ProductUpdate, StoreId, UserId, UserRecord, UserUpdate,
};

use crate::repository::{
    CategoryRepository, ContactRepository, OrderRepository, ProductRepository,
    SettingsRepository, Storage, UserRepository,
};
use crate::{JsonFileStore, PostgresStore, Result};

/// Shared runtime switch that forces the local backend.
#[derive(Debug, Clone, Default)]
pub struct FallbackFlag(Arc<AtomicBool>);

impl FallbackFlag {
    pub fn new(forced: bool) -> Self {
        Self(Arc::new(AtomicBool::new(forced)))
    }

    pub fn is_forced(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub fn set(&self, forced: bool) {
        self.0.store(forced, Ordering::Relaxed);
    }
}

/// Which backend serves a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Local,
    Relational,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Local => "local",
            Backend::Relational => "relational",
        }
    }
}

/// Dual-mode data access.
#[derive(Clone)]
pub struct DataStore {
    local: JsonFileStore,
    relational: Option<PostgresStore>,
    force_fallback: FallbackFlag,
}

impl DataStore {
    pub fn new(
        local: JsonFileStore,
        relational: Option<PostgresStore>,
        force_fallback: FallbackFlag,
    ) -> Self {
        Self {
            local,
            relational,
            force_fallback,
        }
    }

    /// A store that only ever uses the local files.
    pub fn local_only(local: JsonFileStore) -> Self {
        Self::new(local, None, FallbackFlag::default())
    }

    /// The backend the next call will be routed to.
    pub fn backend(&self) -> Backend {
        match &self.relational {
            Some(_) if !self.force_fallback.is_forced() => Backend::Relational,
            _ => Backend::Local,
        }
    }

    pub fn fallback_flag(&self) -> &FallbackFlag {
        &self.force_fallback
    }

    pub fn local(&self) -> &JsonFileStore {
        &self.local
    }

    pub fn relational(&self) -> Option<&PostgresStore> {
        self.relational.as_ref()
    }

    fn route(&self, op: &'static str) -> &dyn Storage {
        let backend = self.backend();
        metrics::counter!(
            "storage_backend_calls_total",
            "backend" => backend.as_str(),
            "op" => op
        )
        .increment(1);

        match (&self.relational, backend) {
            (Some(pg), Backend::Relational) => pg,
            _ => &self.local,
        }
    }
}

#[async_trait]
impl ProductRepository for DataStore {
    async fn list_products(&self, store: Option<StoreId>) -> Result<Vec<Product>> {
        self.route("list_products").list_products(store).await
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        self.route("get_product").get_product(id).await
    }

    async fn create_product(&self, draft: ProductDraft) -> Result<Product> {
        self.route("create_product").create_product(draft).await
    }

    async fn update_product(
        &self,
        id: ProductId,
        update: ProductUpdate,
    ) -> Result<Option<Product>> {
        self.route("update_product").update_product(id, update).await
    }

    async fn delete_product(&self, id: ProductId) -> Result<bool> {
        self.route("delete_product").delete_product(id).await
    }
}

#[async_trait]
impl CategoryRepository for DataStore {
    async fn list_categories(&self) -> Result<Vec<Category>> {
        self.route("list_categories").list_categories().await
    }

    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>> {
        self.route("get_category").get_category(id).await
    }

    async fn get_category_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        self.route("get_category_by_slug")
            .get_category_by_slug(slug)
            .await
    }

    async fn create_category(&self, draft: CategoryDraft) -> Result<Category> {
        self.route("create_category").create_category(draft).await
    }

    async fn update_category(
        &self,
        id: CategoryId,
        update: CategoryUpdate,
    ) -> Result<Option<Category>> {
        self.route("update_category")
            .update_category(id, update)
            .await
    }

    async fn delete_category(&self, id: CategoryId) -> Result<bool> {
        self.route("delete_category").delete_category(id).await
    }
}

#[async_trait]
impl UserRepository for DataStore {
    async fn list_users(&self) -> Result<Vec<UserRecord>> {
        self.route("list_users").list_users().await
    }

    async fn get_user(&self, id: UserId) -> Result<Option<UserRecord>> {
        self.route("get_user").get_user(id).await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        self.route("find_user_by_email")
            .find_user_by_email(email)
            .await
    }

    async fn create_user(&self, user: NewUser) -> Result<UserRecord> {
        self.route("create_user").create_user(user).await
    }

    async fn update_user(&self, id: UserId, update: UserUpdate) -> Result<Option<UserRecord>> {
        self.route("update_user").update_user(id, update).await
    }

    async fn delete_user(&self, id: UserId) -> Result<bool> {
        self.route("delete_user").delete_user(id).await
    }
}

#[async_trait]
impl OrderRepository for DataStore {
    async fn list_orders(&self, user: Option<UserId>) -> Result<Vec<Order>> {
        self.route("list_orders").list_orders(user).await
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>> {
        self.route("get_order").get_order(id).await
    }

    async fn create_order(&self, order: NewOrder) -> Result<Order> {
        self.route("create_order").create_order(order).await
    }

    async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>> {
        self.route("update_order_status")
            .update_order_status(id, status)
            .await
    }

    async fn delete_order(&self, id: OrderId) -> Result<bool> {
        self.route("delete_order").delete_order(id).await
    }
}

#[async_trait]
impl SettingsRepository for DataStore {
    async fn get_setting(&self, key: &str) -> Result<Option<serde_json::Value>> {
        self.route("get_setting").get_setting(key).await
    }

    async fn put_setting(&self, key: &str, value: serde_json::Value) -> Result<()> {
        self.route("put_setting").put_setting(key, value).await
    }
}

#[async_trait]
impl ContactRepository for DataStore {
    async fn save_message(&self, draft: ContactMessageDraft) -> Result<ContactMessage> {
        self.route("save_message").save_message(draft).await
    }

    async fn list_messages(&self) -> Result<Vec<ContactMessage>> {
        self.route("list_messages").list_messages().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BootstrapAdmin;
    use common::Bilingual;
    use sqlx::postgres::PgPoolOptions;

    fn local_store(dir: &tempfile::TempDir) -> JsonFileStore {
        JsonFileStore::with_bootstrap_admin(
            dir.path(),
            BootstrapAdmin {
                bcrypt_cost: 4,
                ..BootstrapAdmin::default()
            },
        )
    }

    /// A relational store whose pool never connects; only routing is
    /// exercised through it.
    fn unreachable_relational() -> PostgresStore {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://nobody@127.0.0.1:1/none")
            .unwrap();
        PostgresStore::new(pool)
    }

    #[tokio::test]
    async fn local_only_store_uses_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = DataStore::local_only(local_store(&dir));

        assert_eq!(store.backend(), Backend::Local);
        let products = store.list_products(None).await.unwrap();
        assert!(!products.is_empty());
    }

    #[tokio::test]
    async fn relational_store_is_preferred_unless_forced() {
        let dir = tempfile::tempdir().unwrap();
        let flag = FallbackFlag::new(false);
        let store = DataStore::new(
            local_store(&dir),
            Some(unreachable_relational()),
            flag.clone(),
        );
        assert_eq!(store.backend(), Backend::Relational);

        flag.set(true);
        assert_eq!(store.backend(), Backend::Local);

        // Served by the local files even though a relational store exists.
        let category = store
            .create_category(CategoryDraft {
                name: Bilingual::new("Nuts", "مكسرات"),
                description: None,
                slug: "nuts".to_string(),
            })
            .await
            .unwrap();
        assert!(store.local().get_category(category.id).await.unwrap().is_some());

        flag.set(false);
        assert_eq!(store.backend(), Backend::Relational);
    }

    #[test]
    fn flag_clones_share_state() {
        let flag = FallbackFlag::default();
        let other = flag.clone();
        other.set(true);
        assert!(flag.is_forced());
    }
}
