use std::collections::HashMap;

use async_trait::async_trait;
use common::{
    Category, CategoryDraft, CategoryId, CategoryUpdate, ContactMessage, ContactMessageDraft,
    NewOrder, NewUser, Order, OrderId, OrderStatus, Product, ProductDraft, ProductId,
    ProductUpdate, StoreId, UserId, UserRecord, UserUpdate,
};

use crate::Result;

/// Persistence of catalog products.
///
/// All implementations must be thread-safe (Send + Sync). Lookups that miss
/// return `Ok(None)`; deletes report whether anything was removed.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Lists products, optionally restricted to one store.
    ///
    /// No filter returns the union of both stores, newest first.
    async fn list_products(&self, store: Option<StoreId>) -> Result<Vec<Product>>;

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>>;

    async fn create_product(&self, draft: ProductDraft) -> Result<Product>;

    async fn update_product(&self, id: ProductId, update: ProductUpdate)
    -> Result<Option<Product>>;

    async fn delete_product(&self, id: ProductId) -> Result<bool>;
}

/// Persistence of product categories.
///
/// Deleting a category never touches the products that reference it.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn list_categories(&self) -> Result<Vec<Category>>;

    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>>;

    async fn get_category_by_slug(&self, slug: &str) -> Result<Option<Category>>;

    /// Fails with `Conflict` if the slug is taken.
    async fn create_category(&self, draft: CategoryDraft) -> Result<Category>;

    async fn update_category(
        &self,
        id: CategoryId,
        update: CategoryUpdate,
    ) -> Result<Option<Category>>;

    async fn delete_category(&self, id: CategoryId) -> Result<bool>;
}

/// Persistence of user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn list_users(&self) -> Result<Vec<UserRecord>>;

    async fn get_user(&self, id: UserId) -> Result<Option<UserRecord>>;

    /// Looks an account up by email, ignoring ASCII case.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>>;

    /// Fails with `Conflict` if the email is already registered.
    async fn create_user(&self, user: NewUser) -> Result<UserRecord>;

    async fn update_user(&self, id: UserId, update: UserUpdate) -> Result<Option<UserRecord>>;

    async fn delete_user(&self, id: UserId) -> Result<bool>;
}

/// Persistence of orders and their lines.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Lists orders newest first, optionally only those of one user.
    async fn list_orders(&self, user: Option<UserId>) -> Result<Vec<Order>>;

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>>;

    /// Persists the order and all of its lines as one unit: either both are
    /// visible afterwards or neither is.
    async fn create_order(&self, order: NewOrder) -> Result<Order>;

    /// Overwrites the status unconditionally.
    async fn update_order_status(&self, id: OrderId, status: OrderStatus)
    -> Result<Option<Order>>;

    async fn delete_order(&self, id: OrderId) -> Result<bool>;
}

/// Mutable key-value settings (e.g. the delivery fee).
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    async fn get_setting(&self, key: &str) -> Result<Option<serde_json::Value>>;

    async fn put_setting(&self, key: &str, value: serde_json::Value) -> Result<()>;
}

/// Messages left through the public contact form.
#[async_trait]
pub trait ContactRepository: Send + Sync {
    async fn save_message(&self, draft: ContactMessageDraft) -> Result<ContactMessage>;

    async fn list_messages(&self) -> Result<Vec<ContactMessage>>;
}

/// The full data access contract every backend implements.
pub trait Storage:
    ProductRepository
    + CategoryRepository
    + UserRepository
    + OrderRepository
    + SettingsRepository
    + ContactRepository
{
}

impl<T> Storage for T where
    T: ProductRepository
        + CategoryRepository
        + UserRepository
        + OrderRepository
        + SettingsRepository
        + ContactRepository
{
}

/// Extension trait providing convenience methods for storage backends.
#[async_trait]
pub trait StorageExt: Storage {
    /// Checks if a product exists.
    async fn product_exists(&self, id: ProductId) -> Result<bool> {
        Ok(self.get_product(id).await?.is_some())
    }

    /// Checks if a category exists.
    async fn category_exists(&self, id: CategoryId) -> Result<bool> {
        Ok(self.get_category(id).await?.is_some())
    }

    /// Resolves a set of product ids. Ids that no longer exist are absent
    /// from the map.
    async fn products_by_ids(&self, ids: &[ProductId]) -> Result<HashMap<ProductId, Product>> {
        let mut found = HashMap::with_capacity(ids.len());
        for id in ids {
            if found.contains_key(id) {
                continue;
            }
            if let Some(product) = self.get_product(*id).await? {
                found.insert(*id, product);
            }
        }
        Ok(found)
    }
}

// Blanket implementation for all Storage implementations
impl<T: Storage + ?Sized> StorageExt for T {}
