use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::{
    Category, CategoryDraft, CategoryId, CategoryUpdate, ContactMessage, ContactMessageDraft,
    MessageId, NewOrder, NewUser, Order, OrderId, OrderStatus, Product, ProductDraft, ProductId,
    ProductUpdate, StoreId, UserId, UserRecord, UserUpdate,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::repository::{
    CategoryRepository, ContactRepository, OrderRepository, ProductRepository,
    SettingsRepository, UserRepository,
};
use crate::seed::{self, BootstrapAdmin};
use crate::{Result, StorageError};

/// File holding user accounts.
pub const USERS_FILE: &str = "local-db.json";

/// File holding products, categories, orders, settings and contact messages.
pub const STORE_FILE: &str = "local-store.json";

/// On-disk layout of [`USERS_FILE`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsersDocument {
    #[serde(default)]
    pub users: Vec<UserRecord>,
}

/// On-disk layout of [`STORE_FILE`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreDocument {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub orders: Vec<Order>,
    #[serde(default)]
    pub settings: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub messages: Vec<ContactMessage>,
}

/// Local JSON-file backend.
///
/// Every read parses a whole file and every write replaces a whole file
/// (temp file + rename, so readers never observe a half-written document).
/// Mutations are serialized through one writer lock, so concurrent
/// read-modify-write cycles within a process cannot lose updates. Other
/// processes editing the same files are not coordinated with.
#[derive(Clone)]
pub struct JsonFileStore {
    users_path: PathBuf,
    store_path: PathBuf,
    admin: Arc<BootstrapAdmin>,
    writer: Arc<Mutex<()>>,
}

impl JsonFileStore {
    /// Creates a store rooted at `dir`. Files are created and seeded lazily.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self::with_bootstrap_admin(dir, BootstrapAdmin::default())
    }

    /// Creates a store whose users file is seeded with the given admin.
    pub fn with_bootstrap_admin(dir: impl AsRef<Path>, admin: BootstrapAdmin) -> Self {
        let dir = dir.as_ref();
        Self {
            users_path: dir.join(USERS_FILE),
            store_path: dir.join(STORE_FILE),
            admin: Arc::new(admin),
            writer: Arc::new(Mutex::new(())),
        }
    }

    pub fn users_path(&self) -> &Path {
        &self.users_path
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    async fn read_users(&self) -> Result<UsersDocument> {
        let admin = self.admin.clone();
        self.read(&self.users_path, move || admin.users_document(Utc::now()))
            .await
    }

    async fn read_store(&self) -> Result<StoreDocument> {
        self.read(&self.store_path, || Ok(seed::store_document(Utc::now())))
            .await
    }

    async fn mutate_users<R: Send>(
        &self,
        f: impl FnOnce(&mut UsersDocument) -> Result<R> + Send,
    ) -> Result<R> {
        let admin = self.admin.clone();
        self.mutate(
            &self.users_path,
            move || admin.users_document(Utc::now()),
            f,
        )
        .await
    }

    async fn mutate_store<R: Send>(
        &self,
        f: impl FnOnce(&mut StoreDocument) -> Result<R> + Send,
    ) -> Result<R> {
        self.mutate(
            &self.store_path,
            || Ok(seed::store_document(Utc::now())),
            f,
        )
        .await
    }

    async fn read<T>(
        &self,
        path: &Path,
        seed: impl FnOnce() -> Result<T> + Send + 'static,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
    {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let _guard = self.writer.lock().await;
                read_or_seed(path, seed).await
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn mutate<T, R>(
        &self,
        path: &Path,
        seed: impl FnOnce() -> Result<T> + Send + 'static,
        f: impl FnOnce(&mut T) -> Result<R> + Send,
    ) -> Result<R>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        R: Send,
    {
        let _guard = self.writer.lock().await;
        let mut doc = read_or_seed(path, seed).await?;
        let out = f(&mut doc)?;
        write_atomic(path, &doc).await?;
        Ok(out)
    }
}

/// Reads the document, seeding the file first if it does not exist yet.
/// Callers must hold the writer lock.
///
/// The seed runs on the blocking pool since it may hash a password.
async fn read_or_seed<T>(
    path: &Path,
    seed: impl FnOnce() -> Result<T> + Send + 'static,
) -> Result<T>
where
    T: Serialize + DeserializeOwned + Send + 'static,
{
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            let doc = tokio::task::spawn_blocking(seed).await??;
            write_atomic(path, &doc).await?;
            tracing::info!(path = %path.display(), "seeded local data file");
            Ok(doc)
        }
        Err(e) => Err(e.into()),
    }
}

async fn write_atomic<T: Serialize>(path: &Path, doc: &T) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }
    let bytes = serde_json::to_vec_pretty(doc)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

fn newest_first<T>(items: &mut [T], created_at: impl Fn(&T) -> chrono::DateTime<Utc>) {
    items.sort_by_key(|item| std::cmp::Reverse(created_at(item)));
}

#[async_trait]
impl ProductRepository for JsonFileStore {
    async fn list_products(&self, store: Option<StoreId>) -> Result<Vec<Product>> {
        let doc = self.read_store().await?;
        let mut products: Vec<Product> = doc
            .products
            .into_iter()
            .filter(|p| store.is_none_or(|s| p.store == s))
            .collect();
        newest_first(&mut products, |p| p.created_at);
        Ok(products)
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        let doc = self.read_store().await?;
        Ok(doc.products.into_iter().find(|p| p.id == id))
    }

    async fn create_product(&self, draft: ProductDraft) -> Result<Product> {
        let product = draft.into_product(ProductId::new(), Utc::now());
        self.mutate_store(|doc| {
            doc.products.push(product.clone());
            Ok(product)
        })
        .await
    }

    async fn update_product(
        &self,
        id: ProductId,
        update: ProductUpdate,
    ) -> Result<Option<Product>> {
        self.mutate_store(|doc| {
            Ok(doc.products.iter_mut().find(|p| p.id == id).map(|product| {
                update.apply_to(product, Utc::now());
                product.clone()
            }))
        })
        .await
    }

    async fn delete_product(&self, id: ProductId) -> Result<bool> {
        self.mutate_store(|doc| {
            let before = doc.products.len();
            doc.products.retain(|p| p.id != id);
            Ok(doc.products.len() != before)
        })
        .await
    }
}

#[async_trait]
impl CategoryRepository for JsonFileStore {
    async fn list_categories(&self) -> Result<Vec<Category>> {
        let mut categories = self.read_store().await?.categories;
        categories.sort_by(|a, b| a.name.en.cmp(&b.name.en));
        Ok(categories)
    }

    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>> {
        let doc = self.read_store().await?;
        Ok(doc.categories.into_iter().find(|c| c.id == id))
    }

    async fn get_category_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        let doc = self.read_store().await?;
        Ok(doc.categories.into_iter().find(|c| c.slug == slug))
    }

    async fn create_category(&self, draft: CategoryDraft) -> Result<Category> {
        let category = draft.into_category(CategoryId::new(), Utc::now());
        self.mutate_store(|doc| {
            if doc.categories.iter().any(|c| c.slug == category.slug) {
                return Err(StorageError::Conflict(format!(
                    "slug '{}' is already in use",
                    category.slug
                )));
            }
            doc.categories.push(category.clone());
            Ok(category)
        })
        .await
    }

    async fn update_category(
        &self,
        id: CategoryId,
        update: CategoryUpdate,
    ) -> Result<Option<Category>> {
        self.mutate_store(|doc| {
            if let Some(slug) = &update.slug
                && doc.categories.iter().any(|c| c.id != id && &c.slug == slug)
            {
                return Err(StorageError::Conflict(format!(
                    "slug '{slug}' is already in use"
                )));
            }
            Ok(doc.categories.iter_mut().find(|c| c.id == id).map(|category| {
                update.apply_to(category, Utc::now());
                category.clone()
            }))
        })
        .await
    }

    async fn delete_category(&self, id: CategoryId) -> Result<bool> {
        self.mutate_store(|doc| {
            let before = doc.categories.len();
            doc.categories.retain(|c| c.id != id);
            Ok(doc.categories.len() != before)
        })
        .await
    }
}

#[async_trait]
impl UserRepository for JsonFileStore {
    async fn list_users(&self) -> Result<Vec<UserRecord>> {
        let mut users = self.read_users().await?.users;
        newest_first(&mut users, |u| u.user.created_at);
        Ok(users)
    }

    async fn get_user(&self, id: UserId) -> Result<Option<UserRecord>> {
        let doc = self.read_users().await?;
        Ok(doc.users.into_iter().find(|u| u.user.id == id))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let doc = self.read_users().await?;
        Ok(doc
            .users
            .into_iter()
            .find(|u| u.user.email.eq_ignore_ascii_case(email)))
    }

    async fn create_user(&self, user: NewUser) -> Result<UserRecord> {
        let record = user.into_record(UserId::new(), Utc::now());
        self.mutate_users(|doc| {
            if doc
                .users
                .iter()
                .any(|u| u.user.email.eq_ignore_ascii_case(&record.user.email))
            {
                return Err(StorageError::Conflict(
                    "email is already registered".to_string(),
                ));
            }
            doc.users.push(record.clone());
            Ok(record)
        })
        .await
    }

    async fn update_user(&self, id: UserId, update: UserUpdate) -> Result<Option<UserRecord>> {
        self.mutate_users(|doc| {
            if let Some(email) = &update.email
                && doc
                    .users
                    .iter()
                    .any(|u| u.user.id != id && u.user.email.eq_ignore_ascii_case(email))
            {
                return Err(StorageError::Conflict(
                    "email is already registered".to_string(),
                ));
            }
            Ok(doc.users.iter_mut().find(|u| u.user.id == id).map(|record| {
                update.apply_to(record, Utc::now());
                record.clone()
            }))
        })
        .await
    }

    async fn delete_user(&self, id: UserId) -> Result<bool> {
        self.mutate_users(|doc| {
            let before = doc.users.len();
            doc.users.retain(|u| u.user.id != id);
            Ok(doc.users.len() != before)
        })
        .await
    }
}

#[async_trait]
impl OrderRepository for JsonFileStore {
    async fn list_orders(&self, user: Option<UserId>) -> Result<Vec<Order>> {
        let doc = self.read_store().await?;
        let mut orders: Vec<Order> = doc
            .orders
            .into_iter()
            .filter(|o| user.is_none_or(|u| o.user_id == u))
            .collect();
        newest_first(&mut orders, |o| o.created_at);
        Ok(orders)
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>> {
        let doc = self.read_store().await?;
        Ok(doc.orders.into_iter().find(|o| o.id == id))
    }

    async fn create_order(&self, order: NewOrder) -> Result<Order> {
        // Order and lines land in the same file write, so they appear together.
        let order = order.into_order(OrderId::new(), Utc::now());
        self.mutate_store(|doc| {
            doc.orders.push(order.clone());
            Ok(order)
        })
        .await
    }

    async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>> {
        self.mutate_store(|doc| {
            Ok(doc.orders.iter_mut().find(|o| o.id == id).map(|order| {
                order.status = status;
                order.updated_at = Utc::now();
                order.clone()
            }))
        })
        .await
    }

    async fn delete_order(&self, id: OrderId) -> Result<bool> {
        self.mutate_store(|doc| {
            let before = doc.orders.len();
            doc.orders.retain(|o| o.id != id);
            Ok(doc.orders.len() != before)
        })
        .await
    }
}

#[async_trait]
impl SettingsRepository for JsonFileStore {
    async fn get_setting(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let doc = self.read_store().await?;
        Ok(doc.settings.get(key).cloned())
    }

    async fn put_setting(&self, key: &str, value: serde_json::Value) -> Result<()> {
        let key = key.to_string();
        self.mutate_store(move |doc| {
            doc.settings.insert(key, value);
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl ContactRepository for JsonFileStore {
    async fn save_message(&self, draft: ContactMessageDraft) -> Result<ContactMessage> {
        let message = draft.into_message(MessageId::new(), Utc::now());
        self.mutate_store(|doc| {
            doc.messages.push(message.clone());
            Ok(message)
        })
        .await
    }

    async fn list_messages(&self) -> Result<Vec<ContactMessage>> {
        let mut messages = self.read_store().await?.messages;
        newest_first(&mut messages, |m| m.created_at);
        Ok(messages)
    }
}
