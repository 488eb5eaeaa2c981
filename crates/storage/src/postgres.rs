use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use common::{
    Bilingual, Category, CategoryDraft, CategoryId, CategoryUpdate, ContactMessage,
    ContactMessageDraft, MessageId, Money, NewOrder, NewUser, Order, OrderId, OrderItem,
    OrderItemId, OrderStatus, Product, ProductDraft, ProductId, ProductUpdate, ShippingAddress,
    StoreId, User, UserId, UserRecord, UserUpdate,
};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::repository::{
    CategoryRepository, ContactRepository, OrderRepository, ProductRepository,
    SettingsRepository, UserRepository,
};
use crate::{Result, StorageError};

/// Columns that may be missing from older schemas. Writes include them only
/// when the live table has them; reads treat a missing column as `None`.
const OPTIONAL_PRODUCT_COLUMNS: &[&str] =
    &["description_en", "description_ar", "image", "weight", "origin"];
const OPTIONAL_CATEGORY_COLUMNS: &[&str] = &["description_en", "description_ar"];

/// Column sets probed once per table and kept for the process lifetime.
#[derive(Default)]
struct ColumnCache {
    products: OnceCell<HashSet<String>>,
    categories: OnceCell<HashSet<String>>,
}

/// PostgreSQL-backed store.
///
/// Bilingual pairs are stored as `<field>_en` / `<field>_ar` column pairs and
/// reassembled on read.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
    columns: Arc<ColumnCache>,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            columns: Arc::new(ColumnCache::default()),
        }
    }

    /// Connects a new pool to `url`.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    async fn product_columns(&self) -> Result<&HashSet<String>> {
        self.columns
            .products
            .get_or_try_init(|| probe_columns(&self.pool, "products"))
            .await
    }

    async fn category_columns(&self) -> Result<&HashSet<String>> {
        self.columns
            .categories
            .get_or_try_init(|| probe_columns(&self.pool, "categories"))
            .await
    }

    async fn load_items(&self, order_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<OrderItem>>> {
        let rows = sqlx::query(
            r#"
            SELECT id, order_id, product_id, quantity, price, created_at
            FROM order_items
            WHERE order_id = ANY($1)
            ORDER BY position ASC
            "#,
        )
        .bind(order_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
        for row in rows {
            let item = row_to_item(&row)?;
            grouped
                .entry(item.order_id.as_uuid())
                .or_default()
                .push(item);
        }
        Ok(grouped)
    }

    async fn with_items(&self, rows: Vec<PgRow>) -> Result<Vec<Order>> {
        let ids: Vec<Uuid> = rows
            .iter()
            .map(|row| row.try_get::<Uuid, _>("id"))
            .collect::<std::result::Result<_, _>>()?;
        let mut items = self.load_items(&ids).await?;

        rows.iter()
            .map(|row| {
                let mut order = row_to_order(row)?;
                order.items = items.remove(&order.id.as_uuid()).unwrap_or_default();
                Ok(order)
            })
            .collect()
    }
}

async fn probe_columns(pool: &PgPool, table: &str) -> Result<HashSet<String>> {
    let columns: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT column_name::TEXT
        FROM information_schema.columns
        WHERE table_schema = current_schema() AND table_name = $1
        "#,
    )
    .bind(table)
    .fetch_all(pool)
    .await?;
    tracing::debug!(table, ?columns, "probed table columns");
    Ok(columns.into_iter().collect())
}

/// Postgres keeps microseconds; truncating up front keeps returned values
/// identical to what a later read yields.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn optional_text(row: &PgRow, column: &str) -> Option<String> {
    row.try_get::<Option<String>, _>(column).ok().flatten()
}

fn parse_enum<T>(row: &PgRow, column: &str) -> Result<T>
where
    T: std::str::FromStr<Err = common::ParseEnumError>,
{
    let raw: String = row.try_get(column)?;
    raw.parse()
        .map_err(|e: common::ParseEnumError| StorageError::Corrupt(e.to_string()))
}

fn map_unique(err: sqlx::Error, what: &str) -> StorageError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        return StorageError::Conflict(format!("{what} is already in use"));
    }
    StorageError::Database(err)
}

fn to_db_quantity(quantity: u32) -> Result<i32> {
    i32::try_from(quantity)
        .map_err(|_| StorageError::Corrupt(format!("quantity {quantity} out of range")))
}

fn row_to_product(row: &PgRow) -> Result<Product> {
    Ok(Product {
        id: ProductId::from_uuid(row.try_get("id")?),
        name: Bilingual::new(
            row.try_get::<String, _>("name_en")?,
            row.try_get::<String, _>("name_ar")?,
        ),
        description: Bilingual::new(
            optional_text(row, "description_en").unwrap_or_default(),
            optional_text(row, "description_ar").unwrap_or_default(),
        ),
        price: Money::new(row.try_get::<Decimal, _>("price")?),
        image: optional_text(row, "image"),
        category: CategoryId::from_uuid(row.try_get("category_id")?),
        weight: optional_text(row, "weight"),
        origin: optional_text(row, "origin"),
        store: parse_enum::<StoreId>(row, "store")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_category(row: &PgRow) -> Result<Category> {
    let description = match (
        optional_text(row, "description_en"),
        optional_text(row, "description_ar"),
    ) {
        (None, None) => None,
        (en, ar) => Some(Bilingual::new(en.unwrap_or_default(), ar.unwrap_or_default())),
    };

    Ok(Category {
        id: CategoryId::from_uuid(row.try_get("id")?),
        name: Bilingual::new(
            row.try_get::<String, _>("name_en")?,
            row.try_get::<String, _>("name_ar")?,
        ),
        description,
        slug: row.try_get("slug")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_user(row: &PgRow) -> Result<UserRecord> {
    Ok(UserRecord {
        user: User {
            id: UserId::from_uuid(row.try_get("id")?),
            email: row.try_get("email")?,
            name: row.try_get("name")?,
            role: parse_enum(row, "role")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        },
        password_hash: row.try_get("password_hash")?,
    })
}

fn row_to_item(row: &PgRow) -> Result<OrderItem> {
    let quantity: i32 = row.try_get("quantity")?;
    Ok(OrderItem {
        id: OrderItemId::from_uuid(row.try_get("id")?),
        order_id: OrderId::from_uuid(row.try_get("order_id")?),
        product_id: ProductId::from_uuid(row.try_get("product_id")?),
        quantity: u32::try_from(quantity)
            .map_err(|_| StorageError::Corrupt(format!("negative quantity {quantity}")))?,
        price: Money::new(row.try_get::<Decimal, _>("price")?),
        created_at: row.try_get("created_at")?,
        product: None,
    })
}

fn row_to_order(row: &PgRow) -> Result<Order> {
    let Json(shipping_address): Json<ShippingAddress> = row.try_get("shipping_address")?;
    Ok(Order {
        id: OrderId::from_uuid(row.try_get("id")?),
        user_id: UserId::from_uuid(row.try_get("user_id")?),
        customer_name: row.try_get("customer_name")?,
        customer_email: row.try_get("customer_email")?,
        total: Money::new(row.try_get::<Decimal, _>("total")?),
        delivery_fee: Money::new(row.try_get::<Decimal, _>("delivery_fee")?),
        status: parse_enum::<OrderStatus>(row, "status")?,
        shipping_address,
        items: Vec::new(),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_message(row: &PgRow) -> Result<ContactMessage> {
    Ok(ContactMessage {
        id: MessageId::from_uuid(row.try_get("id")?),
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        phone: optional_text(row, "phone"),
        subject: optional_text(row, "subject"),
        message: row.try_get("message")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Optional text columns of a product that exist in the live schema.
fn product_optionals(
    product: &Product,
    columns: &HashSet<String>,
) -> Vec<(&'static str, Option<String>)> {
    let all = [
        ("description_en", Some(product.description.en.clone())),
        ("description_ar", Some(product.description.ar.clone())),
        ("image", product.image.clone()),
        ("weight", product.weight.clone()),
        ("origin", product.origin.clone()),
    ];
    all.into_iter()
        .filter(|(column, _)| {
            OPTIONAL_PRODUCT_COLUMNS.contains(column) && columns.contains(*column)
        })
        .collect()
}

fn category_optionals(
    category: &Category,
    columns: &HashSet<String>,
) -> Vec<(&'static str, Option<String>)> {
    let description = category.description.as_ref();
    let all = [
        ("description_en", description.map(|d| d.en.clone())),
        ("description_ar", description.map(|d| d.ar.clone())),
    ];
    all.into_iter()
        .filter(|(column, _)| {
            OPTIONAL_CATEGORY_COLUMNS.contains(column) && columns.contains(*column)
        })
        .collect()
}

#[async_trait]
impl ProductRepository for PostgresStore {
    async fn list_products(&self, store: Option<StoreId>) -> Result<Vec<Product>> {
        let rows = match store {
            Some(store) => {
                sqlx::query("SELECT * FROM products WHERE store = $1 ORDER BY created_at DESC")
                    .bind(store.as_str())
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                sqlx::query("SELECT * FROM products ORDER BY created_at DESC")
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        rows.iter().map(row_to_product).collect()
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        let row = sqlx::query("SELECT * FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_product).transpose()
    }

    async fn create_product(&self, draft: ProductDraft) -> Result<Product> {
        let product = draft.into_product(ProductId::new(), now());
        let optionals = product_optionals(&product, self.product_columns().await?);

        let mut qb = QueryBuilder::<Postgres>::new(
            "INSERT INTO products (id, name_en, name_ar, price, category_id, store, created_at, updated_at",
        );
        for (column, _) in &optionals {
            qb.push(", ").push(*column);
        }
        qb.push(") VALUES (");
        let mut values = qb.separated(", ");
        values
            .push_bind(product.id.as_uuid())
            .push_bind(product.name.en.clone())
            .push_bind(product.name.ar.clone())
            .push_bind(product.price.amount())
            .push_bind(product.category.as_uuid())
            .push_bind(product.store.as_str())
            .push_bind(product.created_at)
            .push_bind(product.updated_at);
        for (_, value) in optionals {
            values.push_bind(value);
        }
        values.push_unseparated(")");

        qb.build().execute(&self.pool).await?;
        Ok(product)
    }

    async fn update_product(
        &self,
        id: ProductId,
        update: ProductUpdate,
    ) -> Result<Option<Product>> {
        let columns = self.product_columns().await?;
        let mut tx = self.pool.begin().await?;

        let Some(row) = sqlx::query("SELECT * FROM products WHERE id = $1 FOR UPDATE")
            .bind(id.as_uuid())
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };
        let mut product = row_to_product(&row)?;
        update.apply_to(&mut product, now());

        let mut qb = QueryBuilder::<Postgres>::new("UPDATE products SET ");
        let mut sets = qb.separated(", ");
        sets.push("name_en = ").push_bind_unseparated(product.name.en.clone());
        sets.push("name_ar = ").push_bind_unseparated(product.name.ar.clone());
        sets.push("price = ").push_bind_unseparated(product.price.amount());
        sets.push("category_id = ").push_bind_unseparated(product.category.as_uuid());
        sets.push("store = ").push_bind_unseparated(product.store.as_str());
        sets.push("updated_at = ").push_bind_unseparated(product.updated_at);
        for (column, value) in product_optionals(&product, columns) {
            sets.push(column).push_unseparated(" = ").push_bind_unseparated(value);
        }
        qb.push(" WHERE id = ").push_bind(id.as_uuid());
        qb.build().execute(&mut *tx).await?;

        tx.commit().await?;
        Ok(Some(product))
    }

    async fn delete_product(&self, id: ProductId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl CategoryRepository for PostgresStore {
    async fn list_categories(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query("SELECT * FROM categories ORDER BY name_en ASC")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_category).collect()
    }

    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>> {
        let row = sqlx::query("SELECT * FROM categories WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_category).transpose()
    }

    async fn get_category_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        let row = sqlx::query("SELECT * FROM categories WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_category).transpose()
    }

    async fn create_category(&self, draft: CategoryDraft) -> Result<Category> {
        let category = draft.into_category(CategoryId::new(), now());
        let optionals = category_optionals(&category, self.category_columns().await?);

        let mut qb = QueryBuilder::<Postgres>::new(
            "INSERT INTO categories (id, name_en, name_ar, slug, created_at, updated_at",
        );
        for (column, _) in &optionals {
            qb.push(", ").push(*column);
        }
        qb.push(") VALUES (");
        let mut values = qb.separated(", ");
        values
            .push_bind(category.id.as_uuid())
            .push_bind(category.name.en.clone())
            .push_bind(category.name.ar.clone())
            .push_bind(category.slug.clone())
            .push_bind(category.created_at)
            .push_bind(category.updated_at);
        for (_, value) in optionals {
            values.push_bind(value);
        }
        values.push_unseparated(")");

        qb.build()
            .execute(&self.pool)
            .await
            .map_err(|e| map_unique(e, "slug"))?;
        Ok(category)
    }

    async fn update_category(
        &self,
        id: CategoryId,
        update: CategoryUpdate,
    ) -> Result<Option<Category>> {
        let columns = self.category_columns().await?;
        let mut tx = self.pool.begin().await?;

        let Some(row) = sqlx::query("SELECT * FROM categories WHERE id = $1 FOR UPDATE")
            .bind(id.as_uuid())
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };
        let mut category = row_to_category(&row)?;
        update.apply_to(&mut category, now());

        let mut qb = QueryBuilder::<Postgres>::new("UPDATE categories SET ");
        let mut sets = qb.separated(", ");
        sets.push("name_en = ").push_bind_unseparated(category.name.en.clone());
        sets.push("name_ar = ").push_bind_unseparated(category.name.ar.clone());
        sets.push("slug = ").push_bind_unseparated(category.slug.clone());
        sets.push("updated_at = ").push_bind_unseparated(category.updated_at);
        for (column, value) in category_optionals(&category, columns) {
            sets.push(column).push_unseparated(" = ").push_bind_unseparated(value);
        }
        qb.push(" WHERE id = ").push_bind(id.as_uuid());
        qb.build()
            .execute(&mut *tx)
            .await
            .map_err(|e| map_unique(e, "slug"))?;

        tx.commit().await?;
        Ok(Some(category))
    }

    async fn delete_category(&self, id: CategoryId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl UserRepository for PostgresStore {
    async fn list_users(&self) -> Result<Vec<UserRecord>> {
        let rows = sqlx::query("SELECT * FROM users ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_user).collect()
    }

    async fn get_user(&self, id: UserId) -> Result<Option<UserRecord>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_user).transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let row = sqlx::query("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_user).transpose()
    }

    async fn create_user(&self, user: NewUser) -> Result<UserRecord> {
        let record = user.into_record(UserId::new(), now());
        sqlx::query(
            r#"
            INSERT INTO users (id, email, name, role, password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(record.user.id.as_uuid())
        .bind(&record.user.email)
        .bind(&record.user.name)
        .bind(record.user.role.as_str())
        .bind(&record.password_hash)
        .bind(record.user.created_at)
        .bind(record.user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique(e, "email"))?;
        Ok(record)
    }

    async fn update_user(&self, id: UserId, update: UserUpdate) -> Result<Option<UserRecord>> {
        let mut tx = self.pool.begin().await?;

        let Some(row) = sqlx::query("SELECT * FROM users WHERE id = $1 FOR UPDATE")
            .bind(id.as_uuid())
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };
        let mut record = row_to_user(&row)?;
        update.apply_to(&mut record, now());

        sqlx::query(
            r#"
            UPDATE users
            SET email = $2, name = $3, role = $4, password_hash = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(&record.user.email)
        .bind(&record.user.name)
        .bind(record.user.role.as_str())
        .bind(&record.password_hash)
        .bind(record.user.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_unique(e, "email"))?;

        tx.commit().await?;
        Ok(Some(record))
    }

    async fn delete_user(&self, id: UserId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl OrderRepository for PostgresStore {
    async fn list_orders(&self, user: Option<UserId>) -> Result<Vec<Order>> {
        let rows = match user {
            Some(user) => {
                sqlx::query("SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC")
                    .bind(user.as_uuid())
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                sqlx::query("SELECT * FROM orders ORDER BY created_at DESC")
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        self.with_items(rows).await
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query("SELECT * FROM orders WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => Ok(self.with_items(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn create_order(&self, order: NewOrder) -> Result<Order> {
        let order = order.into_order(OrderId::new(), now());

        // Order and lines commit together or not at all.
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders (id, user_id, customer_name, customer_email, total, delivery_fee,
                                status, shipping_address, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.user_id.as_uuid())
        .bind(&order.customer_name)
        .bind(&order.customer_email)
        .bind(order.total.amount())
        .bind(order.delivery_fee.amount())
        .bind(order.status.as_str())
        .bind(Json(&order.shipping_address))
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        for (position, item) in order.items.iter().enumerate() {
            let position = i32::try_from(position)
                .map_err(|_| StorageError::Corrupt("too many order items".to_string()))?;
            sqlx::query(
                r#"
                INSERT INTO order_items (id, order_id, product_id, quantity, price, position, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(item.id.as_uuid())
            .bind(item.order_id.as_uuid())
            .bind(item.product_id.as_uuid())
            .bind(to_db_quantity(item.quantity)?)
            .bind(item.price.amount())
            .bind(position)
            .bind(item.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(order)
    }

    async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>> {
        let result = sqlx::query("UPDATE orders SET status = $2, updated_at = $3 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(status.as_str())
            .bind(now())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_order(id).await
    }

    async fn delete_order(&self, id: OrderId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl SettingsRepository for PostgresStore {
    async fn get_setting(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let value = sqlx::query_scalar("SELECT value FROM settings WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    async fn put_setting(&self, key: &str, value: serde_json::Value) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO settings (key, value, updated_at) VALUES ($1, $2, NOW())
            ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl ContactRepository for PostgresStore {
    async fn save_message(&self, draft: ContactMessageDraft) -> Result<ContactMessage> {
        let message = draft.into_message(MessageId::new(), now());
        sqlx::query(
            r#"
            INSERT INTO contact_messages (id, name, email, phone, subject, message, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(message.id.as_uuid())
        .bind(&message.name)
        .bind(&message.email)
        .bind(&message.phone)
        .bind(&message.subject)
        .bind(&message.message)
        .bind(message.created_at)
        .execute(&self.pool)
        .await?;
        Ok(message)
    }

    async fn list_messages(&self) -> Result<Vec<ContactMessage>> {
        let rows = sqlx::query("SELECT * FROM contact_messages ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_message).collect()
    }
}
