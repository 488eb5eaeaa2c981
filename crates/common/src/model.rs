//! Entities persisted by the storage backends and the inputs used to create
//! and patch them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{CategoryId, MessageId, OrderId, OrderItemId, ProductId, UserId};
use crate::types::{Bilingual, Money, OrderStatus, Role, StoreId};

/// A product in the shared catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: Bilingual,
    pub description: Bilingual,
    pub price: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub category: CategoryId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    pub store: StoreId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields needed to create a product. Id and timestamps are assigned by the
/// backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub name: Bilingual,
    pub description: Bilingual,
    pub price: Money,
    #[serde(default)]
    pub image: Option<String>,
    pub category: CategoryId,
    #[serde(default)]
    pub weight: Option<String>,
    #[serde(default)]
    pub origin: Option<String>,
    pub store: StoreId,
}

impl ProductDraft {
    /// Materializes the draft into a product with the given id and timestamp.
    pub fn into_product(self, id: ProductId, now: DateTime<Utc>) -> Product {
        Product {
            id,
            name: self.name,
            description: self.description,
            price: self.price,
            image: self.image,
            category: self.category,
            weight: self.weight,
            origin: self.origin,
            store: self.store,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial product update. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductUpdate {
    #[serde(default)]
    pub name: Option<Bilingual>,
    #[serde(default)]
    pub description: Option<Bilingual>,
    #[serde(default)]
    pub price: Option<Money>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub category: Option<CategoryId>,
    #[serde(default)]
    pub weight: Option<String>,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub store: Option<StoreId>,
}

impl ProductUpdate {
    /// Applies the patch in place and bumps `updated_at`.
    pub fn apply_to(self, product: &mut Product, now: DateTime<Utc>) {
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(image) = self.image {
            product.image = Some(image);
        }
        if let Some(category) = self.category {
            product.category = category;
        }
        if let Some(weight) = self.weight {
            product.weight = Some(weight);
        }
        if let Some(origin) = self.origin {
            product.origin = Some(origin);
        }
        if let Some(store) = self.store {
            product.store = store;
        }
        product.updated_at = now;
    }
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: Bilingual,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Bilingual>,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDraft {
    pub name: Bilingual,
    #[serde(default)]
    pub description: Option<Bilingual>,
    pub slug: String,
}

impl CategoryDraft {
    pub fn into_category(self, id: CategoryId, now: DateTime<Utc>) -> Category {
        Category {
            id,
            name: self.name,
            description: self.description,
            slug: self.slug,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryUpdate {
    #[serde(default)]
    pub name: Option<Bilingual>,
    #[serde(default)]
    pub description: Option<Bilingual>,
    #[serde(default)]
    pub slug: Option<String>,
}

impl CategoryUpdate {
    pub fn apply_to(self, category: &mut Category, now: DateTime<Utc>) {
        if let Some(name) = self.name {
            category.name = name;
        }
        if let Some(description) = self.description {
            category.description = Some(description);
        }
        if let Some(slug) = self.slug {
            category.slug = slug;
        }
        category.updated_at = now;
    }
}

/// Public view of an account. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A stored account: the public view plus the password hash.
///
/// Only the storage and auth layers handle this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(flatten)]
    pub user: User,
    pub password_hash: String,
}

/// Fields needed to create an account. The password is already hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub role: Role,
    pub password_hash: String,
}

impl NewUser {
    pub fn into_record(self, id: UserId, now: DateTime<Utc>) -> UserRecord {
        UserRecord {
            user: User {
                id,
                email: self.email,
                name: self.name,
                role: self.role,
                created_at: now,
                updated_at: now,
            },
            password_hash: self.password_hash,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(skip)]
    pub password_hash: Option<String>,
}

impl UserUpdate {
    pub fn role(role: Role) -> Self {
        Self {
            role: Some(role),
            ..Self::default()
        }
    }

    pub fn apply_to(self, record: &mut UserRecord, now: DateTime<Utc>) {
        if let Some(name) = self.name {
            record.user.name = name;
        }
        if let Some(email) = self.email {
            record.user.email = email;
        }
        if let Some(role) = self.role {
            record.user.role = role;
        }
        if let Some(hash) = self.password_hash {
            record.password_hash = hash;
        }
        record.user.updated_at = now;
    }
}

/// Where an order is delivered.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub street: String,
    pub city: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// One line of a placed order. The price is captured at order time and is
/// independent of later catalog changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub price: Money,
    pub created_at: DateTime<Utc>,
    /// Current catalog entry, attached on read for display. Never persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<Product>,
}

impl OrderItem {
    /// Returns `price * quantity`.
    pub fn line_total(&self) -> Money {
        self.price.multiply(self.quantity)
    }
}

/// A placed order with its lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub customer_name: String,
    pub customer_email: String,
    pub total: Money,
    #[serde(default)]
    pub delivery_fee: Money,
    pub status: OrderStatus,
    pub shipping_address: ShippingAddress,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Sum of the line totals, excluding delivery.
    pub fn items_total(&self) -> Money {
        self.items.iter().map(OrderItem::line_total).sum()
    }

    /// Total number of units across all lines.
    pub fn unit_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

/// A priced order line ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub quantity: u32,
    pub price: Money,
}

/// A fully priced order ready to be persisted together with its lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub user_id: UserId,
    pub customer_name: String,
    pub customer_email: String,
    pub total: Money,
    pub delivery_fee: Money,
    pub shipping_address: ShippingAddress,
    pub items: Vec<NewOrderItem>,
}

impl NewOrder {
    /// Materializes the order and its lines. Status starts at `pending`.
    pub fn into_order(self, id: OrderId, now: DateTime<Utc>) -> Order {
        let items = self
            .items
            .into_iter()
            .map(|item| OrderItem {
                id: OrderItemId::new(),
                order_id: id,
                product_id: item.product_id,
                quantity: item.quantity,
                price: item.price,
                created_at: now,
                product: None,
            })
            .collect();

        Order {
            id,
            user_id: self.user_id,
            customer_name: self.customer_name,
            customer_email: self.customer_email,
            total: self.total,
            delivery_fee: self.delivery_fee,
            status: OrderStatus::Pending,
            shipping_address: self.shipping_address,
            items,
            created_at: now,
            updated_at: now,
        }
    }
}

/// One cart line as submitted at checkout.
///
/// `price` is the unit price the customer saw. It must still match the
/// catalog when the order is placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutItem {
    pub product_id: ProductId,
    pub quantity: u32,
    pub price: Money,
}

/// A checkout submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub customer_name: String,
    pub customer_email: String,
    pub shipping_address: ShippingAddress,
    pub items: Vec<CheckoutItem>,
}

/// A message left through the public contact form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub id: MessageId,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessageDraft {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    pub message: String,
}

impl ContactMessageDraft {
    pub fn into_message(self, id: MessageId, now: DateTime<Utc>) -> ContactMessage {
        ContactMessage {
            id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            subject: self.subject,
            message: self.message,
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_product() -> Product {
        ProductDraft {
            name: Bilingual::new("Medjool Dates", "تمر مجدول"),
            description: Bilingual::new("Soft dates", "تمر طري"),
            price: Money::from_minor(1200),
            image: None,
            category: CategoryId::new(),
            weight: Some("1kg".to_string()),
            origin: Some("Palestine".to_string()),
            store: StoreId::IrthBiladi,
        }
        .into_product(ProductId::new(), Utc::now())
    }

    #[test]
    fn product_update_only_touches_present_fields() {
        let mut product = sample_product();
        let original_name = product.name.clone();
        let later = product.updated_at + chrono::Duration::seconds(5);

        ProductUpdate {
            price: Some(Money::from_minor(1500)),
            ..ProductUpdate::default()
        }
        .apply_to(&mut product, later);

        assert_eq!(product.price, Money::from_minor(1500));
        assert_eq!(product.name, original_name);
        assert_eq!(product.updated_at, later);
    }

    #[test]
    fn user_record_never_leaks_hash_through_user_view() {
        let record = NewUser {
            email: "a@example.com".to_string(),
            name: "A".to_string(),
            role: Role::User,
            password_hash: "$2b$12$hash".to_string(),
        }
        .into_record(UserId::new(), Utc::now());

        let stored = serde_json::to_value(&record).unwrap();
        assert_eq!(stored["password_hash"], "$2b$12$hash");
        assert_eq!(stored["email"], "a@example.com");

        let public = serde_json::to_value(&record.user).unwrap();
        assert!(public.get("password_hash").is_none());
    }

    #[test]
    fn new_order_starts_pending_with_items_linked() {
        let order = NewOrder {
            user_id: UserId::new(),
            customer_name: "Lina".to_string(),
            customer_email: "lina@example.com".to_string(),
            total: Money::from_minor(2750),
            delivery_fee: Money::from_minor(200),
            shipping_address: ShippingAddress::default(),
            items: vec![
                NewOrderItem {
                    product_id: ProductId::new(),
                    quantity: 2,
                    price: Money::from_minor(1000),
                },
                NewOrderItem {
                    product_id: ProductId::new(),
                    quantity: 1,
                    price: Money::from_minor(550),
                },
            ],
        }
        .into_order(OrderId::new(), Utc::now());

        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.items.iter().all(|item| item.order_id == order.id));
        assert_eq!(order.items_total(), Money::from_minor(2550));
        assert_eq!(order.unit_count(), 3);
    }
}
