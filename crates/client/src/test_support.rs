//! Fixtures for unit tests.

use chrono::Utc;
use common::{
    Bilingual, CategoryId, Money, Order, OrderId, OrderItem, OrderItemId, OrderStatus, Product,
    ProductId, Role, ShippingAddress, StoreId, User, UserId,
};

pub fn product(name: &str, minor: i64) -> Product {
    let now = Utc::now();
    Product {
        id: ProductId::new(),
        name: Bilingual::new(name, format!("ar:{name}")),
        description: Bilingual::new("description", "وصف"),
        price: Money::from_minor(minor),
        image: None,
        category: CategoryId::new(),
        weight: None,
        origin: None,
        store: StoreId::IrthBiladi,
        created_at: now,
        updated_at: now,
    }
}

pub fn user(role: Role) -> User {
    let now = Utc::now();
    User {
        id: UserId::new(),
        email: "layla@example.com".to_string(),
        name: "Layla".to_string(),
        role,
        created_at: now,
        updated_at: now,
    }
}

/// An order for `(name, price in minor units, quantity)` lines.
pub fn order_with(lines: &[(&str, i64, u32)], delivery_minor: i64) -> Order {
    let now = Utc::now();
    let id = OrderId::new();
    let items: Vec<OrderItem> = lines
        .iter()
        .map(|(name, minor, quantity)| {
            let product = product(name, *minor);
            OrderItem {
                id: OrderItemId::new(),
                order_id: id,
                product_id: product.id,
                quantity: *quantity,
                price: product.price,
                created_at: now,
                product: Some(product),
            }
        })
        .collect();
    let delivery_fee = Money::from_minor(delivery_minor);
    let total = items.iter().map(OrderItem::line_total).sum::<Money>() + delivery_fee;

    Order {
        id,
        user_id: UserId::new(),
        customer_name: "Layla".to_string(),
        customer_email: "layla@example.com".to_string(),
        total,
        delivery_fee,
        status: OrderStatus::Pending,
        shipping_address: ShippingAddress {
            street: "12 Al-Irsal St".to_string(),
            city: "Ramallah".to_string(),
            country: "Palestine".to_string(),
            postal_code: None,
            phone: Some("+970599000000".to_string()),
        },
        items,
        created_at: now,
        updated_at: now,
    }
}
