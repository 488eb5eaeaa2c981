//! Checkout and order management.

use std::collections::HashMap;

use common::{
    CheckoutRequest, Money, NewOrder, NewOrderItem, Order, OrderId, OrderStatus, Product,
    ProductId, User, UserId,
};
use rust_decimal::prelude::ToPrimitive;
use storage::{DELIVERY_FEE_KEY, Storage, StorageExt};

use crate::error::{DomainError, Result};
use crate::pricing::{OrderQuote, delivery_fee_from_setting};
use crate::validation::{ValidationErrors, normalize_email};

fn validate_checkout(request: &CheckoutRequest) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.require_text("customer_name", &request.customer_name);
    errors.require_email("customer_email", &request.customer_email);
    errors.require_text("shipping_address.street", &request.shipping_address.street);
    errors.require_text("shipping_address.city", &request.shipping_address.city);
    errors.require_text("shipping_address.country", &request.shipping_address.country);

    if request.items.is_empty() {
        errors.add("items", "must contain at least one item");
    }
    for (i, item) in request.items.iter().enumerate() {
        errors.require_quantity(&format!("items[{i}].quantity"), item.quantity);
        errors.require_price(&format!("items[{i}].price"), item.price);
    }
    errors
}

/// Places, reads and administers orders.
#[derive(Clone)]
pub struct OrderService<S> {
    store: S,
}

impl<S: Storage> OrderService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The delivery fee currently in effect. Unreadable settings count as no
    /// fee.
    #[tracing::instrument(skip(self))]
    pub async fn delivery_fee(&self) -> Money {
        match self.store.get_setting(DELIVERY_FEE_KEY).await {
            Ok(value) => delivery_fee_from_setting(value.as_ref()),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read delivery fee, using 0");
                Money::zero()
            }
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn set_delivery_fee(&self, fee: Money) -> Result<Money> {
        let fee = fee.round();
        if fee.is_negative() {
            return Err(ValidationErrors::single("amount", "must not be negative").into());
        }
        if fee.exceeds_limit() {
            return Err(ValidationErrors::single(
                "amount",
                format!("must not exceed {}", Money::upper_limit()),
            )
            .into());
        }
        self.store
            .put_setting(DELIVERY_FEE_KEY, serde_json::json!({ "amount": fee }))
            .await?;
        tracing::info!(%fee, "delivery fee updated");
        Ok(fee)
    }

    /// Turns a checkout submission into a persisted `pending` order.
    ///
    /// Every line is re-priced from the catalog; a line whose submitted price
    /// differs from the current one is rejected. Order and lines are stored
    /// atomically.
    #[tracing::instrument(
        skip(self, customer, request),
        fields(user_id = %customer.id, items = request.items.len())
    )]
    pub async fn place_order(&self, customer: &User, request: CheckoutRequest) -> Result<Order> {
        let (quote, products) = self.price(&request).await?;

        let items = request
            .items
            .iter()
            .map(|item| NewOrderItem {
                product_id: item.product_id,
                quantity: item.quantity,
                price: item.price,
            })
            .collect();

        let new_order = NewOrder {
            user_id: customer.id,
            customer_name: request.customer_name.trim().to_string(),
            customer_email: normalize_email(&request.customer_email),
            total: quote.total,
            delivery_fee: quote.delivery_fee,
            shipping_address: request.shipping_address,
            items,
        };

        let mut order = self.store.create_order(new_order).await?;

        metrics::counter!("orders_placed_total").increment(1);
        metrics::histogram!("order_total_amount")
            .record(quote.total.amount().to_f64().unwrap_or_default());
        tracing::info!(order_id = %order.id, total = %order.total, "order placed");

        for item in &mut order.items {
            item.product = products.get(&item.product_id).cloned();
        }
        Ok(order)
    }

    /// Validates the request, checks each line against the catalog, and
    /// prices it with the current delivery fee.
    async fn price(
        &self,
        request: &CheckoutRequest,
    ) -> Result<(OrderQuote, HashMap<ProductId, Product>)> {
        validate_checkout(request).finish()?;

        let ids: Vec<ProductId> = request.items.iter().map(|i| i.product_id).collect();
        let products = self.store.products_by_ids(&ids).await?;

        let mut errors = ValidationErrors::new();
        for (i, item) in request.items.iter().enumerate() {
            match products.get(&item.product_id) {
                None => errors.add(format!("items[{i}].product_id"), "product no longer exists"),
                Some(product) if product.price != item.price => errors.add(
                    format!("items[{i}].price"),
                    format!("price has changed to {}", product.price),
                ),
                Some(_) => {}
            }
        }
        errors.finish()?;

        let fee = self.delivery_fee().await;
        let quote = OrderQuote::new(request.items.iter().map(|i| (i.price, i.quantity)), fee);
        if quote.total.exceeds_limit() {
            return Err(ValidationErrors::single(
                "items",
                format!("order total must not exceed {}", Money::upper_limit()),
            )
            .into());
        }
        Ok((quote, products))
    }

    /// Orders placed by one user, newest first.
    #[tracing::instrument(skip(self))]
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        let mut orders = self.store.list_orders(Some(user_id)).await?;
        self.attach_products(&mut orders).await?;
        Ok(orders)
    }

    /// Every order, newest first.
    #[tracing::instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<Order>> {
        let mut orders = self.store.list_orders(None).await?;
        self.attach_products(&mut orders).await?;
        Ok(orders)
    }

    /// Fetches an order. Admins see any order, customers only their own.
    #[tracing::instrument(skip(self, viewer), fields(viewer = %viewer.id))]
    pub async fn get_for(&self, viewer: &User, id: OrderId) -> Result<Order> {
        let order = self
            .store
            .get_order(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Order", id))?;

        if order.user_id != viewer.id && !viewer.role.is_admin() {
            return Err(DomainError::Forbidden(
                "You can only view your own orders".to_string(),
            ));
        }

        let mut orders = vec![order];
        self.attach_products(&mut orders).await?;
        orders
            .pop()
            .ok_or_else(|| DomainError::not_found("Order", id))
    }

    /// Sets the status. Any status may follow any other.
    #[tracing::instrument(skip(self))]
    pub async fn update_status(&self, id: OrderId, status: OrderStatus) -> Result<Order> {
        let mut order = self
            .store
            .update_order_status(id, status)
            .await?
            .ok_or_else(|| DomainError::not_found("Order", id))?;
        tracing::info!(order_id = %id, %status, "order status updated");

        self.attach_products(std::slice::from_mut(&mut order)).await?;
        Ok(order)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: OrderId) -> Result<()> {
        if !self.store.delete_order(id).await? {
            return Err(DomainError::not_found("Order", id));
        }
        tracing::info!(order_id = %id, "order deleted");
        Ok(())
    }

    /// Attaches the current catalog entry to each line, where it still
    /// exists.
    async fn attach_products(&self, orders: &mut [Order]) -> Result<()> {
        let ids: Vec<ProductId> = orders
            .iter()
            .flat_map(|o| o.items.iter().map(|i| i.product_id))
            .collect();
        if ids.is_empty() {
            return Ok(());
        }
        let products = self.store.products_by_ids(&ids).await?;

        for item in orders.iter_mut().flat_map(|o| o.items.iter_mut()) {
            item.product = products.get(&item.product_id).cloned();
        }
        Ok(())
    }
}
