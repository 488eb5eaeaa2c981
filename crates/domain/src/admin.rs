//! Dashboard statistics and user management.

use std::collections::BTreeMap;

use common::{Money, Order, OrderStatus, Role, User, UserId, UserUpdate};
use serde::Serialize;
use storage::Storage;

use crate::error::{DomainError, Result};

const RECENT_ORDERS: usize = 5;

/// Aggregate numbers for the admin dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminStats {
    pub total_users: usize,
    pub total_products: usize,
    pub total_categories: usize,
    pub total_orders: usize,
    /// Sum of order totals, cancelled orders excluded.
    pub total_revenue: Money,
    pub pending_orders: usize,
    pub orders_by_status: BTreeMap<OrderStatus, usize>,
    pub recent_orders: Vec<Order>,
}

#[derive(Clone)]
pub struct AdminService<S> {
    store: S,
}

impl<S: Storage> AdminService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[tracing::instrument(skip(self))]
    pub async fn stats(&self) -> Result<AdminStats> {
        let users = self.store.list_users().await?;
        let products = self.store.list_products(None).await?;
        let categories = self.store.list_categories().await?;
        let orders = self.store.list_orders(None).await?;

        let mut orders_by_status: BTreeMap<OrderStatus, usize> =
            OrderStatus::ALL.into_iter().map(|s| (s, 0)).collect();
        for order in &orders {
            *orders_by_status.entry(order.status).or_default() += 1;
        }

        let total_revenue = orders
            .iter()
            .filter(|o| o.status.counts_as_revenue())
            .map(|o| o.total)
            .sum();

        Ok(AdminStats {
            total_users: users.len(),
            total_products: products.len(),
            total_categories: categories.len(),
            total_orders: orders.len(),
            total_revenue,
            pending_orders: orders_by_status
                .get(&OrderStatus::Pending)
                .copied()
                .unwrap_or_default(),
            orders_by_status,
            recent_orders: orders.into_iter().take(RECENT_ORDERS).collect(),
        })
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<User>> {
        Ok(self
            .store
            .list_users()
            .await?
            .into_iter()
            .map(|record| record.user)
            .collect())
    }

    #[tracing::instrument(skip(self))]
    pub async fn set_role(&self, id: UserId, role: Role) -> Result<User> {
        let record = self
            .store
            .update_user(id, UserUpdate::role(role))
            .await?
            .ok_or_else(|| DomainError::not_found("User", id))?;
        tracing::info!(user_id = %id, %role, "user role changed");
        Ok(record.user)
    }

    /// Deletes an account. An admin cannot delete their own.
    #[tracing::instrument(skip(self, actor), fields(actor = %actor.id))]
    pub async fn delete_user(&self, actor: &User, id: UserId) -> Result<()> {
        if actor.id == id {
            return Err(DomainError::SelfDeletion);
        }
        if !self.store.delete_user(id).await? {
            return Err(DomainError::not_found("User", id));
        }
        tracing::info!(user_id = %id, "user deleted");
        Ok(())
    }
}
