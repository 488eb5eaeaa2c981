//! Admin back-office state.
//!
//! Holds the last loaded stats, orders and users. Nothing polls: callers
//! refresh after each action.

use common::{Order, OrderId, OrderStatus, Role, User, UserId};

use crate::api::{DashboardStats, StorefrontClient};
use crate::error::Result;

#[derive(Debug, Default)]
pub struct AdminDashboard {
    pub stats: Option<DashboardStats>,
    pub orders: Vec<Order>,
    pub users: Vec<User>,
}

impl AdminDashboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn refresh(&mut self, client: &StorefrontClient) -> Result<()> {
        self.stats = Some(client.stats().await?);
        self.orders = client.all_orders().await?;
        self.users = client.users().await?;
        Ok(())
    }

    /// Changes an order's status and replaces the cached copy.
    pub async fn set_order_status(
        &mut self,
        client: &StorefrontClient,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<()> {
        let updated = client.set_order_status(id, status).await?;
        if let Some(order) = self.orders.iter_mut().find(|o| o.id == id) {
            *order = updated;
        }
        self.stats = Some(client.stats().await?);
        Ok(())
    }

    pub async fn set_user_role(
        &mut self,
        client: &StorefrontClient,
        id: UserId,
        role: Role,
    ) -> Result<()> {
        let updated = client.set_user_role(id, role).await?;
        if let Some(user) = self.users.iter_mut().find(|u| u.id == id) {
            *user = updated;
        }
        Ok(())
    }

    pub async fn delete_user(&mut self, client: &StorefrontClient, id: UserId) -> Result<()> {
        client.delete_user(id).await?;
        self.users.retain(|u| u.id != id);
        Ok(())
    }

    pub fn pending_orders(&self) -> impl Iterator<Item = &Order> {
        self.orders
            .iter()
            .filter(|o| o.status == OrderStatus::Pending)
    }
}
