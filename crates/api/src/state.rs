//! Shared application state.

use std::sync::Arc;

use domain::{AdminService, AuthConfig, AuthService, CatalogService, ContactService, OrderService};
use storage::DataStore;

use crate::notify::Notifier;

/// Services shared by every handler, all routed through one [`DataStore`].
pub struct AppState {
    pub store: DataStore,
    pub catalog: CatalogService<DataStore>,
    pub orders: OrderService<DataStore>,
    pub auth: AuthService<DataStore>,
    pub admin: AdminService<DataStore>,
    pub contact: ContactService<DataStore>,
    pub notifier: Notifier,
}

impl AppState {
    pub fn new(store: DataStore, auth: AuthConfig, notifier: Notifier) -> Arc<Self> {
        Arc::new(Self {
            catalog: CatalogService::new(store.clone()),
            orders: OrderService::new(store.clone()),
            auth: AuthService::new(store.clone(), auth),
            admin: AdminService::new(store.clone()),
            contact: ContactService::new(store.clone()),
            store,
            notifier,
        })
    }
}
