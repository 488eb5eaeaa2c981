//! Favorite products, kept per signed-in email in one shared entry.
//!
//! Switching accounts changes which list is visible without touching the
//! others.

use std::collections::BTreeMap;
use std::sync::Arc;

use common::{Product, ProductId};

use crate::error::{ClientError, Result};
use crate::kv::{KeyValueStore, load_json, save_json};

const FAVORITES_KEY: &str = "favorites";

pub struct Favorites {
    store: Arc<dyn KeyValueStore>,
    by_email: BTreeMap<String, Vec<Product>>,
    email: Option<String>,
}

impl Favorites {
    pub fn load(store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let by_email = load_json(store.as_ref(), FAVORITES_KEY)?.unwrap_or_default();
        Ok(Self {
            store,
            by_email,
            email: None,
        })
    }

    /// Selects whose favorites are visible. `None` shows an empty list.
    pub fn set_user(&mut self, email: Option<&str>) {
        self.email = email.map(|e| e.trim().to_lowercase());
    }

    pub fn items(&self) -> &[Product] {
        self.email
            .as_ref()
            .and_then(|email| self.by_email.get(email))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn contains(&self, product_id: ProductId) -> bool {
        self.items().iter().any(|p| p.id == product_id)
    }

    /// Adds the product, or removes it when already present. Returns whether
    /// it is a favorite afterwards.
    pub fn toggle(&mut self, product: Product) -> Result<bool> {
        let email = self.email.clone().ok_or(ClientError::NotSignedIn)?;
        let list = self.by_email.entry(email).or_default();

        let now_favorite = match list.iter().position(|p| p.id == product.id) {
            Some(index) => {
                list.remove(index);
                false
            }
            None => {
                list.push(product);
                true
            }
        };
        save_json(self.store.as_ref(), FAVORITES_KEY, &self.by_email)?;
        Ok(now_favorite)
    }

    pub fn remove(&mut self, product_id: ProductId) -> Result<bool> {
        let Some(list) = self.email.as_ref().and_then(|e| self.by_email.get_mut(e)) else {
            return Ok(false);
        };
        let before = list.len();
        list.retain(|p| p.id != product_id);
        if list.len() == before {
            return Ok(false);
        }
        save_json(self.store.as_ref(), FAVORITES_KEY, &self.by_email)?;
        Ok(true)
    }
}
