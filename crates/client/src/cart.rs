//! Shopping cart.
//!
//! A cart belongs to a [`CartScope`]: one shared anonymous cart for signed-out
//! visitors and one per signed-in user. Each scope persists under its own key.

use std::sync::Arc;

use common::{CheckoutItem, Money, Product, ProductId, UserId};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::kv::{KeyValueStore, load_json, save_json};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CartScope {
    Anonymous,
    User(UserId),
}

impl CartScope {
    pub fn storage_key(&self) -> String {
        match self {
            CartScope::Anonymous => "cart".to_string(),
            CartScope::User(id) => format!("cart:{id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product: Product,
    pub quantity: u32,
}

impl CartLine {
    pub fn line_total(&self) -> Money {
        self.product.price.multiply(self.quantity)
    }
}

pub struct Cart {
    scope: CartScope,
    lines: Vec<CartLine>,
    store: Arc<dyn KeyValueStore>,
}

impl Cart {
    /// Loads the cart persisted for `scope`, or an empty one.
    pub fn load(store: Arc<dyn KeyValueStore>, scope: CartScope) -> Result<Self> {
        let lines = load_json(store.as_ref(), &scope.storage_key())?.unwrap_or_default();
        Ok(Self {
            scope,
            lines,
            store,
        })
    }

    pub fn scope(&self) -> CartScope {
        self.scope
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Adds `quantity` units, merging into an existing line for the same
    /// product. A quantity of 0 is raised to 1.
    pub fn add(&mut self, product: Product, quantity: u32) -> Result<()> {
        let quantity = quantity.max(1);
        match self.lines.iter_mut().find(|l| l.product.id == product.id) {
            Some(line) => {
                line.quantity = line.quantity.saturating_add(quantity);
                line.product = product;
            }
            None => self.lines.push(CartLine { product, quantity }),
        }
        self.persist()
    }

    /// Sets the quantity of a line, clamped to at least 1. Returns false when
    /// the product is not in the cart.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: u32) -> Result<bool> {
        let Some(line) = self.lines.iter_mut().find(|l| l.product.id == product_id) else {
            return Ok(false);
        };
        line.quantity = quantity.max(1);
        self.persist()?;
        Ok(true)
    }

    pub fn remove(&mut self, product_id: ProductId) -> Result<bool> {
        let before = self.lines.len();
        self.lines.retain(|l| l.product.id != product_id);
        if self.lines.len() == before {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.lines.clear();
        self.store.remove(&self.scope.storage_key())
    }

    /// Sum of price times quantity, before delivery.
    pub fn total(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .map(|l| l.quantity)
            .fold(0, u32::saturating_add)
    }

    /// The lines as submitted at checkout, priced as shown to the customer.
    pub fn checkout_items(&self) -> Vec<CheckoutItem> {
        self.lines
            .iter()
            .map(|l| CheckoutItem {
                product_id: l.product.id,
                quantity: l.quantity,
                price: l.product.price,
            })
            .collect()
    }

    fn persist(&self) -> Result<()> {
        save_json(self.store.as_ref(), &self.scope.storage_key(), &self.lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryStore;
    use crate::test_support::product;

    fn store() -> Arc<dyn KeyValueStore> {
        Arc::new(MemoryStore::new())
    }

    #[test]
    fn adding_the_same_product_merges_lines() {
        let mut cart = Cart::load(store(), CartScope::Anonymous).unwrap();
        let dates = product("Dates", 1000);

        cart.add(dates.clone(), 2).unwrap();
        cart.add(dates, 1).unwrap();

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.total(), Money::from_minor(3000));
    }

    #[test]
    fn quantity_is_clamped_to_one() {
        let mut cart = Cart::load(store(), CartScope::Anonymous).unwrap();
        let oil = product("Olive Oil", 550);

        cart.add(oil.clone(), 0).unwrap();
        assert_eq!(cart.item_count(), 1);

        assert!(cart.set_quantity(oil.id, 0).unwrap());
        assert_eq!(cart.lines()[0].quantity, 1);

        assert!(!cart.set_quantity(ProductId::new(), 4).unwrap());
    }

    #[test]
    fn total_matches_checkout_example() {
        let mut cart = Cart::load(store(), CartScope::Anonymous).unwrap();
        cart.add(product("Cheese", 1000), 2).unwrap();
        cart.add(product("Za'atar", 550), 1).unwrap();

        assert_eq!(cart.total(), Money::from_minor(2550));
        assert_eq!(cart.total() + Money::from_minor(200), Money::from_minor(2750));
    }

    #[test]
    fn scopes_are_persisted_separately() {
        let kv = store();
        let user = CartScope::User(UserId::new());

        let mut anonymous = Cart::load(kv.clone(), CartScope::Anonymous).unwrap();
        anonymous.add(product("Dates", 1000), 1).unwrap();

        let mut mine = Cart::load(kv.clone(), user).unwrap();
        assert!(mine.is_empty());
        mine.add(product("Sumac", 700), 3).unwrap();

        let reloaded = Cart::load(kv.clone(), user).unwrap();
        assert_eq!(reloaded.item_count(), 3);
        assert_eq!(Cart::load(kv, CartScope::Anonymous).unwrap().item_count(), 1);
    }

    #[test]
    fn item_count_saturates() {
        let mut cart = Cart::load(store(), CartScope::Anonymous).unwrap();
        cart.add(product("Dates", 100), u32::MAX).unwrap();
        cart.add(product("Sumac", 100), u32::MAX).unwrap();
        assert_eq!(cart.item_count(), u32::MAX);
    }

    #[test]
    fn remove_and_clear() {
        let kv = store();
        let mut cart = Cart::load(kv.clone(), CartScope::Anonymous).unwrap();
        let cheese = product("Cheese", 1000);
        cart.add(cheese.clone(), 1).unwrap();
        cart.add(product("Dates", 500), 1).unwrap();

        assert!(cart.remove(cheese.id).unwrap());
        assert!(!cart.remove(cheese.id).unwrap());
        assert_eq!(cart.checkout_items().len(), 1);

        cart.clear().unwrap();
        assert!(Cart::load(kv, CartScope::Anonymous).unwrap().is_empty());
    }
}
