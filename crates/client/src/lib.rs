//! Client-side state for the storefront.
//!
//! Mirrors what the browser keeps between page loads (cart, favorites,
//! session token, store and language) behind a [`kv::KeyValueStore`], and
//! talks to the HTTP API through [`StorefrontClient`].

pub mod admin;
pub mod api;
pub mod cart;
pub mod error;
pub mod favorites;
pub mod kv;
pub mod preferences;
pub mod session;
pub mod whatsapp;

#[cfg(test)]
mod test_support;

pub use admin::AdminDashboard;
pub use api::{AuthResponse, DashboardStats, ProfileChanges, StorefrontClient};
pub use cart::{Cart, CartLine, CartScope};
pub use error::{ClientError, Result};
pub use favorites::Favorites;
pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use preferences::{PreferenceStore, Preferences};
pub use session::{KvTokenStore, Session, TokenStore};
