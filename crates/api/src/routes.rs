//! Route handlers, one module per resource.

pub mod admin;
pub mod auth;
pub mod categories;
pub mod contact;
pub mod health;
pub mod metrics;
pub mod orders;
pub mod products;
pub mod settings;
