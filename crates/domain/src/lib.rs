//! Storefront services.
//!
//! Each service wraps a [`storage::Storage`] backend and enforces the rules
//! that sit above persistence:
//! - catalog validation (bilingual names, positive prices, slug format)
//! - checkout pricing against the live catalog and delivery fee
//! - password hashing and bearer tokens
//! - admin statistics and user management

pub mod admin;
pub mod auth;
pub mod catalog;
pub mod contact;
pub mod error;
pub mod orders;
pub mod pricing;
pub mod validation;

pub use admin::{AdminService, AdminStats};
pub use auth::{
    AuthConfig, AuthService, AuthSession, Claims, LoginRequest, ProfileUpdate, RegisterRequest,
};
pub use catalog::CatalogService;
pub use contact::ContactService;
pub use error::{DomainError, Result};
pub use common::{CheckoutItem, CheckoutRequest};
pub use orders::OrderService;
pub use pricing::{OrderQuote, delivery_fee_from_setting};
pub use validation::{FieldError, ValidationErrors};
