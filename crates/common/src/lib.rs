//! Shared data model for the storefront.
//!
//! Every crate in the workspace speaks in these types: the storage backends
//! persist them, the domain services validate and shape them, the HTTP layer
//! serializes them and the client mirrors them.

pub mod ids;
pub mod model;
pub mod types;

pub use ids::{CategoryId, MessageId, OrderId, OrderItemId, ProductId, UserId};
pub use model::{
    Category, CategoryDraft, CategoryUpdate, CheckoutItem, CheckoutRequest, ContactMessage,
    ContactMessageDraft, NewOrder, NewOrderItem, NewUser, Order, OrderItem, Product,
    ProductDraft, ProductUpdate, ShippingAddress, User, UserRecord, UserUpdate,
};
pub use types::{Bilingual, Language, Money, OrderStatus, ParseEnumError, Role, StoreId};
