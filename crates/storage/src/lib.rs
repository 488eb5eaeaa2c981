//! Data access layer.
//!
//! One repository contract, two interchangeable backends:
//! - [`JsonFileStore`] keeps everything in human-editable JSON files and is
//!   the development fallback.
//! - [`PostgresStore`] maps every entity onto a relational table.
//!
//! [`DataStore`] is built once at start-up and routes each call to one of
//! them, honouring a force-fallback flag that can be flipped at runtime.

pub mod error;
pub mod json_file;
pub mod postgres;
pub mod repository;
pub mod seed;
pub mod switch;

pub use error::{Result, StorageError};
pub use json_file::JsonFileStore;
pub use postgres::PostgresStore;
pub use repository::{
    CategoryRepository, ContactRepository, OrderRepository, ProductRepository,
    SettingsRepository, Storage, StorageExt, UserRepository,
};
pub use seed::{BootstrapAdmin, DELIVERY_FEE_KEY};
pub use switch::{Backend, DataStore, FallbackFlag};
