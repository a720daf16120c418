//! Typed key-value persistence over a single SQLite table.
//!
//! # Intention
//!
//! - Store JSON values under string ids in one `objects(id, value)` table.
//! - Offer typed operations for users, per-user counters and the shop
//!   collection on top of the generic get/set/delete layer.
//!
//! # Architectural Boundaries
//!
//! - Only persistence code belongs here.
//! - One table, one file, one owning process. No query language.
//!
//! Missing records and rejected input come back as `Ok(None)`; storage
//! faults and undecodable rows come back as [`StoreError`].

pub mod config;
pub mod counters;
pub mod error;
pub mod key;
pub mod schema;
pub mod shop;
pub mod sqlite;
pub mod store;
pub mod users;
pub mod value;

pub use config::{StorageTarget, StoreConfig};
pub use counters::CounterOps;
pub use error::{StoreError, StoreResult};
pub use key::{StoreKey, SHOP_ITEMS_KEY};
pub use shop::{ShopItem, ShopOps};
pub use sqlite::SqliteStore;
pub use store::{KvStore, Record, Update};
pub use users::{User, UserOps};
