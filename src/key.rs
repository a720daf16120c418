//! Typed keys and their physical string form.
//!
//! The physical strings are what older data sets already use, so the
//! mapping must not change: user records live under the bare user id,
//! counters under `<user>:<counter>` and the shop under
//! [`SHOP_ITEMS_KEY`].

/// Physical key of the shop collection.
pub const SHOP_ITEMS_KEY: &str = "shop_items_servers";

const COUNTER_SEPARATOR: char = ':';

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StoreKey {
    User(String),
    Counter { user_id: String, name: String },
    ShopItems,
}

impl StoreKey {
    pub fn user(id: impl Into<String>) -> Self {
        Self::User(id.into())
    }

    pub fn counter(user_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Counter {
            user_id: user_id.into(),
            name: name.into(),
        }
    }

    /// The string stored in the `id` column.
    pub fn physical(&self) -> String {
        match self {
            Self::User(id) => id.clone(),
            // Counter names were historically passed with their leading
            // separator (":coins"); accept both spellings.
            Self::Counter { user_id, name } if name.starts_with(COUNTER_SEPARATOR) => {
                format!("{user_id}{name}")
            }
            Self::Counter { user_id, name } => format!("{user_id}{COUNTER_SEPARATOR}{name}"),
            Self::ShopItems => SHOP_ITEMS_KEY.to_string(),
        }
    }
}
