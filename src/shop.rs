//! The shop collection: an ordered list of tagged entries under
//! [`SHOP_ITEMS_KEY`](crate::key::SHOP_ITEMS_KEY).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::key::StoreKey;
use crate::store::{KvStore, Update};

/// One shop entry, stored as `{ "type": .., "data": .. }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopItem {
    #[serde(rename = "type")]
    pub item_type: String,
    pub data: Value,
}

impl ShopItem {
    pub fn new(item_type: impl Into<String>, data: Value) -> Self {
        Self {
            item_type: item_type.into(),
            data,
        }
    }
}

fn decode_items(id: &str, value: Value) -> StoreResult<Vec<ShopItem>> {
    serde_json::from_value(value).map_err(|source| StoreError::Shape {
        id: id.to_string(),
        source,
    })
}

#[async_trait]
pub trait ShopOps: KvStore {
    /// Replace the whole collection.
    async fn set_shop(&self, items: Vec<ShopItem>) -> StoreResult<()> {
        let value = serde_json::to_value(items)?;
        self.set_object(&StoreKey::ShopItems.physical(), value).await
    }

    async fn get_shop(&self) -> StoreResult<Option<Vec<ShopItem>>> {
        let id = StoreKey::ShopItems.physical();
        self.get_object(&id)
            .await?
            .map(|value| decode_items(&id, value))
            .transpose()
    }

    /// Append an entry, creating the collection if needed.
    ///
    /// An empty `item_type` is refused with `Ok(None)` and nothing is
    /// written.
    async fn add_shop_item(
        &self,
        item_type: &str,
        data: Value,
    ) -> StoreResult<Option<Vec<ShopItem>>> {
        if item_type.is_empty() {
            warn!("shop item without a type rejected");
            return Ok(None);
        }
        let id = StoreKey::ShopItems.physical();
        let item = ShopItem::new(item_type, data);
        self.update(&id, |current| {
            let mut items = match current {
                Some(value) => decode_items(&id, value)?,
                None => Vec::new(),
            };
            items.push(item);
            let value = serde_json::to_value(&items)?;
            Ok(Update::Write(value, Some(items)))
        })
        .await
    }

    /// Remove the entry at `index`, shifting later entries down.
    ///
    /// Returns `None` when there is no collection. An index past the end
    /// leaves the collection unchanged and returns it as is.
    async fn remove_shop_item(&self, index: usize) -> StoreResult<Option<Vec<ShopItem>>> {
        let id = StoreKey::ShopItems.physical();
        self.update(&id, |current| {
            let Some(value) = current else {
                return Ok(Update::Keep(None));
            };
            let mut items = decode_items(&id, value)?;
            if index >= items.len() {
                debug!(index, len = items.len(), "shop index out of range");
                return Ok(Update::Keep(Some(items)));
            }
            items.remove(index);
            let value = serde_json::to_value(&items)?;
            Ok(Update::Write(value, Some(items)))
        })
        .await
    }
}

impl<S: KvStore> ShopOps for S {}
