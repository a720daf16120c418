//! The generic layer: opaque JSON values under string ids.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{StoreError, StoreResult};

/// One row of the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub value: Value,
}

/// Outcome of a read-modify-write closure passed to [`KvStore::update`].
#[derive(Debug, Clone, PartialEq)]
pub enum Update<T> {
    /// Persist the value, then hand `T` back to the caller.
    Write(Value, T),
    /// Leave the record as it is.
    Keep(T),
}

/// Generic key-value operations.
///
/// Every method observes the latest committed state. [`KvStore::update`]
/// holds the store exclusively from the read to the write, so two updates
/// on the same id never interleave.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Value stored under `id`, or `None` when there is no record.
    async fn get_object(&self, id: &str) -> StoreResult<Option<Value>>;

    /// Insert or overwrite the record at `id`.
    async fn set_object(&self, id: &str, value: Value) -> StoreResult<()>;

    /// Remove the record at `id`. Missing ids are not an error.
    async fn delete_object(&self, id: &str) -> StoreResult<()>;

    /// Every record, ordered by id.
    async fn fetch_all(&self) -> StoreResult<Vec<Record>>;

    /// Atomically read `id`, let `f` decide, and write back if asked to.
    ///
    /// An error from `f` leaves the record untouched.
    async fn update<T, F>(&self, id: &str, f: F) -> StoreResult<T>
    where
        T: Send,
        F: FnOnce(Option<Value>) -> StoreResult<Update<T>> + Send;

    /// Append `item` to the sequence stored at `id` and return the new
    /// sequence. The sequence must already exist.
    async fn push_object(&self, id: &str, item: Value) -> StoreResult<Vec<Value>> {
        let key = id.to_string();
        self.update(id, move |current| match current {
            Some(Value::Array(mut items)) => {
                items.push(item);
                Ok(Update::Write(Value::Array(items.clone()), items))
            }
            Some(_) => Err(StoreError::NotASequence { id: key }),
            None => Err(StoreError::Missing { id: key }),
        })
        .await
    }
}
