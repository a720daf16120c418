//! User records: `{ "e_mail": .., "name": .. }` under the user's id.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::key::StoreKey;
use crate::store::{KvStore, Update};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub e_mail: String,
    pub name: String,
}

impl User {
    pub fn new(e_mail: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            e_mail: e_mail.into(),
            name: name.into(),
        }
    }
}

fn shape_error(id: &str) -> impl FnOnce(serde_json::Error) -> StoreError + '_ {
    move |source| StoreError::Shape {
        id: id.to_string(),
        source,
    }
}

#[async_trait]
pub trait UserOps: KvStore {
    /// Write the user record, replacing whatever was stored under `id`.
    async fn set_user(&self, id: &str, e_mail: &str, name: &str) -> StoreResult<()> {
        let value = serde_json::to_value(User::new(e_mail, name))?;
        self.set_object(&StoreKey::user(id).physical(), value).await
    }

    async fn get_user(&self, id: &str) -> StoreResult<Option<User>> {
        let key = StoreKey::user(id).physical();
        match self.get_object(&key).await? {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(shape_error(&key)),
            None => Ok(None),
        }
    }

    /// Replace the stored e-mail. Other fields are kept as they are.
    ///
    /// Returns `None` without writing when the user does not exist.
    async fn change_user_mail(&self, id: &str, new_email: &str) -> StoreResult<Option<User>> {
        let key = StoreKey::user(id).physical();
        let e_mail = new_email.to_string();
        let updated = self
            .update(&key, |current| {
                let Some(value) = current else {
                    return Ok(Update::Keep(None));
                };
                let mut fields: Map<String, Value> =
                    serde_json::from_value(value).map_err(shape_error(&key))?;
                fields.insert("e_mail".to_string(), Value::String(e_mail));
                let value = Value::Object(fields);
                let user: User =
                    serde_json::from_value(value.clone()).map_err(shape_error(&key))?;
                Ok(Update::Write(value, Some(user)))
            })
            .await?;
        debug!(id = %key, found = updated.is_some(), "user e-mail change");
        Ok(updated)
    }

    async fn delete_user(&self, id: &str) -> StoreResult<()> {
        self.delete_object(&StoreKey::user(id).physical()).await
    }
}

impl<S: KvStore> UserOps for S {}
