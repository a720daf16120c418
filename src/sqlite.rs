use async_trait::async_trait;
use futures::lock::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use tracing::{debug, info};

use crate::config::{StorageTarget, StoreConfig};
use crate::error::{StoreError, StoreResult};
use crate::schema::TableDefinition;
use crate::store::{KvStore, Record, Update};
use crate::value;

const SELECT_VALUE: &str = "SELECT value FROM objects WHERE id = ?1";
const SELECT_ALL: &str = "SELECT id, value FROM objects ORDER BY id";
const UPSERT_VALUE: &str = "INSERT INTO objects (id, value) VALUES (?1, ?2) \
     ON CONFLICT(id) DO UPDATE SET value = excluded.value";
const DELETE_VALUE: &str = "DELETE FROM objects WHERE id = ?1";

/// Key-value store over a single SQLite table.
///
/// The connection sits behind an async mutex; every operation takes it for
/// its whole duration. After [`SqliteStore::close`] the slot is empty and
/// every call fails with [`StoreError::Unavailable`].
///
/// SQLite calls run inline on the calling task and block its worker thread
/// while the lock is held. On a multi-threaded runtime, callers with heavy
/// traffic can wrap calls in `spawn_blocking`.
pub struct SqliteStore {
    config: StoreConfig,
    connection: Mutex<Option<Connection>>,
}

impl SqliteStore {
    /// Open the configured database, creating the file and table if absent.
    pub fn open(config: StoreConfig) -> StoreResult<Self> {
        let connection = match &config.target {
            StorageTarget::File(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)?;
                }
                info!(path = %path.display(), "opening sqlite store");
                Connection::open(path)?
            }
            StorageTarget::InMemory => {
                info!("opening in-memory sqlite store");
                Connection::open_in_memory()?
            }
        };
        initialize_schema(&connection)?;
        Ok(Self {
            config,
            connection: Mutex::new(Some(connection)),
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub async fn is_open(&self) -> bool {
        self.connection.lock().await.is_some()
    }

    /// Release the connection. Closing a closed store does nothing.
    pub async fn close(&self) -> StoreResult<()> {
        let mut slot = self.connection.lock().await;
        if let Some(connection) = slot.take() {
            if let Err((connection, e)) = connection.close() {
                *slot = Some(connection);
                return Err(e.into());
            }
            info!(storage = ?self.config.target, "sqlite store closed");
        }
        Ok(())
    }

    async fn with_connection<T>(
        &self,
        f: impl FnOnce(&mut Connection) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut slot = self.connection.lock().await;
        let connection = slot.as_mut().ok_or(StoreError::Unavailable)?;
        f(connection)
    }
}

fn initialize_schema(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(&TableDefinition::objects().create_sql())?;
    Ok(())
}

fn read_value(conn: &Connection, id: &str) -> StoreResult<Option<Value>> {
    let text: Option<String> = conn
        .query_row(SELECT_VALUE, params![id], |row| row.get(0))
        .optional()?;
    text.map(|text| value::decode(id, &text)).transpose()
}

fn write_value(conn: &Connection, id: &str, value: &Value) -> StoreResult<()> {
    let text = value::encode(id, value)?;
    conn.execute(UPSERT_VALUE, params![id, text])?;
    debug!(id = %id, "record written");
    Ok(())
}

#[async_trait]
impl KvStore for SqliteStore {
    async fn get_object(&self, id: &str) -> StoreResult<Option<Value>> {
        self.with_connection(|conn| read_value(conn, id)).await
    }

    async fn set_object(&self, id: &str, value: Value) -> StoreResult<()> {
        self.with_connection(|conn| write_value(conn, id, &value))
            .await
    }

    async fn delete_object(&self, id: &str) -> StoreResult<()> {
        self.with_connection(|conn| {
            let removed = conn.execute(DELETE_VALUE, params![id])?;
            debug!(id = %id, removed, "record deleted");
            Ok(())
        })
        .await
    }

    async fn fetch_all(&self) -> StoreResult<Vec<Record>> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(SELECT_ALL)?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?;
            let mut records = Vec::new();
            for row in rows {
                let (id, text) = row?;
                let value = value::decode(&id, &text)?;
                records.push(Record { id, value });
            }
            Ok(records)
        })
        .await
    }

    async fn update<T, F>(&self, id: &str, f: F) -> StoreResult<T>
    where
        T: Send,
        F: FnOnce(Option<Value>) -> StoreResult<Update<T>> + Send,
    {
        self.with_connection(|conn| {
            // Dropping the transaction on an early return rolls it back.
            let tx = conn.transaction()?;
            let current = read_value(&tx, id)?;
            let out = match f(current)? {
                Update::Write(value, out) => {
                    write_value(&tx, id, &value)?;
                    out
                }
                Update::Keep(out) => out,
            };
            tx.commit()?;
            Ok(out)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn failed_update_leaves_record_untouched() {
        let store = SqliteStore::open(StoreConfig::in_memory()).unwrap();
        store.set_object("k", json!([1])).await.unwrap();

        let result: StoreResult<()> = store
            .update("k", |_| Err(StoreError::NotANumber { id: "k".into() }))
            .await;
        assert!(matches!(result, Err(StoreError::NotANumber { .. })));
        assert_eq!(store.get_object("k").await.unwrap(), Some(json!([1])));
    }

    #[tokio::test]
    async fn keep_does_not_create_record() {
        let store = SqliteStore::open(StoreConfig::in_memory()).unwrap();
        let seen = store
            .update("absent", |current| Ok(Update::Keep(current.is_none())))
            .await
            .unwrap();
        assert!(seen);
        assert!(store.fetch_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn corrupt_row_is_not_absence() {
        let store = SqliteStore::open(StoreConfig::in_memory()).unwrap();
        store
            .with_connection(|conn| {
                conn.execute(UPSERT_VALUE, params!["bad", "{oops"])?;
                Ok(())
            })
            .await
            .unwrap();

        let err = store.get_object("bad").await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { ref id, .. } if id == "bad"));
        assert!(matches!(
            store.fetch_all().await,
            Err(StoreError::Corrupt { .. })
        ));
    }
}
