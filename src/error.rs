//! Error types for the key-value store.
//!
//! Absence and rejected caller input are not errors: they surface as
//! `Ok(None)` from the operations that can produce them. Everything in
//! [`StoreError`] means the store could not do its job.

use thiserror::Error;

/// Errors that can occur during store operations
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store is closed")]
    Unavailable,
    #[error("stored value for `{id}` is not valid JSON: {source}")]
    Corrupt {
        id: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("stored value for `{id}` has an unexpected shape: {source}")]
    Shape {
        id: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("value for `{id}` does not survive a JSON round trip")]
    LossyValue { id: String },
    #[error("no record for `{id}`")]
    Missing { id: String },
    #[error("value for `{id}` is not a sequence")]
    NotASequence { id: String },
    #[error("value for `{id}` is not a number")]
    NotANumber { id: String },
    #[error("configuration error: {0}")]
    Config(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
