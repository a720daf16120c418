use std::path::{Path, PathBuf};

use crate::error::{StoreError, StoreResult};

/// Environment variable read by [`StoreConfig::from_env`].
pub const STORE_PATH_ENV: &str = "KV_STORE_PATH";

/// Where the store keeps its single table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageTarget {
    /// A SQLite file, created on open if absent.
    File(PathBuf),
    /// A transient database that lives as long as the store.
    InMemory,
}

/// Store configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub target: StorageTarget,
}

impl StoreConfig {
    /// Create a config backed by the file at `db_path`
    pub fn file(db_path: impl AsRef<Path>) -> Self {
        Self {
            target: StorageTarget::File(db_path.as_ref().to_path_buf()),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            target: StorageTarget::InMemory,
        }
    }

    /// Read the target from `KV_STORE_PATH`. The literal `:memory:` selects
    /// an in-memory store.
    pub fn from_env() -> StoreResult<Self> {
        let raw = std::env::var(STORE_PATH_ENV)
            .map_err(|e| StoreError::Config(format!("{STORE_PATH_ENV}: {e}")))?;
        Self::parse(&raw)
    }

    fn parse(raw: &str) -> StoreResult<Self> {
        match raw.trim() {
            "" => Err(StoreError::Config(format!("{STORE_PATH_ENV} is empty"))),
            ":memory:" => Ok(Self::in_memory()),
            path => Ok(Self::file(path)),
        }
    }
}
