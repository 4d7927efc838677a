//! Key-value persistence backends for registry collections.
//!
//! # Responsibility
//! - Define the `KeyValueStorage` contract registries are injected with.
//! - Provide in-memory and SQLite implementations.
//! - Provide JSON helpers for whole-collection load/save.
//!
//! # Invariants
//! - Each collection is stored as one JSON document under one key.
//! - Writes overwrite the whole value; there are no partial updates.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod memory;
mod sqlite;

pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

pub type StorageResult<T> = Result<T, StorageError>;

/// Storage read/write failure.
#[derive(Debug)]
pub enum StorageError {
    /// SQLite failure outside a single entry (open, pragma, migration).
    Sqlite(rusqlite::Error),
    /// SQLite failure while reading or writing one entry.
    Entry {
        key: String,
        source: rusqlite::Error,
    },
    /// The medium was written by a newer schema than this build supports.
    UnsupportedSchemaVersion { found: u32, supported: u32 },
    Serialization(serde_json::Error),
    /// Backend refused the operation (quota, closed medium, ...).
    Unavailable(String),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Entry { key, source } => write!(f, "storage entry `{key}`: {source}"),
            Self::UnsupportedSchemaVersion { found, supported } => write!(
                f,
                "storage schema version {found} is newer than supported {supported}"
            ),
            Self::Serialization(err) => write!(f, "serialization failed: {err}"),
            Self::Unavailable(message) => write!(f, "storage unavailable: {message}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Entry { source, .. } => Some(source),
            Self::Serialization(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } | Self::Unavailable(_) => None,
        }
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// String key-value store, shaped after browser local storage.
pub trait KeyValueStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
    fn remove(&self, key: &str) -> StorageResult<()>;
}

impl<T: KeyValueStorage + ?Sized> KeyValueStorage for &T {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }
}

/// Reads and deserializes the JSON document stored under `key`.
///
/// Returns `Ok(None)` when the key is absent.
pub fn load_json<T: DeserializeOwned>(
    storage: &impl KeyValueStorage,
    key: &str,
) -> StorageResult<Option<T>> {
    match storage.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Serializes `value` to JSON and overwrites `key`.
pub fn save_json<T: Serialize + ?Sized>(
    storage: &impl KeyValueStorage,
    key: &str,
    value: &T,
) -> StorageResult<()> {
    let raw = serde_json::to_string(value)?;
    storage.set(key, &raw)
}
