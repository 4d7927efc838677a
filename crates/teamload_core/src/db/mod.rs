//! SQLite medium behind `storage::SqliteStorage`.
//!
//! Connections returned from here have the `kv_entries` schema migrated to
//! `migrations::latest_version()`; failures surface as `StorageError`.

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};
