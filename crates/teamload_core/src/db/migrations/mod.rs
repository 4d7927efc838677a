//! Embedded schema migrations for the key-value table.
//!
//! # Invariants
//! - Versions are strictly increasing and mirrored to `PRAGMA user_version`.
//! - Pending migrations apply in one transaction; a failure applies none.

use crate::storage::{StorageError, StorageResult};
use log::{debug, error, info};
use rusqlite::Connection;

/// `(version, sql)` pairs in application order.
const MIGRATIONS: &[(u32, &str)] = &[(1, include_str!("0001_kv_entries.sql"))];

/// Latest schema version this binary can read and write.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |(version, _)| *version)
}

/// Schema version recorded in the database file.
pub fn schema_version(conn: &Connection) -> StorageResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

/// Brings the schema up to `latest_version()` and returns how many
/// migrations ran.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file was written by a newer build;
///   the file is left untouched.
pub fn apply_migrations(conn: &mut Connection) -> StorageResult<usize> {
    let from = schema_version(conn)?;
    let to = latest_version();

    if from > to {
        error!(
            "event=db_migrate module=db status=error from_version={from} to_version={to} error_code=schema_too_new"
        );
        return Err(StorageError::UnsupportedSchemaVersion {
            found: from,
            supported: to,
        });
    }

    let pending: Vec<(u32, &str)> = MIGRATIONS
        .iter()
        .copied()
        .filter(|(version, _)| *version > from)
        .collect();
    if pending.is_empty() {
        debug!("event=db_migrate module=db status=ok from_version={from} to_version={to} applied=0");
        return Ok(0);
    }

    let tx = conn.transaction()?;
    for (version, sql) in &pending {
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", *version)?;
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={} applied={}",
        from,
        to,
        pending.len()
    );
    Ok(pending.len())
}
