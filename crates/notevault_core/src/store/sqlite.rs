//! SQLite-backed key-value store.
//!
//! # Responsibility
//! - Open and bootstrap SQLite connections for local vault persistence.
//! - Apply the key-value schema in deterministic order.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - A returned store always has the schema fully applied.
//! - A `(key, scoped)` pair maps to at most one row; `set` fully replaces.

use super::{KeyValueStore, StoreError, StoreResult};
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant};

const SCHEMA_VERSION: u32 = 1;
const SCHEMA_SQL: &str = "CREATE TABLE IF NOT EXISTS kv_entries (
    key        TEXT    NOT NULL,
    scoped     INTEGER NOT NULL,
    value      TEXT    NOT NULL,
    updated_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now') * 1000),
    PRIMARY KEY (key, scoped)
);";

/// Key-value store persisted in one SQLite database.
///
/// The connection is serialized behind a mutex: the store contract is
/// synchronous get/set, and vault documents are single small blobs.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens a database file and applies the schema.
    ///
    /// # Side effects
    /// - Emits `store_open` logging events with duration and status.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let started_at = Instant::now();
        info!("event=store_open module=store status=start mode=file");
        match Connection::open(path).map_err(StoreError::from).and_then(Self::bootstrap) {
            Ok(store) => {
                info!(
                    "event=store_open module=store status=ok mode=file duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(store)
            }
            Err(err) => {
                error!(
                    "event=store_open module=store status=error mode=file duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Opens an in-memory database and applies the schema.
    pub fn open_in_memory() -> StoreResult<Self> {
        Connection::open_in_memory()
            .map_err(StoreError::from)
            .and_then(Self::bootstrap)
    }

    fn bootstrap(conn: Connection) -> StoreResult<Self> {
        conn.busy_timeout(Duration::from_secs(5))?;
        let current: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        if current < SCHEMA_VERSION {
            conn.execute_batch(SCHEMA_SQL)?;
            conn.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))?;
        }
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str, scoped: bool) -> StoreResult<Option<String>> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))?;
        let value = conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1 AND scoped = ?2;",
                params![key, scoped as i64],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str, scoped: bool) -> StoreResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))?;
        conn.execute(
            "INSERT INTO kv_entries (key, scoped, value)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (key, scoped) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, scoped as i64, value],
        )?;
        Ok(())
    }
}
