//! External key-value service contract and backends.
//!
//! # Responsibility
//! - Define the raw `get`/`set` primitive the vault repository consumes.
//! - Provide an in-memory backend for tests/demos and a SQLite-backed
//!   backend for local persistence.
//!
//! # Invariants
//! - The store is an opaque read/replace service: no merge logic, no
//!   vault-shape knowledge, lives below the repository boundary.
//! - The `scoped` flag's semantics belong to the backend; callers forward
//!   it unchanged.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod memory;
mod sqlite;

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Transport/backend failure from a key-value call.
#[derive(Debug)]
pub enum StoreError {
    /// The backend could not serve the call (network, I/O, backend down).
    Unavailable(String),
    /// SQLite backend failure.
    Sqlite(rusqlite::Error),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(message) => write!(f, "store unavailable: {message}"),
            Self::Sqlite(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Unavailable(_) => None,
            Self::Sqlite(err) => Some(err),
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Raw key-value service the vault repository is built on.
///
/// `get` distinguishes "no value" (`Ok(None)`) from transport failure
/// (`Err`); the repository relies on that split to tell a fresh vault
/// apart from an unreachable store.
pub trait KeyValueStore {
    /// Reads one value, or `None` when the key was never written.
    fn get(&self, key: &str, scoped: bool) -> StoreResult<Option<String>>;
    /// Writes (or fully replaces) one value.
    fn set(&self, key: &str, value: &str, scoped: bool) -> StoreResult<()>;
}

// Lets independent sessions share one backend, the way independent clients
// share the external service.
impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get(&self, key: &str, scoped: bool) -> StoreResult<Option<String>> {
        (**self).get(key, scoped)
    }

    fn set(&self, key: &str, value: &str, scoped: bool) -> StoreResult<()> {
        (**self).set(key, value, scoped)
    }
}
